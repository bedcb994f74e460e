use error_stack::Report;
use time::OffsetDateTime;

use kernel::interface::database::{
    DependOnDatabaseConnection, QueryDatabaseConnection, Transaction,
};
use kernel::interface::query::{
    DependOnMovieQuery, DependOnRentalQuery, DependOnUserQuery, MovieQuery, RentalQuery, UserQuery,
};
use kernel::interface::update::{
    DependOnMovieModifier, DependOnRentalModifier, MovieModifier, RentalModifier,
};
use kernel::prelude::entity::{DestructRentalWithMovies, MovieId, RentalId, RentedAt, ReturnedAt, UserId};
use kernel::KernelError;

use crate::transfer::{
    CloseRentalDto, CreateRentalDto, GetRentalDto, RentalDto, RentalWithMoviesDto,
};

#[async_trait::async_trait]
pub trait GetRentalService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnRentalQuery<Connection>
{
    async fn get_rentals(&self) -> error_stack::Result<Vec<RentalDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let rentals = self.rental_query().find_all(&mut connection).await?;

        Ok(rentals.into_iter().map(RentalDto::from).collect())
    }

    async fn get_rental_by_id(
        &self,
        dto: GetRentalDto,
    ) -> error_stack::Result<RentalWithMoviesDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = RentalId::new(dto.id);
        let rental = self
            .rental_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::RentalNotFound))?;

        Ok(RentalWithMoviesDto::from(rental))
    }
}

impl<Connection: Transaction + Send, T> GetRentalService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnRentalQuery<Connection>
{
}

#[async_trait::async_trait]
pub trait CreateRentalService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnUserQuery<Connection>
    + DependOnRentalQuery<Connection>
    + DependOnMovieQuery<Connection>
    + DependOnRentalModifier<Connection>
    + DependOnMovieModifier<Connection>
{
    /// Checks run in a fixed order: user, open-rental exclusivity, then each
    /// movie in input order. The first violation aborts the whole request.
    async fn create_rental(
        &self,
        dto: CreateRentalDto,
    ) -> error_stack::Result<RentalDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let user_id = UserId::new(dto.user_id);
        let user = self
            .user_query()
            .find_by_id(&mut connection, &user_id)
            .await?
            .ok_or_else(|| Report::new(KernelError::UserNotFound))?;

        let rentals = self
            .rental_query()
            .find_by_user_id(&mut connection, &user_id)
            .await?;
        if rentals.iter().any(|rental| !*rental.closed().as_ref()) {
            return Err(Report::new(KernelError::PendentRental));
        }

        let now = OffsetDateTime::now_utc();
        let movie_ids = dto
            .movie_ids
            .into_iter()
            .map(MovieId::new)
            .collect::<Vec<_>>();
        for movie_id in &movie_ids {
            let movie = self
                .movie_query()
                .find_by_id(&mut connection, movie_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::MovieNotFound))?;
            if movie.rental_id().is_some() {
                return Err(Report::new(KernelError::MovieInRental));
            }
            if *movie.adults_only().as_ref() && !user.birth_date().is_of_legal_age(now.date()) {
                return Err(Report::new(KernelError::AgeRestriction));
            }
        }

        let rental = self
            .rental_modifier()
            .create(&mut connection, &user_id, &RentedAt::new(now))
            .await?;
        for movie_id in &movie_ids {
            self.movie_modifier()
                .rent(&mut connection, movie_id, rental.id())
                .await?;
        }
        connection.commit().await?;

        Ok(RentalDto::from(rental))
    }
}

impl<Connection: Transaction + Send, T> CreateRentalService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnUserQuery<Connection>
        + DependOnRentalQuery<Connection>
        + DependOnMovieQuery<Connection>
        + DependOnRentalModifier<Connection>
        + DependOnMovieModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait CloseRentalService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnRentalQuery<Connection>
    + DependOnRentalModifier<Connection>
    + DependOnMovieModifier<Connection>
{
    async fn close_rental(
        &self,
        dto: CloseRentalDto,
    ) -> error_stack::Result<RentalDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = RentalId::new(dto.id);
        let found = self
            .rental_query()
            .find_by_id(&mut connection, &id)
            .await?
            .ok_or_else(|| Report::new(KernelError::RentalNotFound))?;

        // Closing twice returns the rental as it was first closed.
        let DestructRentalWithMovies { rental, .. } = found.into_destruct();
        if *rental.closed().as_ref() {
            return Ok(RentalDto::from(rental));
        }

        let returned = self
            .rental_modifier()
            .close(
                &mut connection,
                &id,
                &ReturnedAt::new(OffsetDateTime::now_utc()),
            )
            .await?;
        self.movie_modifier().release(&mut connection, &id).await?;
        connection.commit().await?;

        Ok(RentalDto::from(returned))
    }
}

impl<Connection: Transaction + Send, T> CloseRentalService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnRentalQuery<Connection>
        + DependOnRentalModifier<Connection>
        + DependOnMovieModifier<Connection>
{
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard};

    use error_stack::Report;
    use time::{Date, Month, OffsetDateTime};

    use kernel::interface::database::{QueryDatabaseConnection, Transaction};
    use kernel::interface::query::{
        DependOnMovieQuery, DependOnRentalQuery, DependOnUserQuery, MovieQuery, RentalQuery,
        UserQuery,
    };
    use kernel::interface::update::{
        DependOnMovieModifier, DependOnRentalModifier, MovieModifier, RentalModifier,
    };
    use kernel::prelude::entity::{
        AdultsOnly, IsClosed, Movie, MovieId, MovieName, Rental, RentalId, RentalWithMovies,
        RentedAt, ReturnedAt, User, UserBirthDate, UserCpf, UserEmail, UserFirstName, UserId,
        UserLastName,
    };
    use kernel::KernelError;

    use super::{CloseRentalService, CreateRentalService, GetRentalService};
    use crate::transfer::{CloseRentalDto, CreateRentalDto, GetRentalDto};

    #[derive(Default)]
    struct StoreState {
        users: Vec<User>,
        movies: Vec<Movie>,
        rentals: Vec<Rental>,
        next_rental_id: i32,
    }

    struct MockConnection {
        state: Arc<Mutex<StoreState>>,
    }

    #[async_trait::async_trait]
    impl Transaction for MockConnection {
        async fn commit(self) -> error_stack::Result<(), KernelError> {
            Ok(())
        }

        async fn roll_back(self) -> error_stack::Result<(), KernelError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockUserQuery;

    #[async_trait::async_trait]
    impl UserQuery<MockConnection> for MockUserQuery {
        async fn find_by_id(
            &self,
            con: &mut MockConnection,
            id: &UserId,
        ) -> error_stack::Result<Option<User>, KernelError> {
            let state = con.state.lock().unwrap();
            Ok(state.users.iter().find(|user| user.id() == id).cloned())
        }
    }

    #[derive(Default)]
    struct MockMovieQuery {
        lookups: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MovieQuery<MockConnection> for MockMovieQuery {
        async fn find_by_id(
            &self,
            con: &mut MockConnection,
            id: &MovieId,
        ) -> error_stack::Result<Option<Movie>, KernelError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let state = con.state.lock().unwrap();
            Ok(state.movies.iter().find(|movie| movie.id() == id).cloned())
        }

        async fn find_by_rental_id(
            &self,
            con: &mut MockConnection,
            rental_id: &RentalId,
        ) -> error_stack::Result<Vec<Movie>, KernelError> {
            let state = con.state.lock().unwrap();
            Ok(state
                .movies
                .iter()
                .filter(|movie| movie.rental_id().as_ref() == Some(rental_id))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MockRentalQuery;

    #[async_trait::async_trait]
    impl RentalQuery<MockConnection> for MockRentalQuery {
        async fn find_all(
            &self,
            con: &mut MockConnection,
        ) -> error_stack::Result<Vec<Rental>, KernelError> {
            let state = con.state.lock().unwrap();
            Ok(state.rentals.clone())
        }

        async fn find_by_id(
            &self,
            con: &mut MockConnection,
            id: &RentalId,
        ) -> error_stack::Result<Option<RentalWithMovies>, KernelError> {
            let state = con.state.lock().unwrap();
            let rental = state.rentals.iter().find(|rental| rental.id() == id);
            Ok(rental.map(|rental| {
                let movies = state
                    .movies
                    .iter()
                    .filter(|movie| movie.rental_id().as_ref() == Some(id))
                    .cloned()
                    .collect();
                RentalWithMovies::new(rental.clone(), movies)
            }))
        }

        async fn find_by_user_id(
            &self,
            con: &mut MockConnection,
            user_id: &UserId,
        ) -> error_stack::Result<Vec<Rental>, KernelError> {
            let state = con.state.lock().unwrap();
            Ok(state
                .rentals
                .iter()
                .filter(|rental| rental.user_id() == user_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MockRentalModifier;

    #[async_trait::async_trait]
    impl RentalModifier<MockConnection> for MockRentalModifier {
        async fn create(
            &self,
            con: &mut MockConnection,
            user_id: &UserId,
            rented_at: &RentedAt,
        ) -> error_stack::Result<Rental, KernelError> {
            let mut state = con.state.lock().unwrap();
            state.next_rental_id += 1;
            let rental = Rental::new(
                RentalId::new(state.next_rental_id),
                rented_at.clone(),
                None,
                user_id.clone(),
                IsClosed::new(false),
            );
            state.rentals.push(rental.clone());
            Ok(rental)
        }

        async fn close(
            &self,
            con: &mut MockConnection,
            id: &RentalId,
            returned_at: &ReturnedAt,
        ) -> error_stack::Result<Rental, KernelError> {
            let mut state = con.state.lock().unwrap();
            let rental = state
                .rentals
                .iter_mut()
                .find(|rental| rental.id() == id)
                .ok_or_else(|| Report::new(KernelError::Internal))?;
            let updated = Rental::new(
                id.clone(),
                rental.rented_at().clone(),
                Some(returned_at.clone()),
                rental.user_id().clone(),
                IsClosed::new(true),
            );
            *rental = updated.clone();
            Ok(updated)
        }
    }

    #[derive(Default)]
    struct MockMovieModifier;

    #[async_trait::async_trait]
    impl MovieModifier<MockConnection> for MockMovieModifier {
        async fn rent(
            &self,
            con: &mut MockConnection,
            id: &MovieId,
            rental_id: &RentalId,
        ) -> error_stack::Result<(), KernelError> {
            let mut state = con.state.lock().unwrap();
            let movie = state
                .movies
                .iter_mut()
                .find(|movie| movie.id() == id)
                .ok_or_else(|| Report::new(KernelError::Internal))?;
            *movie = Movie::new(
                id.clone(),
                movie.name().clone(),
                movie.adults_only().clone(),
                Some(rental_id.clone()),
            );
            Ok(())
        }

        async fn release(
            &self,
            con: &mut MockConnection,
            rental_id: &RentalId,
        ) -> error_stack::Result<(), KernelError> {
            let mut state = con.state.lock().unwrap();
            for movie in state
                .movies
                .iter_mut()
                .filter(|movie| movie.rental_id().as_ref() == Some(rental_id))
            {
                *movie = Movie::new(
                    movie.id().clone(),
                    movie.name().clone(),
                    movie.adults_only().clone(),
                    None,
                );
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Mock {
        state: Arc<Mutex<StoreState>>,
        movie_query: MockMovieQuery,
    }

    impl Mock {
        fn with_state(state: StoreState) -> Self {
            Self {
                state: Arc::new(Mutex::new(state)),
                movie_query: MockMovieQuery::default(),
            }
        }

        fn state(&self) -> MutexGuard<'_, StoreState> {
            self.state.lock().unwrap()
        }

        fn movie_lookups(&self) -> usize {
            self.movie_query.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl QueryDatabaseConnection<MockConnection> for Mock {
        async fn transact(&self) -> error_stack::Result<MockConnection, KernelError> {
            Ok(MockConnection {
                state: Arc::clone(&self.state),
            })
        }
    }

    impl DependOnUserQuery<MockConnection> for Mock {
        type UserQuery = MockUserQuery;
        fn user_query(&self) -> &Self::UserQuery {
            &MockUserQuery
        }
    }

    impl DependOnMovieQuery<MockConnection> for Mock {
        type MovieQuery = MockMovieQuery;
        fn movie_query(&self) -> &Self::MovieQuery {
            &self.movie_query
        }
    }

    impl DependOnRentalQuery<MockConnection> for Mock {
        type RentalQuery = MockRentalQuery;
        fn rental_query(&self) -> &Self::RentalQuery {
            &MockRentalQuery
        }
    }

    impl DependOnRentalModifier<MockConnection> for Mock {
        type RentalModifier = MockRentalModifier;
        fn rental_modifier(&self) -> &Self::RentalModifier {
            &MockRentalModifier
        }
    }

    impl DependOnMovieModifier<MockConnection> for Mock {
        type MovieModifier = MockMovieModifier;
        fn movie_modifier(&self) -> &Self::MovieModifier {
            &MockMovieModifier
        }
    }

    fn birth_years_ago(years: i32) -> Date {
        let today = OffsetDateTime::now_utc().date();
        Date::from_calendar_date(today.year() - years, Month::January, 1).unwrap()
    }

    fn user(id: i32, birth_date: Date) -> User {
        User::new(
            UserId::new(id),
            UserFirstName::new("Irma"),
            UserLastName::new("Vep"),
            UserEmail::new("irma@example.com"),
            UserCpf::new("52998224725"),
            UserBirthDate::new(birth_date),
        )
    }

    fn adult_user(id: i32) -> User {
        user(id, birth_years_ago(30))
    }

    fn minor_user(id: i32) -> User {
        user(id, birth_years_ago(10))
    }

    fn movie(id: i32, adults_only: bool, rental_id: Option<i32>) -> Movie {
        Movie::new(
            MovieId::new(id),
            MovieName::new("Le Cercle Rouge"),
            AdultsOnly::new(adults_only),
            rental_id.map(RentalId::new),
        )
    }

    fn open_rental(id: i32, user_id: i32) -> Rental {
        Rental::new(
            RentalId::new(id),
            RentedAt::new(OffsetDateTime::now_utc()),
            None,
            UserId::new(user_id),
            IsClosed::new(false),
        )
    }

    fn closed_rental(id: i32, user_id: i32) -> Rental {
        Rental::new(
            RentalId::new(id),
            RentedAt::new(OffsetDateTime::now_utc()),
            Some(ReturnedAt::new(OffsetDateTime::now_utc())),
            UserId::new(user_id),
            IsClosed::new(true),
        )
    }

    #[tokio::test]
    async fn returns_rentals() {
        let mock = Mock::with_state(StoreState {
            rentals: vec![open_rental(5, 9)],
            ..StoreState::default()
        });

        let rentals = mock.get_rentals().await.unwrap();

        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].id, 5);
        assert_eq!(rentals[0].user_id, 9);
        assert!(!rentals[0].closed);
        assert!(rentals[0].end_date.is_none());
    }

    #[tokio::test]
    async fn returns_rental_with_its_movies() {
        let mock = Mock::with_state(StoreState {
            rentals: vec![open_rental(5, 9)],
            movies: vec![movie(1, false, Some(5)), movie(2, false, None)],
            ..StoreState::default()
        });

        let rental = mock.get_rental_by_id(GetRentalDto { id: 5 }).await.unwrap();

        assert_eq!(rental.id, 5);
        assert_eq!(rental.user_id, 9);
        assert_eq!(rental.movies.len(), 1);
        assert_eq!(rental.movies[0].id, 1);
        assert_eq!(rental.movies[0].rental_id, Some(5));
        assert!(!rental.movies[0].adults_only);
        assert!(!rental.movies[0].name.is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_rental() {
        let mock = Mock::with_state(StoreState::default());

        let report = mock
            .get_rental_by_id(GetRentalDto { id: 1 })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::RentalNotFound
        ));
        assert_eq!(report.current_context().name(), "NotFoundError");
        assert_eq!(report.current_context().to_string(), "Rental not found.");
    }

    #[tokio::test]
    async fn creates_a_rental() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, false, None)],
            ..StoreState::default()
        });

        let rental = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap();

        assert_eq!(rental.user_id, 3);
        assert!(!rental.closed);
        assert!(rental.end_date.is_none());

        let state = mock.state();
        assert_eq!(state.rentals.len(), 1);
        assert_eq!(
            state.movies[0].rental_id().as_ref(),
            Some(&RentalId::new(rental.id))
        );
    }

    #[tokio::test]
    async fn closed_rentals_do_not_block_a_new_one() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, false, None)],
            rentals: vec![closed_rental(7, 3)],
            next_rental_id: 7,
        });

        let rental = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap();

        assert!(!rental.closed);
        assert_eq!(rental.id, 8);
    }

    #[tokio::test]
    async fn rejects_unknown_user_before_any_movie_lookup() {
        let mock = Mock::with_state(StoreState {
            movies: vec![movie(1, false, None)],
            ..StoreState::default()
        });

        let report = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap_err();

        assert!(matches!(report.current_context(), KernelError::UserNotFound));
        assert_eq!(report.current_context().to_string(), "User not found.");
        assert_eq!(mock.movie_lookups(), 0);
    }

    #[tokio::test]
    async fn rejects_user_with_a_pendent_rental() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, false, None)],
            rentals: vec![open_rental(7, 3)],
            next_rental_id: 7,
        });

        let report = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::PendentRental
        ));
        assert_eq!(report.current_context().name(), "PendentRentalError");
        assert_eq!(
            report.current_context().to_string(),
            "The user already have a rental!"
        );
    }

    #[tokio::test]
    async fn rejects_movie_already_in_a_rental() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, false, Some(7))],
            ..StoreState::default()
        });

        let report = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::MovieInRental
        ));
        assert_eq!(report.current_context().name(), "MovieInRentalError");
        assert_eq!(
            report.current_context().to_string(),
            "Movie already in a rental."
        );
    }

    #[tokio::test]
    async fn rejects_the_first_unknown_movie() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, false, None)],
            ..StoreState::default()
        });

        let report = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![2, 1],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::MovieNotFound
        ));
        assert_eq!(mock.movie_lookups(), 1);
        assert!(mock.state().rentals.is_empty());
    }

    #[tokio::test]
    async fn rejects_underage_user_for_adults_only_movie() {
        let mock = Mock::with_state(StoreState {
            users: vec![minor_user(3)],
            movies: vec![movie(1, true, None)],
            ..StoreState::default()
        });

        let report = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::AgeRestriction
        ));
        assert_eq!(report.current_context().name(), "AgeRestrictionError");
    }

    #[tokio::test]
    async fn allows_adult_user_for_adults_only_movie() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(3)],
            movies: vec![movie(1, true, None)],
            ..StoreState::default()
        });

        let rental = mock
            .create_rental(CreateRentalDto {
                user_id: 3,
                movie_ids: vec![1],
            })
            .await
            .unwrap();

        assert!(!rental.closed);
    }

    #[tokio::test]
    async fn closes_a_rental_and_releases_its_movies() {
        let mock = Mock::with_state(StoreState {
            users: vec![adult_user(9)],
            movies: vec![movie(1, false, Some(5))],
            rentals: vec![open_rental(5, 9)],
            next_rental_id: 5,
        });

        let rental = mock.close_rental(CloseRentalDto { id: 5 }).await.unwrap();

        assert!(rental.closed);
        assert!(rental.end_date.is_some());

        let state = mock.state();
        assert!(state.movies[0].rental_id().is_none());
        assert!(*state.rentals[0].closed().as_ref());
    }

    #[tokio::test]
    async fn rejects_closing_an_unknown_rental() {
        let mock = Mock::with_state(StoreState::default());

        let report = mock
            .close_rental(CloseRentalDto { id: 5 })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            KernelError::RentalNotFound
        ));
    }

    #[tokio::test]
    async fn closing_twice_is_benign() {
        let mock = Mock::with_state(StoreState {
            rentals: vec![closed_rental(5, 9)],
            next_rental_id: 5,
            ..StoreState::default()
        });
        let first_end = mock.state().rentals[0].returned_at().clone();

        let rental = mock.close_rental(CloseRentalDto { id: 5 }).await.unwrap();

        assert!(rental.closed);
        assert_eq!(rental.end_date, first_end.map(OffsetDateTime::from));
    }
}
