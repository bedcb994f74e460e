use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::RentalQuery;
use kernel::interface::update::RentalModifier;
use kernel::prelude::entity::{
    IsClosed, Rental, RentalId, RentalWithMovies, RentedAt, ReturnedAt, UserId,
};
use kernel::KernelError;

use crate::database::postgres::movie::PgMovieInternal;
use crate::database::postgres::PostgresConnection;
use crate::error::ConvertError;

pub struct PostgresRentalRepository;

#[async_trait::async_trait]
impl RentalQuery<PostgresConnection> for PostgresRentalRepository {
    async fn find_all(
        &self,
        con: &mut PostgresConnection,
    ) -> error_stack::Result<Vec<Rental>, KernelError> {
        PgRentalInternal::find_all(con).await
    }

    async fn find_by_id(
        &self,
        con: &mut PostgresConnection,
        id: &RentalId,
    ) -> error_stack::Result<Option<RentalWithMovies>, KernelError> {
        PgRentalInternal::find_by_id(con, id).await
    }

    async fn find_by_user_id(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<Rental>, KernelError> {
        PgRentalInternal::find_by_user_id(con, user_id).await
    }
}

#[async_trait::async_trait]
impl RentalModifier<PostgresConnection> for PostgresRentalRepository {
    async fn create(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
        rented_at: &RentedAt,
    ) -> error_stack::Result<Rental, KernelError> {
        PgRentalInternal::create(con, user_id, rented_at).await
    }

    async fn close(
        &self,
        con: &mut PostgresConnection,
        id: &RentalId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Rental, KernelError> {
        PgRentalInternal::close(con, id, returned_at).await
    }
}

#[derive(sqlx::FromRow)]
struct RentalRow {
    id: i32,
    rented_at: OffsetDateTime,
    returned_at: Option<OffsetDateTime>,
    user_id: i32,
    closed: bool,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental::new(
            RentalId::new(row.id),
            RentedAt::new(row.rented_at),
            row.returned_at.map(ReturnedAt::new),
            UserId::new(row.user_id),
            IsClosed::new(row.closed),
        )
    }
}

pub(in crate::database) struct PgRentalInternal;

impl PgRentalInternal {
    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Rental>, KernelError> {
        let rows = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            SELECT id, rented_at, returned_at, user_id, closed
            FROM rentals
            ORDER BY id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn find_by_id(
        con: &mut PgConnection,
        id: &RentalId,
    ) -> error_stack::Result<Option<RentalWithMovies>, KernelError> {
        let row = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            SELECT id, rented_at, returned_at, user_id, closed
            FROM rentals
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(&mut *con)
        .await
        .convert_error()?;
        match row {
            None => Ok(None),
            Some(row) => {
                let movies = PgMovieInternal::find_by_rental_id(con, id).await?;
                Ok(Some(RentalWithMovies::new(Rental::from(row), movies)))
            }
        }
    }

    async fn find_by_user_id(
        con: &mut PgConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<Rental>, KernelError> {
        let rows = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            SELECT id, rented_at, returned_at, user_id, closed
            FROM rentals
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn create(
        con: &mut PgConnection,
        user_id: &UserId,
        rented_at: &RentedAt,
    ) -> error_stack::Result<Rental, KernelError> {
        let row = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            INSERT INTO rentals (rented_at, returned_at, user_id, closed)
            VALUES ($1, NULL, $2, FALSE)
            RETURNING id, rented_at, returned_at, user_id, closed
            "#,
        )
        .bind(rented_at.as_ref())
        .bind(user_id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(Rental::from(row))
    }

    async fn close(
        con: &mut PgConnection,
        id: &RentalId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Rental, KernelError> {
        let row = sqlx::query_as::<_, RentalRow>(
            // language=postgresql
            r#"
            UPDATE rentals
            SET closed = TRUE, returned_at = $2
            WHERE id = $1
            RETURNING id, rented_at, returned_at, user_id, closed
            "#,
        )
        .bind(id.as_ref())
        .bind(returned_at.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(Rental::from(row))
    }
}
