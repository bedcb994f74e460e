use time::OffsetDateTime;

use kernel::prelude::entity::{DestructRental, DestructRentalWithMovies, Rental, RentalWithMovies};

use crate::transfer::MovieDto;

#[derive(Debug, Clone)]
pub struct RentalDto {
    pub id: i32,
    pub date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub user_id: i32,
    pub closed: bool,
}

impl From<Rental> for RentalDto {
    fn from(value: Rental) -> Self {
        let DestructRental {
            id,
            rented_at,
            returned_at,
            user_id,
            closed,
        } = value.into_destruct();
        Self {
            id: id.into(),
            date: rented_at.into(),
            end_date: returned_at.map(Into::into),
            user_id: user_id.into(),
            closed: closed.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RentalWithMoviesDto {
    pub id: i32,
    pub date: OffsetDateTime,
    pub end_date: Option<OffsetDateTime>,
    pub user_id: i32,
    pub closed: bool,
    pub movies: Vec<MovieDto>,
}

impl From<RentalWithMovies> for RentalWithMoviesDto {
    fn from(value: RentalWithMovies) -> Self {
        let DestructRentalWithMovies { rental, movies } = value.into_destruct();
        let RentalDto {
            id,
            date,
            end_date,
            user_id,
            closed,
        } = RentalDto::from(rental);
        Self {
            id,
            date,
            end_date,
            user_id,
            closed,
            movies: movies.into_iter().map(MovieDto::from).collect(),
        }
    }
}

pub struct GetRentalDto {
    pub id: i32,
}

pub struct CreateRentalDto {
    pub user_id: i32,
    pub movie_ids: Vec<i32>,
}

pub struct CloseRentalDto {
    pub id: i32,
}
