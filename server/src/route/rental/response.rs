use application::transfer::{MovieDto, RentalDto, RentalWithMoviesDto};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct RentalResponse {
    id: i32,
    date: OffsetDateTime,
    end_date: Option<OffsetDateTime>,
    user_id: i32,
    closed: bool,
}

impl From<RentalDto> for RentalResponse {
    fn from(value: RentalDto) -> Self {
        let RentalDto {
            id,
            date,
            end_date,
            user_id,
            closed,
        } = value;
        Self {
            id,
            date,
            end_date,
            user_id,
            closed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    id: i32,
    name: String,
    adults_only: bool,
    rental_id: Option<i32>,
}

impl From<MovieDto> for MovieResponse {
    fn from(value: MovieDto) -> Self {
        let MovieDto {
            id,
            name,
            adults_only,
            rental_id,
        } = value;
        Self {
            id,
            name,
            adults_only,
            rental_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RentalWithMoviesResponse {
    id: i32,
    date: OffsetDateTime,
    end_date: Option<OffsetDateTime>,
    user_id: i32,
    closed: bool,
    movies: Vec<MovieResponse>,
}

impl From<RentalWithMoviesDto> for RentalWithMoviesResponse {
    fn from(value: RentalWithMoviesDto) -> Self {
        let RentalWithMoviesDto {
            id,
            date,
            end_date,
            user_id,
            closed,
            movies,
        } = value;
        Self {
            id,
            date,
            end_date,
            user_id,
            closed,
            movies: movies.into_iter().map(MovieResponse::from).collect(),
        }
    }
}
