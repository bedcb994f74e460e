mod closed;
mod id;
mod rented_at;
mod returned_at;

pub use self::{closed::*, id::*, rented_at::*, returned_at::*};
use crate::entity::{Movie, UserId};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Rental {
    id: RentalId,
    rented_at: RentedAt,
    returned_at: Option<ReturnedAt>,
    user_id: UserId,
    closed: IsClosed,
}

impl Rental {
    pub fn new(
        id: RentalId,
        rented_at: RentedAt,
        returned_at: Option<ReturnedAt>,
        user_id: UserId,
        closed: IsClosed,
    ) -> Self {
        Self {
            id,
            rented_at,
            returned_at,
            user_id,
            closed,
        }
    }
}

/// Detail projection: the rental plus every movie currently attached to it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct RentalWithMovies {
    rental: Rental,
    movies: Vec<Movie>,
}

impl RentalWithMovies {
    pub fn new(rental: Rental, movies: Vec<Movie>) -> Self {
        Self { rental, movies }
    }
}
