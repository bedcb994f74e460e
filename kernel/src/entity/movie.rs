mod adults_only;
mod id;
mod name;

pub use self::{adults_only::*, id::*, name::*};
use crate::entity::RentalId;
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Movie {
    id: MovieId,
    name: MovieName,
    adults_only: AdultsOnly,
    rental_id: Option<RentalId>,
}

impl Movie {
    pub fn new(
        id: MovieId,
        name: MovieName,
        adults_only: AdultsOnly,
        rental_id: Option<RentalId>,
    ) -> Self {
        Self {
            id,
            name,
            adults_only,
            rental_id,
        }
    }
}
