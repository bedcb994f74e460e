use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct RentalId(i32);

impl RentalId {
    pub fn new(id: impl Into<i32>) -> Self {
        Self(id.into())
    }
}
