use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct MovieId(i32);

impl MovieId {
    pub fn new(id: impl Into<i32>) -> Self {
        Self(id.into())
    }
}
