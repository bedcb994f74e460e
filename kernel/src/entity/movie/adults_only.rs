use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct AdultsOnly(bool);

impl AdultsOnly {
    pub fn new(value: impl Into<bool>) -> Self {
        Self(value.into())
    }
}
