mod birth_date;
mod cpf;
mod email;
mod id;
mod name;

pub use self::{birth_date::*, cpf::*, email::*, id::*, name::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct User {
    id: UserId,
    first_name: UserFirstName,
    last_name: UserLastName,
    email: UserEmail,
    cpf: UserCpf,
    birth_date: UserBirthDate,
}

impl User {
    pub fn new(
        id: UserId,
        first_name: UserFirstName,
        last_name: UserLastName,
        email: UserEmail,
        cpf: UserCpf,
        birth_date: UserBirthDate,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            cpf,
            birth_date,
        }
    }
}
