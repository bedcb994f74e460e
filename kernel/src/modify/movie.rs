use crate::database::Transaction;
use crate::entity::{MovieId, RentalId};
use crate::KernelError;

/// The rental reference is the only movie field this system owns.
#[async_trait::async_trait]
pub trait MovieModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn rent(
        &self,
        con: &mut Connection,
        id: &MovieId,
        rental_id: &RentalId,
    ) -> error_stack::Result<(), KernelError>;

    async fn release(
        &self,
        con: &mut Connection,
        rental_id: &RentalId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnMovieModifier<Connection: Transaction>: 'static + Sync + Send {
    type MovieModifier: MovieModifier<Connection>;
    fn movie_modifier(&self) -> &Self::MovieModifier;
}
