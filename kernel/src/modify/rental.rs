use crate::database::Transaction;
use crate::entity::{Rental, RentalId, RentedAt, ReturnedAt, UserId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait RentalModifier<Connection: Transaction>: 'static + Sync + Send {
    /// Inserts an open rental; the store assigns the id.
    async fn create(
        &self,
        con: &mut Connection,
        user_id: &UserId,
        rented_at: &RentedAt,
    ) -> error_stack::Result<Rental, KernelError>;

    async fn close(
        &self,
        con: &mut Connection,
        id: &RentalId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Rental, KernelError>;
}

pub trait DependOnRentalModifier<Connection: Transaction>: 'static + Sync + Send {
    type RentalModifier: RentalModifier<Connection>;
    fn rental_modifier(&self) -> &Self::RentalModifier;
}
