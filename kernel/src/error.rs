use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    UserNotFound,
    RentalNotFound,
    MovieNotFound,
    PendentRental,
    MovieInRental,
    AgeRestriction,
    Timeout,
    Internal,
}

impl KernelError {
    /// Wire-level kind. The three not-found variants share one kind.
    pub fn name(&self) -> &'static str {
        match self {
            KernelError::UserNotFound
            | KernelError::RentalNotFound
            | KernelError::MovieNotFound => "NotFoundError",
            KernelError::PendentRental => "PendentRentalError",
            KernelError::MovieInRental => "MovieInRentalError",
            KernelError::AgeRestriction => "AgeRestrictionError",
            KernelError::Timeout => "TimeoutError",
            KernelError::Internal => "InternalError",
        }
    }
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::UserNotFound => write!(f, "User not found."),
            KernelError::RentalNotFound => write!(f, "Rental not found."),
            KernelError::MovieNotFound => write!(f, "Movie not found."),
            KernelError::PendentRental => write!(f, "The user already have a rental!"),
            KernelError::MovieInRental => write!(f, "Movie already in a rental."),
            KernelError::AgeRestriction => {
                write!(f, "The user is not old enough for adults only movies.")
            }
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
