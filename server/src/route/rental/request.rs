use application::transfer::CreateRentalDto;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    user_id: i32,
    movie_ids: Vec<i32>,
}

impl From<CreateRentalRequest> for CreateRentalDto {
    fn from(value: CreateRentalRequest) -> Self {
        let CreateRentalRequest { user_id, movie_ids } = value;
        CreateRentalDto { user_id, movie_ids }
    }
}
