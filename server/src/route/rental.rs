mod request;
mod response;

use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::rental::request::CreateRentalRequest;
use crate::route::rental::response::{RentalResponse, RentalWithMoviesResponse};
use application::service::{CloseRentalService, CreateRentalService, GetRentalService};
use application::transfer::{CloseRentalDto, GetRentalDto};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

pub trait RentalRouter {
    fn route_rental(self) -> Self;
}

impl RentalRouter for Router<AppModule> {
    fn route_rental(self) -> Self {
        self.route(
            "/rentals",
            get(|State(handler): State<AppModule>| async move {
                handler
                    .pgpool()
                    .get_rentals()
                    .await
                    .map(|rentals| {
                        Json(
                            rentals
                                .into_iter()
                                .map(RentalResponse::from)
                                .collect::<Vec<_>>(),
                        )
                    })
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(handler): State<AppModule>, Json(req): Json<CreateRentalRequest>| async move {
                    handler
                        .pgpool()
                        .create_rental(req.into())
                        .await
                        .map(|rental| (StatusCode::CREATED, Json(RentalResponse::from(rental))))
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/rentals/:id",
            get(
                |State(handler): State<AppModule>, Path(id): Path<i32>| async move {
                    handler
                        .pgpool()
                        .get_rental_by_id(GetRentalDto { id })
                        .await
                        .map(|rental| Json(RentalWithMoviesResponse::from(rental)))
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(handler): State<AppModule>, Path(id): Path<i32>| async move {
                    handler
                        .pgpool()
                        .close_rental(CloseRentalDto { id })
                        .await
                        .map(|rental| Json(RentalResponse::from(rental)))
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
