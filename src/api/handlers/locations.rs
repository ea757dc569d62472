//! Location endpoints.
//!
//! Locations are created by an administrative call and immutable afterwards;
//! users reference them by id at registration time.

use crate::accounts::AccountService;
use crate::api::handlers::{types::LocationResponse, valid_location_name};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LocationCreateRequest {
    name: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "All locations", body = [LocationResponse], content_type = "application/json"),
        (status = 500, description = "Listing failed"),
    ),
    tag = "locations"
)]
// axum handler for listing locations
#[instrument]
pub async fn list_locations(accounts: Extension<Arc<AccountService>>) -> Response {
    match accounts.list_locations().await {
        Ok(locations) => {
            let body: Vec<LocationResponse> =
                locations.into_iter().map(LocationResponse::from).collect();

            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("Failed to list locations: {:?}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error listing locations".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = LocationCreateRequest,
    responses(
        (status = 201, description = "Location created", body = LocationResponse, content_type = "application/json"),
        (status = 400, description = "Invalid name"),
        (status = 500, description = "Creation failed"),
    ),
    tag = "locations"
)]
// axum handler for creating a location
#[instrument]
pub async fn create_location(
    accounts: Extension<Arc<AccountService>>,
    payload: Option<Json<LocationCreateRequest>>,
) -> Response {
    let request: LocationCreateRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("create location request: {:?}", request);

    if !valid_location_name(&request.name) {
        return (StatusCode::BAD_REQUEST, "Invalid name".to_string()).into_response();
    }

    match accounts.create_location(request.name.trim()).await {
        Ok(location) => {
            (StatusCode::CREATED, Json(LocationResponse::from(location))).into_response()
        }
        Err(err) => {
            error!("Failed to create location: {:?}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating location".to_string(),
            )
                .into_response()
        }
    }
}
