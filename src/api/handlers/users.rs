//! User read endpoints.

use crate::accounts::AccountService;
use crate::api::handlers::{location_for, types::UserResponse};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse, content_type = "application/json"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Lookup failed"),
    ),
    tag = "users"
)]
// axum handler for fetching a single user
#[instrument]
pub async fn user(
    accounts: Extension<Arc<AccountService>>,
    Path(user_id): Path<Uuid>,
) -> Response {
    match accounts.find_user(user_id).await {
        Ok(Some(user)) => {
            // The location is resolved here, at the boundary, rather than
            // by the store.
            let location = location_for(&accounts, &user).await;

            (
                StatusCode::OK,
                Json(UserResponse::from_user(user, location)),
            )
                .into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "User not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to fetch user {}: {:?}", user_id, err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching user".to_string(),
            )
                .into_response()
        }
    }
}
