use crate::accounts::{service::LoginError, AccountService};
use crate::api::handlers::{location_for, types::UserResponse, valid_email, valid_password};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    email: String,
    #[schema(value_type = String)]
    password: SecretString,
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse, content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Login failed"),
    ),
    tag = "login"
)]
// axum handler for login
#[instrument]
pub async fn login(
    accounts: Extension<Arc<AccountService>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("login request: {:?}", request);

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if !valid_password(request.password.expose_secret()) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    match accounts.login(&request.email, &request.password).await {
        Ok(user) => {
            let location = location_for(&accounts, &user).await;

            (
                StatusCode::OK,
                Json(UserResponse::from_user(user, location)),
            )
                .into_response()
        }
        // Unknown email and wrong password produce this same response.
        Err(LoginError::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
        }
        Err(LoginError::Storage(err)) => {
            error!("Failed to verify credentials: {:?}", err);

            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string()).into_response()
        }
    }
}
