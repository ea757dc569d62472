use crate::accounts::{models::NewUser, service::RegistrationError, AccountService};
use crate::api::handlers::{
    location_for, types::UserResponse, valid_email, valid_password, valid_username,
};
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
use uuid::Uuid;

#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterRequest {
    username: String,
    email: String,
    #[schema(value_type = String)]
    password: SecretString,
    location_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Malformed field or unknown location"),
        (status = 409, description = "User with the specified username or email already exists"),
        (status = 500, description = "Registration failed"),
    ),
    tag = "register"
)]
// axum handler for registration
#[instrument]
pub async fn register(
    accounts: Extension<Arc<AccountService>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("register request: {:?}", request);

    if !valid_username(&request.username) {
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string()).into_response();
    }

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if !valid_password(request.password.expose_secret()) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    let candidate = NewUser {
        username: request.username,
        email: request.email,
        password: request.password,
        location_id: request.location_id,
    };

    match accounts.register(candidate).await {
        Ok(user) => {
            let location = location_for(&accounts, &user).await;

            (
                StatusCode::CREATED,
                Json(UserResponse::from_user(user, location)),
            )
                .into_response()
        }
        Err(RegistrationError::DuplicateEmail) => {
            (StatusCode::CONFLICT, "Email already registered".to_string()).into_response()
        }
        Err(RegistrationError::DuplicateUsername) => {
            (StatusCode::CONFLICT, "Username already taken".to_string()).into_response()
        }
        Err(RegistrationError::InvalidLocation) => {
            (StatusCode::BAD_REQUEST, "Location does not exist".to_string()).into_response()
        }
        Err(RegistrationError::Storage(err)) => {
            error!("Failed to register user: {:?}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}
