//! Account routes for sign-up and sign-in.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tracing::{error, info};

use crate::{AppState, error::ApiError};
use coffer_core::auth::{hash_password, verify_password};
use coffer_db::{UserRepository, repositories::is_unique_violation};
use coffer_shared::auth::{CredentialsRequest, SignInResponse, SignUpResponse};
use coffer_shared::{AppError, OwnerId};

const INVALID_CREDENTIALS: &str = "Invalid user name or password";

/// Creates the account router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/sign-up", post(sign_up))
        .route("/users/sign-in", post(sign_in))
}

/// POST /users/sign-up - Create an account and return an access token.
async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    if let Some(message) = payload.missing_fields() {
        return Err(AppError::Validation(message.to_string()).into());
    }
    let user_name = payload.user_name.trim();
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.user_name_exists(user_name).await {
        Ok(false) => {}
        Ok(true) => {
            info!(user_name = %user_name, "Sign-up with taken user name");
            return Err(AppError::Conflict("User name is already taken".to_string()).into());
        }
        Err(e) => return Err(AppError::Database(e.to_string()).into()),
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| AppError::Internal(e.to_string()))?;

    // A concurrent sign-up can still win the race to the unique index.
    let user = user_repo
        .create(user_name, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("User name is already taken".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

    let owner_id = OwnerId(user.id);
    let token = state
        .jwt_service
        .generate_access_token(owner_id, &user.user_name)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(owner_id = %owner_id, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: "Successfully signed up".to_string(),
            user_id: owner_id,
            token,
        }),
    ))
}

/// POST /users/sign-in - Check credentials and return an access token.
async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    if let Some(message) = payload.missing_fields() {
        return Err(AppError::Validation(message.to_string()).into());
    }
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_user_name(payload.user_name.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!("Sign-in attempt for non-existent user");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }
        Err(e) => return Err(AppError::Database(e.to_string()).into()),
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(owner_id = user.id, "Failed sign-in attempt - invalid password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
        }
        Err(e) => {
            error!(owner_id = user.id, error = %e, "Password verification error");
            return Err(AppError::Internal(e.to_string()).into());
        }
    }

    let token = state
        .jwt_service
        .generate_access_token(OwnerId(user.id), &user.user_name)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(SignInResponse {
        message: "Successfully signed in".to_string(),
        token,
        expires_in: state.jwt_service.access_token_expires_in(),
    }))
}
