use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("register with missing fields");
        return Err(ApiError::Validation("Email and password required".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::Conflict("User already exists".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Unknown email and wrong password must be indistinguishable to the
    // caller.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_carries_only_the_token() {
        let response = AuthResponse {
            token: "header.payload.signature".to_string(),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["token"], "header.payload.signature");
        assert_eq!(json.as_object().expect("object").len(), 1);
    }

    #[test]
    fn register_request_defaults_missing_fields_to_empty() {
        let payload: RegisterRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(payload.email.is_empty());
        assert!(payload.password.is_empty());
    }
}
