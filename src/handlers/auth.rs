use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{clear_session_cookie, session_cookie};
use crate::crypto;
use crate::db::user::NewUser;
use crate::models::{SafeUser, UserRole};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub role: UserRole,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::ValidationError(
                "email must be a valid address".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(AppError::ValidationError(
                "password must not be empty".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(AppError::ValidationError(
                "password and confirm_password do not match".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, AppError> {
    body.validate()?;

    let created = state
        .user_handler()
        .create(NewUser {
            role: body.role,
            username: body.username,
            email: body.email,
            password: crypto::hash(&body.password),
        })
        .await?
        .ok_or_else(|| AppError::InternalServerError("User not created".to_string()))?;

    let cookie = session_cookie(&state.config.session_secret, &created)?;

    with_cookie(success(&created, "User created"), &cookie)
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Response, AppError> {
    let user = state
        .user_handler()
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("No user found".to_string()))?;

    if !crypto::verify(&body.password, &user.password) {
        return Err(AppError::AuthError("Unauthorized".to_string()));
    }

    let safe_user = SafeUser::from(user);
    let cookie = session_cookie(&state.config.session_secret, &safe_user)?;

    with_cookie(success(&safe_user, "Signed in"), &cookie)
}

/// Echoes the verified session payload back to the client.
pub async fn validate(Extension(user): Extension<SafeUser>) -> Response {
    success(user, "Session valid")
}

pub async fn sign_out() -> Result<Response, AppError> {
    with_cookie(empty_success("User signed out"), &clear_session_cookie())
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| AppError::InternalServerError("Invalid session cookie".to_string()))?;
    response.headers_mut().append(header::SET_COOKIE, value);

    Ok(response)
}
