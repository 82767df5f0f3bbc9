use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{SafeUser, UserRole};
use crate::state::AppState;
use crate::utils::error::AppError;

/// Name of the HTTP-only cookie carrying the signed session token.
pub const AUTH_COOKIE_NAME: &str = "auth-cookie";

/// Sessions last one week.
const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Signed session payload. Mirrors [`SafeUser`]; the password digest is
/// structurally absent so it can never leak into a token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    id: Uuid,
    role: UserRole,
    username: String,
    email: String,
    exp: i64,
}

impl SessionClaims {
    fn for_user(user: &SafeUser) -> Self {
        Self {
            id: user.id,
            role: user.role,
            username: user.username.clone(),
            email: user.email.clone(),
            exp: Utc::now().timestamp() + SESSION_TTL_SECS,
        }
    }
}

impl From<SessionClaims> for SafeUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.id,
            role: claims.role,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Signs `user` into a compact session token.
pub fn sign_session_token(secret: &str, user: &SafeUser) -> Result<String, AppError> {
    encode(
        &Header::default(),
        &SessionClaims::for_user(user),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("could not sign session token: {e}")))
}

/// Verifies signature and expiry, returning the session's user.
pub fn verify_session_token(secret: &str, token: &str) -> Result<SafeUser, AppError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Unauthorized".to_string()))?;

    Ok(data.claims.into())
}

/// Builds the `Set-Cookie` value for a fresh session: HTTP-only,
/// path "/", one-week expiry.
pub fn session_cookie(secret: &str, user: &SafeUser) -> Result<String, AppError> {
    let token = sign_session_token(secret, user)?;

    Ok(format!(
        "{AUTH_COOKIE_NAME}={token}; Max-Age={SESSION_TTL_SECS}; Path=/; HttpOnly"
    ))
}

/// Builds the `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{AUTH_COOKIE_NAME}=; Max-Age=0; Path=/; HttpOnly")
}

/// Middleware guarding protected routes. Rejects requests without a
/// valid session cookie before the handler runs; on success the decoded
/// [`SafeUser`] is exposed to handlers as a request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_cookie)
        .ok_or_else(|| AppError::AuthError("Unauthorized".to_string()))?;

    let user = verify_session_token(&state.config.session_secret, &token)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn extract_session_cookie(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == AUTH_COOKIE_NAME).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> SafeUser {
        SafeUser {
            id: Uuid::new_v4(),
            role: UserRole::Guest,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn token_round_trips() {
        let user = sample_user();
        let token = sign_session_token("secret", &user).unwrap();
        let decoded = verify_session_token("secret", &token).unwrap();

        assert_eq!(decoded.id, user.id);
        assert_eq!(decoded.email, user.email);
        assert_eq!(decoded.role, UserRole::Guest);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_session_token("secret", &sample_user()).unwrap();
        assert!(verify_session_token("other-secret", &token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = sign_session_token("secret", &sample_user()).unwrap();
        token.push('x');
        assert!(verify_session_token("secret", &token).is_err());
    }

    #[test]
    fn cookie_has_expected_attributes() {
        let cookie = session_cookie("secret", &sample_user()).unwrap();

        assert!(cookie.starts_with("auth-cookie="));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_header_parsing_finds_the_session() {
        let header = "theme=dark; auth-cookie=tok123; lang=en";
        assert_eq!(extract_session_cookie(header).as_deref(), Some("tok123"));
        assert_eq!(extract_session_cookie("theme=dark"), None);
    }
}
