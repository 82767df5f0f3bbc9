use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role assigned at sign-up; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Guest,
    Organiser,
    Admin,
}

/// Full user row, including the password digest. Never serialize this
/// directly into a response; project to [`SafeUser`] first.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub role: UserRole,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A user with the password digest stripped, safe for external exposure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SafeUser {
    pub id: Uuid,
    pub role: UserRole,
    pub username: String,
    pub email: String,
}

impl From<User> for SafeUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            username: user.username,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_user_drops_the_password_digest() {
        let user = User {
            id: Uuid::new_v4(),
            role: UserRole::Guest,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "digest".to_string(),
        };

        let safe = SafeUser::from(user.clone());
        let json = serde_json::to_value(&safe).unwrap();

        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["role"], "GUEST");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn role_uses_uppercase_wire_form() {
        assert_eq!(
            serde_json::to_string(&UserRole::Organiser).unwrap(),
            "\"ORGANISER\""
        );
    }
}
