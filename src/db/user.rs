use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SafeUser, User, UserRole};
use crate::payment::PaymentClient;
use crate::utils::error::AppError;

/// Fields for a new user row; `password` is the already-hashed digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role: UserRole,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Persistence handler for the users table.
pub struct UserHandler {
    pool: PgPool,
    payment: PaymentClient,
}

impl UserHandler {
    pub fn new(pool: PgPool, payment: PaymentClient) -> Self {
        Self { pool, payment }
    }

    /// Finds a user by email, returning the full row including the
    /// password digest so sign-in can verify the credential. Callers must
    /// project to [`SafeUser`] before anything leaves the process.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, role, username, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user and, for guests, registers them as a customer
    /// at the payment provider inside the same transaction. If either the
    /// provider call or the mapping insert fails the user insert rolls
    /// back and the caller observes "user not created".
    pub async fn create(&self, new_user: NewUser) -> Result<Option<SafeUser>, AppError> {
        let user_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, role, username, email, password) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, role, username, email, password",
        )
        .bind(user_id)
        .bind(new_user.role)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user) = inserted else {
            return Ok(None);
        };
        let safe_user = SafeUser::from(user);

        // Guests are the purchasers, so only they get a customer record.
        if safe_user.role == UserRole::Guest {
            let customer_ref = self.payment.create_customer(&safe_user).await?;

            sqlx::query("INSERT INTO payment_customers (user_id, customer_ref) VALUES ($1, $2)")
                .bind(safe_user.id)
                .bind(&customer_ref)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Some(safe_user))
    }

    /// Looks up the payment provider customer id for a user.
    pub async fn find_customer_ref(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let customer_ref = sqlx::query_scalar::<_, String>(
            "SELECT customer_ref FROM payment_customers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer_ref)
    }
}
