use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A provider product's price mapping, with the amount in minor
/// currency units (the unit the provider bills in).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentPrice {
    pub product_ref: String,
    pub price_ref: String,
    pub amount: i64,
}
