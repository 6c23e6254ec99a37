use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Payment card as authorized upstream. Only the masked number ever reaches
/// durable storage; see `mask_credit_card`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub credit_card_number: String,
    pub credit_card_cvv: String,
    pub credit_card_expiration_month: i32,
    pub credit_card_expiration_year: i32,
}

/// Two-part monetary amount: whole units plus nano fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    /// Collapse units + nanos into the single decimal value that gets
    /// persisted. Computed exactly, never through floating point.
    pub fn to_decimal(&self) -> BigDecimal {
        BigDecimal::from(self.units) + BigDecimal::from(self.nanos) / BigDecimal::from(1_000_000_000)
    }
}

/// One line of the cart as handed to the writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i32,
}

/// Persisted order header. Field names match the column names so the derived
/// `FromRow` impl is the single decode routine for both point and range reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub email: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub credit_card_number_masked: String,
    pub credit_card_cvv: String,
    pub credit_card_exp_month: i32,
    pub credit_card_exp_year: i32,
    pub order_total: BigDecimal,
    pub currency_code: String,
    pub shipping_tracking_id: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted order line. The id is store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
}
