pub mod config;
pub mod db;
pub mod error;
pub mod mask;
pub mod models;
pub mod store;

pub use config::AppConfig;
pub use db::{DbPool, create_pool, init_schema};
pub use error::{StoreError, StoreResult};
pub use mask::mask_credit_card;
pub use models::{Address, CartItem, CreditCardInfo, Money, Order, OrderItem};
pub use store::OrderStore;
