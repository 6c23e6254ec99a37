use sqlx::{Connection, Postgres, Transaction};

use crate::db::DbPool;
use crate::error::{StoreError, StoreResult, classify_read};
use crate::mask::mask_credit_card;
use crate::models::{Address, CartItem, CreditCardInfo, Money, Order};

const INSERT_ORDER_SQL: &str = r#"
    INSERT INTO orders (
        order_id, user_id, email, street_address, city, state, country, zip_code,
        credit_card_number_masked, credit_card_cvv, credit_card_exp_month,
        credit_card_exp_year, order_total, currency_code, shipping_tracking_id
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
"#;

const INSERT_ITEM_SQL: &str = r#"
    INSERT INTO order_items (order_id, product_id, quantity)
    VALUES ($1, $2, $3)
"#;

const SELECT_ORDER_SQL: &str = r#"
    SELECT order_id, user_id, email, street_address, city, state, country, zip_code,
           credit_card_number_masked, credit_card_cvv, credit_card_exp_month,
           credit_card_exp_year, order_total, currency_code, shipping_tracking_id, created_at
    FROM orders
    WHERE order_id = $1
"#;

const SELECT_USER_ORDERS_SQL: &str = r#"
    SELECT order_id, user_id, email, street_address, city, state, country, zip_code,
           credit_card_number_masked, credit_card_cvv, credit_card_exp_month,
           credit_card_exp_year, order_total, currency_code, shipping_tracking_id, created_at
    FROM orders
    WHERE user_id = $1
    ORDER BY created_at DESC
"#;

/// Persists and retrieves checkout orders. The pool is injected at
/// construction; concurrent callers each get their own pooled connection.
pub struct OrderStore {
    pool: DbPool,
}

impl OrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record an order header and its items in one transaction. The write is
    /// all-or-nothing: a failure at any step rolls back and no rows of either
    /// table survive. A duplicate `order_id` fails the header insert rather
    /// than overwriting. Dropping the returned future mid-flight (caller
    /// timeout or cancellation) abandons the transaction, which rolls back.
    #[allow(clippy::too_many_arguments)]
    pub async fn save_order(
        &self,
        order_id: &str,
        user_id: &str,
        email: &str,
        address: &Address,
        credit_card: &CreditCardInfo,
        total: &Money,
        items: &[CartItem],
        tracking_id: &str,
    ) -> StoreResult<()> {
        if order_id.is_empty() {
            return Err(StoreError::InvalidArgument("order_id must not be empty"));
        }
        if user_id.is_empty() {
            return Err(StoreError::InvalidArgument("user_id must not be empty"));
        }

        let mut conn = self.pool.acquire().await.map_err(StoreError::Connection)?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| StoreError::transaction("begin", e))?;

        match insert_order_rows(
            &mut tx,
            order_id,
            user_id,
            email,
            address,
            credit_card,
            total,
            items,
            tracking_id,
        )
        .await
        {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| StoreError::transaction("commit", e))?;
                tracing::info!(order_id, "order persisted");
                Ok(())
            }
            Err(err) => {
                // A rollback failure must not mask the write error that
                // caused it.
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(order_id, error = %rollback_err, "rollback failed after write error");
                }
                Err(err)
            }
        }
    }

    /// Point lookup by order id. An absent row is `StoreError::NotFound`,
    /// distinct from every infrastructure failure.
    pub async fn get_order(&self, order_id: &str) -> StoreResult<Order> {
        let order = sqlx::query_as::<_, Order>(SELECT_ORDER_SQL)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_read)?;
        order.ok_or_else(|| StoreError::not_found(order_id))
    }

    /// All orders for a customer, most recent first. A customer with no
    /// orders yields an empty vec, not an error.
    pub async fn get_user_orders(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        sqlx::query_as::<_, Order>(SELECT_USER_ORDERS_SQL)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify_read)
    }
}

#[allow(clippy::too_many_arguments)]
async fn insert_order_rows(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    user_id: &str,
    email: &str,
    address: &Address,
    credit_card: &CreditCardInfo,
    total: &Money,
    items: &[CartItem],
    tracking_id: &str,
) -> StoreResult<()> {
    let masked_card = mask_credit_card(&credit_card.credit_card_number);
    let order_total = total.to_decimal();

    // created_at is deliberately absent: the store assigns it.
    sqlx::query(INSERT_ORDER_SQL)
        .bind(order_id)
        .bind(user_id)
        .bind(email)
        .bind(&address.street_address)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.country)
        .bind(&address.zip_code)
        .bind(masked_card)
        .bind(&credit_card.credit_card_cvv)
        .bind(credit_card.credit_card_expiration_month)
        .bind(credit_card.credit_card_expiration_year)
        .bind(order_total)
        .bind(&total.currency_code)
        .bind(tracking_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::write("order", e))?;

    // One row per item, preserving input order.
    for item in items {
        sqlx::query(INSERT_ITEM_SQL)
            .bind(order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .execute(&mut **tx)
            .await
            .map_err(|e| StoreError::write("order item", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn lazy_store() -> OrderStore {
        // connect_lazy never touches the network, so precondition checks can
        // be exercised without a database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/orders")
            .expect("valid url");
        OrderStore::new(pool)
    }

    fn sample_address() -> Address {
        Address {
            street_address: "1600 Amphitheatre Pkwy".into(),
            city: "Mountain View".into(),
            state: "CA".into(),
            country: "USA".into(),
            zip_code: "94043".into(),
        }
    }

    fn sample_card() -> CreditCardInfo {
        CreditCardInfo {
            credit_card_number: "4111111111111111".into(),
            credit_card_cvv: "123".into(),
            credit_card_expiration_month: 1,
            credit_card_expiration_year: 2030,
        }
    }

    fn sample_total() -> Money {
        Money {
            currency_code: "USD".into(),
            units: 10,
            nanos: 0,
        }
    }

    #[tokio::test]
    async fn empty_order_id_is_rejected_before_touching_the_store() {
        let store = lazy_store();
        let err = store
            .save_order(
                "",
                "user-1",
                "someone@example.com",
                &sample_address(),
                &sample_card(),
                &sample_total(),
                &[],
                "tracking-1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_before_touching_the_store() {
        let store = lazy_store();
        let err = store
            .save_order(
                "order-1",
                "",
                "someone@example.com",
                &sample_address(),
                &sample_card(),
                &sample_total(),
                &[],
                "tracking-1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}
