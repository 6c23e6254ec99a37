use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy of the order store. Each variant carries the stage that
/// failed plus the underlying cause, so callers branch on the variant while
/// logs still see the full chain.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to acquire database connection")]
    Connection(#[source] sqlx::Error),

    #[error("failed to {stage} transaction")]
    Transaction {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to insert {what}")]
    Write {
        what: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("failed to decode order row")]
    Decode(#[source] sqlx::Error),

    #[error("schema initialization failed: {stage}")]
    SchemaInit {
        stage: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl StoreError {
    pub(crate) fn transaction(stage: &'static str, source: sqlx::Error) -> Self {
        StoreError::Transaction { stage, source }
    }

    pub(crate) fn write(what: &'static str, source: sqlx::Error) -> Self {
        StoreError::Write { what, source }
    }

    pub(crate) fn not_found(order_id: &str) -> Self {
        StoreError::NotFound {
            order_id: order_id.to_string(),
        }
    }

    pub(crate) fn schema_init(stage: impl Into<String>, source: sqlx::Error) -> Self {
        StoreError::SchemaInit {
            stage: stage.into(),
            source: Some(source),
        }
    }

    pub(crate) fn schema_init_timeout(budget: Duration) -> Self {
        StoreError::SchemaInit {
            stage: format!("timed out after {budget:?}"),
            source: None,
        }
    }

    /// True when the error means the requested order does not exist, as
    /// opposed to an infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Classify an error coming back from a read query. Row-shape problems are
/// decode failures; everything else on the read path means the store itself
/// was unreachable or rejected the query.
pub(crate) fn classify_read(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StoreError::Decode(err),
        err => StoreError::Connection(err),
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = StoreError::not_found("order-42");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "order not found: order-42");
    }

    #[test]
    fn infrastructure_errors_are_not_not_found() {
        let err = StoreError::Connection(sqlx::Error::PoolTimedOut);
        assert!(!err.is_not_found());
    }

    #[test]
    fn read_classification_separates_decode_from_connection() {
        let decode = classify_read(sqlx::Error::ColumnNotFound("order_total".into()));
        assert!(matches!(decode, StoreError::Decode(_)));

        let conn = classify_read(sqlx::Error::PoolTimedOut);
        assert!(matches!(conn, StoreError::Connection(_)));
    }

    #[test]
    fn write_error_names_the_failed_stage() {
        let err = StoreError::write("order item", sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "failed to insert order item");
    }
}
