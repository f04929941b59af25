//! Database module for brand persistence
//!
//! `BrandStore` is the persistence seam used by the HTTP handlers. The MongoDB
//! implementation is what the server runs against; the memory implementation
//! has the same semantics and backs the tests.

mod brands;
mod memory;
mod mongo;

pub use brands::*;
pub use memory::MemoryBrandStore;
pub use mongo::MongoBrandStore;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A brand with this name already exists (unique index on `name`)
    #[error("Brand '{0}' already exists")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Brand persistence operations.
///
/// Names are exact, case-sensitive lookup keys. Every mutation is a single
/// document write, so a failed call leaves the previous state untouched.
#[async_trait]
pub trait BrandStore: Send + Sync {
    /// Names of all brands, in no particular order
    async fn list_names(&self) -> Result<Vec<String>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Brand>>;

    /// Insert a new brand; `Conflict` if the name is taken
    async fn create(&self, name: &str, details: &str) -> Result<Brand>;

    /// Replace details of an existing brand; `None` if it does not exist
    async fn update_details(&self, name: &str, details: &str) -> Result<Option<Brand>>;

    /// Replace details, creating the brand if needed
    async fn upsert_details(&self, name: &str, details: &str) -> Result<Upserted>;

    /// Returns false when nothing was deleted
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Check the backing database is reachable
    async fn ping(&self) -> Result<()>;
}

/// Run a store call under a deadline.
///
/// The call future is dropped when the deadline passes.
pub async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// Current time at the precision BSON stores (milliseconds)
pub(crate) fn now_millis() -> DateTime<Utc> {
    bson::DateTime::from_chrono(Utc::now()).to_chrono()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        };
        let result = with_deadline(Duration::from_millis(20), slow).await;
        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
