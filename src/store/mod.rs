use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::book::{Book, BookFilter, BookPage, BookPatch, PageRequest};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::user::UserSummary;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

// ============================================================================
// Store - Persistence Seam
// ============================================================================
//
// All persistent state lives behind these traits: the Mongo implementation
// backs the running service, the in-memory one backs the test suite. The
// store serializes individual document writes but gives no cross-document
// guarantees; the order workflow's resolve-then-persist sequence is not
// atomic with respect to concurrent catalog mutation.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_book(&self, book: Book) -> StoreResult<()>;

    /// Merge the patch into an existing record and return the result.
    async fn update_book(&self, id: Uuid, patch: BookPatch) -> StoreResult<Book>;

    /// Immediate and unconditional; no referential check against orders.
    async fn delete_book(&self, id: Uuid) -> StoreResult<()>;

    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>>;

    async fn list_books(&self, filter: &BookFilter, page: PageRequest) -> StoreResult<BookPage>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: Order) -> StoreResult<()>;

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;

    async fn orders_by_user(&self, user: Uuid) -> StoreResult<Vec<Order>>;

    async fn all_orders(&self) -> StoreResult<Vec<Order>>;

    /// Set status and the update timestamp; the only permitted order
    /// mutation. Returns the updated order.
    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Order>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_summary(&self, id: Uuid) -> StoreResult<Option<UserSummary>>;
}
