use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::book::{Book, BookFilter, BookPage, BookPatch, PageRequest};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::user::UserSummary;

use super::{CatalogStore, OrderStore, StoreError, StoreResult, UserStore};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Implements the same trait semantics as the Mongo store against hash maps,
// so the whole suite runs without external services. Listings are ordered by
// creation time to keep pagination deterministic.
//
// ============================================================================

#[derive(Default)]
#[allow(dead_code)]
pub struct MemoryStore {
    books: RwLock<HashMap<Uuid, Book>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    users: RwLock<HashMap<Uuid, UserSummary>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, user: UserSummary) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_book(&self, book: Book) -> StoreResult<()> {
        self.books.write().await.insert(book.id, book);
        Ok(())
    }

    async fn update_book(&self, id: Uuid, patch: BookPatch) -> StoreResult<Book> {
        let mut books = self.books.write().await;
        let book = books.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply(book);
        Ok(book.clone())
    }

    async fn delete_book(&self, id: Uuid) -> StoreResult<()> {
        self.books
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn list_books(&self, filter: &BookFilter, page: PageRequest) -> StoreResult<BookPage> {
        let books = self.books.read().await;
        let mut matching: Vec<Book> = books.values().filter(|b| filter.matches(b)).cloned().collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let items: Vec<Book> = matching
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(BookPage::new(items, total, page))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: Order) -> StoreResult<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn orders_by_user(&self, user: Uuid) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut own: Vec<Order> = orders.values().filter(|o| o.user == user).cloned().collect();
        own.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(own)
    }

    async fn all_orders(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.status = status;
        order.updated_at = updated_at;
        Ok(order.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user_summary(&self, id: Uuid) -> StoreResult<Option<UserSummary>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
