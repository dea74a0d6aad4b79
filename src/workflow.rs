use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::order::{CartItem, LineItem, LineItemView, Order, OrderStatus, OrderView};
use crate::errors::ApiError;
use crate::metrics::Metrics;
use crate::store::{CatalogStore, OrderStore, StoreError, UserStore};

// ============================================================================
// Order Workflow
// ============================================================================
//
// Orchestrates: cart → catalog resolution → price snapshot → persisted order.
//
// The whole submission is all-or-nothing at the request boundary: any
// unresolvable item rejects the cart before anything is written. The
// resolve-then-persist sequence carries no lock or transaction, and stock is
// never checked or decremented.
//
// ============================================================================

#[derive(Clone)]
pub struct OrderWorkflow {
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    metrics: Arc<Metrics>,
}

impl OrderWorkflow {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            catalog,
            orders,
            users,
            metrics,
        }
    }

    /// Validate the cart, snapshot unit prices from the catalog, and persist
    /// a new pending order for the user.
    pub async fn place_order(&self, user_id: Uuid, cart: Vec<CartItem>) -> Result<Order, ApiError> {
        if cart.is_empty() {
            self.metrics.record_rejected_order("empty_cart");
            return Err(ApiError::InvalidRequest("No items".to_string()));
        }

        let mut items = Vec::with_capacity(cart.len());
        let mut total = 0.0;

        for entry in &cart {
            if entry.quantity < 1 {
                self.metrics.record_rejected_order("invalid_quantity");
                return Err(ApiError::InvalidRequest(format!(
                    "Invalid quantity {} for book {}",
                    entry.quantity, entry.book
                )));
            }

            let book = self.catalog.get_book(entry.book).await?.ok_or_else(|| {
                self.metrics.record_rejected_order("unknown_book");
                ApiError::InvalidRequest(format!("Invalid book in items: {}", entry.book))
            })?;

            let line = LineItem {
                book: book.id,
                quantity: entry.quantity,
                price: book.price,
            };
            total += line.subtotal();
            items.push(line);
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user: user_id,
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert_order(order.clone()).await?;
        self.metrics.orders_placed.inc();
        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = order.total,
            items = order.items.len(),
            "order placed"
        );

        Ok(order)
    }

    /// The user's own orders, line items joined against the current catalog.
    pub async fn list_own_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, ApiError> {
        let orders = self.orders.orders_by_user(user_id).await?;
        self.resolve_orders(orders, false).await
    }

    /// Every order in the system with line items and owning users resolved.
    /// Privilege is checked at the HTTP boundary.
    pub async fn list_all_orders(&self) -> Result<Vec<OrderView>, ApiError> {
        let orders = self.orders.all_orders().await?;
        self.resolve_orders(orders, true).await
    }

    /// Set the status unconditionally. The documented lifecycle is logged
    /// when stepped outside of, but not enforced.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let current = self
            .orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

        if !current.status.is_standard_transition(status) {
            tracing::warn!(
                order_id = %order_id,
                from = %current.status,
                to = %status,
                "status set outside the documented lifecycle"
            );
        }

        let updated = self
            .orders
            .set_order_status(order_id, status, Utc::now())
            .await
            .map_err(|err| match err {
                StoreError::NotFound => ApiError::NotFound("Order not found".to_string()),
                other => other.into(),
            })?;

        self.metrics.record_status_update(updated.status.as_str());
        tracing::info!(order_id = %order_id, status = %updated.status, "order status updated");

        Ok(updated)
    }

    async fn resolve_orders(
        &self,
        orders: Vec<Order>,
        with_user: bool,
    ) -> Result<Vec<OrderView>, ApiError> {
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.resolve_order(order, with_user).await?);
        }
        Ok(views)
    }

    async fn resolve_order(&self, order: Order, with_user: bool) -> Result<OrderView, ApiError> {
        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            // A book deleted since placement resolves to nothing; the
            // captured price and quantity stand.
            let book = self.catalog.get_book(line.book).await?;
            items.push(LineItemView {
                book,
                quantity: line.quantity,
                price: line.price,
            });
        }

        let user = if with_user {
            self.users.user_summary(order.user).await?
        } else {
            None
        };

        Ok(OrderView {
            id: order.id,
            user,
            items,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{Book, BookDraft, BookPatch};
    use crate::domain::user::{Role, UserSummary};
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        workflow: OrderWorkflow,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let workflow = OrderWorkflow::new(
            store.clone(),
            store.clone(),
            store.clone(),
            metrics,
        );
        Fixture { store, workflow }
    }

    async fn seed_book(store: &MemoryStore, title: &str, author: &str, price: f64) -> Book {
        let book = BookDraft {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            price: Some(price),
            ..BookDraft::default()
        }
        .into_book()
        .unwrap();
        store.insert_book(book.clone()).await.unwrap();
        book
    }

    #[tokio::test]
    async fn test_place_order_snapshots_prices() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;
        let user = Uuid::new_v4();

        let order = fx
            .workflow
            .place_order(user, vec![CartItem { book: book.id, quantity: 2 }])
            .await
            .unwrap();

        assert_eq!(order.total, 20.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user, user);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].price, 10.0);

        // A later catalog price change must not touch the stored order.
        let patch = BookPatch {
            price: Some(15.0),
            ..BookPatch::default()
        };
        fx.store.update_book(book.id, patch).await.unwrap();

        let refetched = fx.store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(refetched.total, 20.0);
        assert_eq!(refetched.items[0].price, 10.0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let fx = fixture();
        let result = fx.workflow.place_order(Uuid::new_v4(), vec![]).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_book_rejects_whole_cart() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;

        let result = fx
            .workflow
            .place_order(
                Uuid::new_v4(),
                vec![
                    CartItem { book: book.id, quantity: 1 },
                    CartItem { book: Uuid::new_v4(), quantity: 1 },
                ],
            )
            .await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        // No partial order was persisted.
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;

        let result = fx
            .workflow
            .place_order(Uuid::new_v4(), vec![CartItem { book: book.id, quantity: 0 }])
            .await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_total_sums_multiple_lines() {
        let fx = fixture();
        let a = seed_book(&fx.store, "A", "X", 10.0).await;
        let b = seed_book(&fx.store, "B", "Y", 2.5).await;

        let order = fx
            .workflow
            .place_order(
                Uuid::new_v4(),
                vec![
                    CartItem { book: a.id, quantity: 2 },
                    CartItem { book: b.id, quantity: 4 },
                ],
            )
            .await
            .unwrap();

        assert_eq!(order.total, 30.0);
    }

    #[tokio::test]
    async fn test_list_own_and_all_orders() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;
        let user1 = Uuid::new_v4();
        let user2 = Uuid::new_v4();

        fx.store
            .seed_user(UserSummary {
                id: user1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: Role::User,
            })
            .await;

        let own = fx
            .workflow
            .place_order(user1, vec![CartItem { book: book.id, quantity: 2 }])
            .await
            .unwrap();
        fx.workflow
            .place_order(user2, vec![CartItem { book: book.id, quantity: 1 }])
            .await
            .unwrap();

        let mine = fx.workflow.list_own_orders(user1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, own.id);
        assert_eq!(mine[0].total, 20.0);
        assert!(mine[0].user.is_none());
        assert_eq!(mine[0].items[0].book.as_ref().unwrap().title, "A");

        let all = fx.workflow.list_all_orders().await.unwrap();
        assert_eq!(all.len(), 2);
        let for_user1 = all.iter().find(|o| o.id == own.id).unwrap();
        assert_eq!(for_user1.user.as_ref().unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn test_deleted_book_resolves_to_absent_reference() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;
        let user = Uuid::new_v4();

        fx.workflow
            .place_order(user, vec![CartItem { book: book.id, quantity: 2 }])
            .await
            .unwrap();
        fx.store.delete_book(book.id).await.unwrap();

        let mine = fx.workflow.list_own_orders(user).await.unwrap();
        assert!(mine[0].items[0].book.is_none());
        // Captured snapshot is unaffected by the deletion.
        assert_eq!(mine[0].items[0].price, 10.0);
        assert_eq!(mine[0].items[0].quantity, 2);
        assert_eq!(mine[0].total, 20.0);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order_is_not_found() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;
        let existing = fx
            .workflow
            .place_order(Uuid::new_v4(), vec![CartItem { book: book.id, quantity: 1 }])
            .await
            .unwrap();

        let result = fx
            .workflow
            .update_status(Uuid::new_v4(), OrderStatus::Shipped)
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        // Existing orders are untouched.
        let unchanged = fx.store.get_order(existing.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
        assert_eq!(unchanged.updated_at, existing.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_is_unconditional() {
        let fx = fixture();
        let book = seed_book(&fx.store, "A", "B", 10.0).await;
        let order = fx
            .workflow
            .place_order(Uuid::new_v4(), vec![CartItem { book: book.id, quantity: 1 }])
            .await
            .unwrap();

        // Straight from pending to delivered: outside the documented
        // lifecycle, still applied.
        let updated = fx
            .workflow
            .update_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert!(updated.updated_at >= order.updated_at);

        // And back again.
        let reverted = fx
            .workflow
            .update_status(order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reverted.status, OrderStatus::Pending);
    }
}
