use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::book::Book;
use super::user::UserSummary;

// ============================================================================
// Order - Cart Snapshot With Status Lifecycle
// ============================================================================

/// A single catalog reference inside a submitted cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartItem {
    pub book: Uuid,
    pub quantity: i64,
}

/// A cart item with the unit price captured at placement time. Later catalog
/// price changes never touch this value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineItem {
    pub book: Uuid,
    pub quantity: i64,
    pub price: f64,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    #[allow(dead_code)]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The documented lifecycle. Transitions are logged against it but NOT
    /// enforced: a privileged actor may set any status at any time.
    pub fn is_standard_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Owning user; immutable after creation.
    pub user: Uuid,
    pub items: Vec<LineItem>,
    /// Computed once at creation as the sum of line-item subtotals.
    /// There is no recomputation path.
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Resolved Read Views
// ============================================================================

/// A line item joined against the current catalog record. The book is absent
/// when it was deleted after the order was placed; the captured price and
/// quantity are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct LineItemView {
    pub book: Option<Book>,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub items: Vec<LineItemView>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
