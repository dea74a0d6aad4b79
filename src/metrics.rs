use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::http::AppState;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Counters for:
// - Catalog mutations (create/update/delete)
// - Orders placed and rejected (by reason)
// - Order status transitions (by target status)
//
// All metrics are registered with Prometheus and scraped via /metrics.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Catalog Metrics
    pub books_created: IntCounter,
    pub books_updated: IntCounter,
    pub books_deleted: IntCounter,

    // Order Metrics
    pub orders_placed: IntCounter,
    pub orders_rejected: IntCounterVec,
    pub order_status_updates: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let books_created = IntCounter::new("books_created_total", "Total books created")?;
        registry.register(Box::new(books_created.clone()))?;

        let books_updated = IntCounter::new("books_updated_total", "Total books updated")?;
        registry.register(Box::new(books_updated.clone()))?;

        let books_deleted = IntCounter::new("books_deleted_total", "Total books deleted")?;
        registry.register(Box::new(books_deleted.clone()))?;

        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Order submissions rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let order_status_updates = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Order status transitions applied"),
            &["status"],
        )?;
        registry.register(Box::new(order_status_updates.clone()))?;

        Ok(Self {
            registry,
            books_created,
            books_updated,
            books_deleted,
            orders_placed,
            orders_rejected,
            order_status_updates,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_rejected_order(&self, reason: &str) {
        self.orders_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_status_update(&self, status: &str) {
        self.order_status_updates.with_label_values(&[status]).inc();
    }
}

pub async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {:#}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bookstore-api"
    }))
}
