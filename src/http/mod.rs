use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use crate::auth::IdentityResolver;
use crate::metrics::{self, Metrics};
use crate::store::CatalogStore;
use crate::workflow::OrderWorkflow;

pub mod books;
pub mod orders;

// ============================================================================
// HTTP Surface
// ============================================================================

pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub workflow: OrderWorkflow,
    pub identity: Arc<dyn IdentityResolver>,
    pub metrics: Arc<Metrics>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(metrics::health_handler))
        .route("/metrics", web::get().to(metrics::metrics_handler))
        .service(
            web::scope("/books")
                .route("", web::get().to(books::list_books))
                .route("", web::post().to(books::create_book))
                .route("/{id}", web::get().to(books::get_book))
                .route("/{id}", web::put().to(books::update_book))
                .route("/{id}", web::delete().to(books::delete_book)),
        )
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::place_order))
                .route("", web::get().to(orders::all_orders))
                .route("/my", web::get().to(orders::my_orders))
                .route("/{id}/status", web::put().to(orders::update_status)),
        );
}

async fn index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "message": "BookStore API"
    }))
}

// ============================================================================
// Endpoint Tests
// ============================================================================
