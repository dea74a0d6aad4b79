use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::domain::book::{
    BookDraft, BookFilter, BookPatch, PageRequest, DEFAULT_PAGE_SIZE,
};
use crate::errors::ApiError;
use crate::store::StoreError;

use super::AppState;

// ============================================================================
// Catalog Endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksQuery {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub rating_min: Option<f64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_books(
    state: web::Data<AppState>,
    query: web::Query<ListBooksQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filter = BookFilter {
        genre: query.genre,
        author: query.author,
        price_min: query.price_min,
        price_max: query.price_max,
        rating_min: query.rating_min,
        search: query.search,
    };
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let result = state.catalog.list_books(&filter, page).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn get_book(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let book = state
        .catalog
        .get_book(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;
    Ok(HttpResponse::Ok().json(book))
}

pub async fn create_book(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<BookDraft>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let book = body.into_inner().into_book()?;
    state.catalog.insert_book(book.clone()).await?;
    state.metrics.books_created.inc();
    tracing::info!(book_id = %book.id, title = %book.title, "book created");

    Ok(HttpResponse::Created().json(book))
}

pub async fn update_book(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<BookPatch>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let patch = body.into_inner();
    patch.validate()?;

    let book = state
        .catalog
        .update_book(path.into_inner(), patch)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::NotFound("Book not found".to_string()),
            other => other.into(),
        })?;
    state.metrics.books_updated.inc();

    Ok(HttpResponse::Ok().json(book))
}

pub async fn delete_book(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let id = path.into_inner();
    state
        .catalog
        .delete_book(id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::NotFound("Book not found".to_string()),
            other => other.into(),
        })?;
    state.metrics.books_deleted.inc();
    tracing::info!(book_id = %id, "book deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Book deleted" })))
}
