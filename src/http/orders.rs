use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::domain::order::{CartItem, OrderStatus};
use crate::errors::ApiError;

use super::AppState;

// ============================================================================
// Order Endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

pub async fn place_order(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = state
        .workflow
        .place_order(identity.user_id, body.into_inner().items)
        .await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn my_orders(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let orders = state.workflow.list_own_orders(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn all_orders(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let orders = state.workflow.list_all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn update_status(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let order = state
        .workflow
        .update_status(path.into_inner(), body.into_inner().status)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}
