use std::collections::HashMap;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::Role;
use crate::errors::ApiError;
use crate::http::AppState;

// ============================================================================
// Identity - Per-Request Credentials
// ============================================================================
//
// Token issuance and validation belong to the external auth service; this
// module only resolves an opaque bearer token to {user_id, role} through the
// IdentityResolver seam. Credentials travel with each request as an
// extractor argument; there is no process-wide auth state.
//
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, ApiError>;
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Identity, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| ApiError::server(anyhow::anyhow!("app state missing")))?;
            let token = header
                .as_deref()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
            state.identity.resolve(token).await
        })
    }
}

// ============================================================================
// Resolvers
// ============================================================================

/// A session row written by the auth collaborator; read-only here.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    token: String,
    user_id: Uuid,
    role: Role,
}

/// Resolves bearer tokens against the shared `sessions` collection.
pub struct MongoIdentityResolver {
    sessions: Collection<SessionRecord>,
}

impl MongoIdentityResolver {
    pub fn new(db: &Database) -> Self {
        Self {
            sessions: db.collection("sessions"),
        }
    }
}

#[async_trait]
impl IdentityResolver for MongoIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, ApiError> {
        let session = self
            .sessions
            .find_one(doc! { "token": token })
            .await
            .map_err(ApiError::server)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        Ok(Identity {
            user_id: session.user_id,
            role: session.role,
        })
    }
}

/// Fixed token table; used by the test suite in place of a session store.
#[derive(Default)]
#[allow(dead_code)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, Identity>,
}

#[allow(dead_code)]
impl StaticTokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, identity: Identity) -> Self {
        self.tokens.insert(token.to_string(), identity);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, ApiError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_resolver_round_trip() {
        let admin = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let resolver = StaticTokenResolver::new().with_token("admin-token", admin);

        let resolved = resolver.resolve("admin-token").await.unwrap();
        assert_eq!(resolved.user_id, admin.user_id);
        assert_eq!(resolved.role, Role::Admin);

        let unknown = resolver.resolve("nope").await;
        assert!(matches!(unknown, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_require_admin() {
        let user = Identity {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(matches!(user.require_admin(), Err(ApiError::Forbidden)));

        let admin = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(admin.require_admin().is_ok());
    }
}
