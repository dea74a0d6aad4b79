use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use uuid::Uuid;

use crate::domain::book::{Book, BookFilter, BookPage, BookPatch, PageRequest};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::user::UserSummary;

use super::{CatalogStore, OrderStore, StoreError, StoreResult, UserStore};

// ============================================================================
// MongoDB Store
// ============================================================================
//
// Documents serialize through serde with camelCase keys and string ids, so
// the collection layout matches the wire format one-to-one. The catalog
// filter translates to the same query operators the listing has always used:
// $regex for substring fields, $gte/$lte for ranges, $or for free-text
// search.
//
// ============================================================================

pub struct MongoStore {
    books: Collection<Book>,
    orders: Collection<Order>,
    users: Collection<UserSummary>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            books: db.collection("books"),
            orders: db.collection("orders"),
            users: db.collection("users"),
        }
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.into())
}

/// Build the listing query. The raw user strings go straight into $regex,
/// exactly as the catalog has always queried.
fn filter_query(filter: &BookFilter) -> Document {
    let mut query = Document::new();

    if let Some(genre) = &filter.genre {
        query.insert("genre", genre.as_str());
    }
    if let Some(author) = &filter.author {
        query.insert("author", doc! { "$regex": author.as_str(), "$options": "i" });
    }
    if let Some(min) = filter.rating_min {
        query.insert("rating", doc! { "$gte": min });
    }

    let mut price = Document::new();
    if let Some(min) = filter.price_min {
        price.insert("$gte", min);
    }
    if let Some(max) = filter.price_max {
        price.insert("$lte", max);
    }
    if !price.is_empty() {
        query.insert("price", price);
    }

    if let Some(term) = &filter.search {
        let pattern = doc! { "$regex": term.as_str(), "$options": "i" };
        query.insert(
            "$or",
            vec![
                doc! { "title": pattern.clone() },
                doc! { "author": pattern.clone() },
                doc! { "description": pattern },
            ],
        );
    }

    query
}

fn patch_set(patch: &BookPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(author) = &patch.author {
        set.insert("author", author.as_str());
    }
    if let Some(genre) = &patch.genre {
        set.insert("genre", genre.as_str());
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(rating) = patch.rating {
        set.insert("rating", rating);
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    if let Some(cover_image) = &patch.cover_image {
        set.insert("coverImage", cover_image.as_str());
    }
    if let Some(stock) = patch.stock {
        set.insert("stock", stock);
    }
    set
}

fn id_query(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

#[async_trait]
impl CatalogStore for MongoStore {
    async fn insert_book(&self, book: Book) -> StoreResult<()> {
        self.books.insert_one(&book).await.map_err(backend)?;
        Ok(())
    }

    async fn update_book(&self, id: Uuid, patch: BookPatch) -> StoreResult<Book> {
        let set = patch_set(&patch);
        if set.is_empty() {
            // Nothing to merge; an empty $set is rejected by the server.
            return self
                .books
                .find_one(id_query(id))
                .await
                .map_err(backend)?
                .ok_or(StoreError::NotFound);
        }

        self.books
            .find_one_and_update(id_query(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)
    }

    async fn delete_book(&self, id: Uuid) -> StoreResult<()> {
        let result = self.books.delete_one(id_query(id)).await.map_err(backend)?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_book(&self, id: Uuid) -> StoreResult<Option<Book>> {
        self.books.find_one(id_query(id)).await.map_err(backend)
    }

    async fn list_books(&self, filter: &BookFilter, page: PageRequest) -> StoreResult<BookPage> {
        let query = filter_query(filter);

        let cursor = self
            .books
            .find(query.clone())
            .skip(page.skip())
            .limit(i64::from(page.limit))
            .await
            .map_err(backend)?;
        let items: Vec<Book> = cursor.try_collect().await.map_err(backend)?;

        let total = self
            .books
            .count_documents(query)
            .await
            .map_err(backend)?;

        Ok(BookPage::new(items, total, page))
    }
}

#[async_trait]
impl OrderStore for MongoStore {
    async fn insert_order(&self, order: Order) -> StoreResult<()> {
        self.orders.insert_one(&order).await.map_err(backend)?;
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        self.orders.find_one(id_query(id)).await.map_err(backend)
    }

    async fn orders_by_user(&self, user: Uuid) -> StoreResult<Vec<Order>> {
        let cursor = self
            .orders
            .find(doc! { "user": user.to_string() })
            .await
            .map_err(backend)?;
        cursor.try_collect().await.map_err(backend)
    }

    async fn all_orders(&self) -> StoreResult<Vec<Order>> {
        let cursor = self.orders.find(doc! {}).await.map_err(backend)?;
        cursor.try_collect().await.map_err(backend)
    }

    async fn set_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let update = doc! { "$set": {
            "status": status.as_str(),
            "updatedAt": updated_at.to_rfc3339(),
        }};

        self.orders
            .find_one_and_update(id_query(id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn user_summary(&self, id: Uuid) -> StoreResult<Option<UserSummary>> {
        self.users.find_one(id_query(id)).await.map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_translation() {
        let filter = BookFilter {
            genre: Some("Fantasy".to_string()),
            author: Some("tolkien".to_string()),
            price_min: Some(5.0),
            price_max: Some(20.0),
            rating_min: Some(4.0),
            search: None,
        };

        let query = filter_query(&filter);
        assert_eq!(query.get_str("genre").unwrap(), "Fantasy");
        assert_eq!(
            query.get_document("author").unwrap(),
            &doc! { "$regex": "tolkien", "$options": "i" }
        );
        assert_eq!(
            query.get_document("price").unwrap(),
            &doc! { "$gte": 5.0, "$lte": 20.0 }
        );
        assert_eq!(
            query.get_document("rating").unwrap(),
            &doc! { "$gte": 4.0 }
        );
    }

    #[test]
    fn test_search_becomes_or_clause() {
        let filter = BookFilter {
            search: Some("dune".to_string()),
            ..BookFilter::default()
        };

        let query = filter_query(&filter);
        let clauses = query.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);
    }

    #[test]
    fn test_empty_filter_is_empty_query() {
        assert!(filter_query(&BookFilter::default()).is_empty());
    }

    #[test]
    fn test_patch_set_uses_wire_keys() {
        let patch = BookPatch {
            price: Some(12.5),
            cover_image: Some("covers/dune.jpg".to_string()),
            ..BookPatch::default()
        };

        let set = patch_set(&patch);
        assert_eq!(set.get_f64("price").unwrap(), 12.5);
        assert_eq!(set.get_str("coverImage").unwrap(), "covers/dune.jpg");
        assert!(!set.contains_key("title"));
    }
}
