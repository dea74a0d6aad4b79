use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Book - Catalog Record
// ============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub price: f64,
    pub rating: f64,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    /// Informational only; never checked or decremented by order placement.
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("author is required")]
    MissingAuthor,

    #[error("price is required")]
    MissingPrice,

    #[error("price cannot be negative")]
    NegativePrice,
}

/// Attributes submitted to create a book. Required fields are optional here
/// so that a missing field surfaces as a ValidationError rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub stock: Option<i64>,
}

impl BookDraft {
    /// Validate the draft and mint a new catalog record with a generated id,
    /// creation timestamp, and field defaults.
    pub fn into_book(self) -> Result<Book, BookValidationError> {
        let title = match self.title {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(BookValidationError::MissingTitle),
        };
        let author = match self.author {
            Some(a) if !a.trim().is_empty() => a,
            _ => return Err(BookValidationError::MissingAuthor),
        };
        let price = self.price.ok_or(BookValidationError::MissingPrice)?;
        if price < 0.0 {
            return Err(BookValidationError::NegativePrice);
        }

        Ok(Book {
            id: Uuid::new_v4(),
            title,
            author,
            genre: self.genre,
            price,
            rating: self.rating.unwrap_or(0.0),
            description: self.description,
            cover_image: self.cover_image,
            stock: self.stock.unwrap_or(0),
            created_at: Utc::now(),
        })
    }
}

/// Partial update; only the fields present are merged into the record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub stock: Option<i64>,
}

impl BookPatch {
    /// A patch may not blank a required field or set a negative price.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(BookValidationError::MissingTitle);
            }
        }
        if let Some(author) = &self.author {
            if author.trim().is_empty() {
                return Err(BookValidationError::MissingAuthor);
            }
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                return Err(BookValidationError::NegativePrice);
            }
        }
        Ok(())
    }

    pub fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(genre) = &self.genre {
            book.genre = Some(genre.clone());
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        if let Some(cover_image) = &self.cover_image {
            book.cover_image = Some(cover_image.clone());
        }
        if let Some(stock) = self.stock {
            book.stock = stock;
        }
    }

}

// ============================================================================
// Catalog Queries
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Exact match.
    pub genre: Option<String>,
    /// Case-insensitive substring.
    pub author: Option<String>,
    /// Inclusive bounds.
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Inclusive minimum.
    pub rating_min: Option<f64>,
    /// Case-insensitive substring against title OR author OR description.
    pub search: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(genre) = &self.genre {
            if book.genre.as_deref() != Some(genre.as_str()) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !contains_ci(&book.author, author) {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if book.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if book.price > max {
                return false;
            }
        }
        if let Some(min) = self.rating_min {
            if book.rating < min {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let description_hit = book
                .description
                .as_deref()
                .map(|d| contains_ci(d, term))
                .unwrap_or(false);
            if !contains_ci(&book.title, term) && !contains_ci(&book.author, term) && !description_hit {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 1-based offset pagination: skip = (page - 1) * limit.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl BookPage {
    pub fn new(items: Vec<Book>, total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit);
        let pages = total.div_ceil(limit) as u32;
        Self {
            items,
            total,
            page: request.page,
            pages,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, author: &str, price: f64) -> BookDraft {
        BookDraft {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            price: Some(price),
            ..BookDraft::default()
        }
    }

    #[test]
    fn test_draft_defaults() {
        let book = draft("Dune", "Frank Herbert", 9.99).into_book().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.price, 9.99);
        assert_eq!(book.rating, 0.0);
        assert_eq!(book.stock, 0);
        assert!(book.genre.is_none());
    }

    #[test]
    fn test_draft_missing_required_fields() {
        let mut missing_title = draft("Dune", "Frank Herbert", 9.99);
        missing_title.title = None;
        assert!(matches!(
            missing_title.into_book(),
            Err(BookValidationError::MissingTitle)
        ));

        let mut blank_author = draft("Dune", "  ", 9.99);
        blank_author.author = Some("  ".to_string());
        assert!(matches!(
            blank_author.into_book(),
            Err(BookValidationError::MissingAuthor)
        ));

        let mut missing_price = draft("Dune", "Frank Herbert", 9.99);
        missing_price.price = None;
        assert!(matches!(
            missing_price.into_book(),
            Err(BookValidationError::MissingPrice)
        ));

        assert!(matches!(
            draft("Dune", "Frank Herbert", -1.0).into_book(),
            Err(BookValidationError::NegativePrice)
        ));
    }

    #[test]
    fn test_patch_merges_given_fields_only() {
        let mut book = draft("Dune", "Frank Herbert", 9.99).into_book().unwrap();
        let patch = BookPatch {
            price: Some(15.0),
            genre: Some("Sci-Fi".to_string()),
            ..BookPatch::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut book);

        assert_eq!(book.price, 15.0);
        assert_eq!(book.genre.as_deref(), Some("Sci-Fi"));
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
    }

    #[test]
    fn test_patch_rejects_invalid_values() {
        let negative = BookPatch {
            price: Some(-0.01),
            ..BookPatch::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(BookValidationError::NegativePrice)
        ));

        let blank = BookPatch {
            title: Some("".to_string()),
            ..BookPatch::default()
        };
        assert!(matches!(
            blank.validate(),
            Err(BookValidationError::MissingTitle)
        ));
    }

    #[test]
    fn test_filter_genre_is_exact() {
        let mut book = draft("Dune", "Frank Herbert", 9.99).into_book().unwrap();
        book.genre = Some("Sci-Fi".to_string());

        let exact = BookFilter {
            genre: Some("Sci-Fi".to_string()),
            ..BookFilter::default()
        };
        assert!(exact.matches(&book));

        let wrong_case = BookFilter {
            genre: Some("sci-fi".to_string()),
            ..BookFilter::default()
        };
        assert!(!wrong_case.matches(&book));
    }

    #[test]
    fn test_filter_author_substring_case_insensitive() {
        let book = draft("Dune", "Frank Herbert", 9.99).into_book().unwrap();
        let filter = BookFilter {
            author: Some("herb".to_string()),
            ..BookFilter::default()
        };
        assert!(filter.matches(&book));
    }

    #[test]
    fn test_filter_price_bounds_inclusive() {
        let book = draft("Dune", "Frank Herbert", 10.0).into_book().unwrap();
        let filter = BookFilter {
            price_min: Some(10.0),
            price_max: Some(10.0),
            ..BookFilter::default()
        };
        assert!(filter.matches(&book));

        let above = BookFilter {
            price_min: Some(10.01),
            ..BookFilter::default()
        };
        assert!(!above.matches(&book));
    }

    #[test]
    fn test_filter_search_spans_title_author_description() {
        let mut book = draft("Dune", "Frank Herbert", 9.99).into_book().unwrap();
        book.description = Some("Spice and sandworms".to_string());

        for term in ["dune", "HERBERT", "sandworm"] {
            let filter = BookFilter {
                search: Some(term.to_string()),
                ..BookFilter::default()
            };
            assert!(filter.matches(&book), "term {term:?} should match");
        }

        let miss = BookFilter {
            search: Some("dragons".to_string()),
            ..BookFilter::default()
        };
        assert!(!miss.matches(&book));
    }

    #[test]
    fn test_page_request_normalizes() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 1);
        assert_eq!(page.skip(), 0);

        let second = PageRequest::new(2, 12);
        assert_eq!(second.skip(), 12);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let page = BookPage::new(vec![], 3, PageRequest::new(2, 1));
        assert_eq!(page.pages, 3);

        let page = BookPage::new(vec![], 25, PageRequest::new(1, 12));
        assert_eq!(page.pages, 3);

        let page = BookPage::new(vec![], 0, PageRequest::default());
        assert_eq!(page.pages, 0);
    }
}
