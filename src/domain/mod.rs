// ============================================================================
// Domain - Bookstore Catalog & Orders
// ============================================================================
//
// This module contains the persisted document shapes and their value-level
// rules:
// - Book: catalog records, drafts, patches, filters, paging
// - Order: line items, status lifecycle, resolved read views
// - User: roles and the read-only user summary projection
//
// Storage and transport live elsewhere; nothing here touches the database.
//
// ============================================================================

pub mod book;
pub mod order;
pub mod user;
