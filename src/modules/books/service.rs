//! Query and mutation operations over the book store.

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use validator::{Validate, ValidationErrors};

use super::models::{Book, BookCreate, BookFilter, BookUpdate};
use super::store::BookStore;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("invalid book payload: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("book with id {id} does not exist")]
    NotFound { id: i64 },

    #[error("a book with ISBN {isbn} already exists (id: {existing_id})")]
    DuplicateIsbn { isbn: String, existing_id: i64 },

    #[error("ISBN {isbn} is already used by another book (id: {existing_id})")]
    IsbnInUse { isbn: String, existing_id: i64 },
}

/// Owns the store; each operation holds the lock for its whole
/// read-check-write sequence.
#[derive(Debug)]
pub struct BookService {
    store: RwLock<BookStore>,
}

impl BookService {
    pub fn new(store: BookStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// All books matching `filter`, in insertion order.
    pub async fn list_books(&self, filter: &BookFilter) -> Vec<Book> {
        let store = self.store.read().await;
        store
            .scan()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect()
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, BookError> {
        let store = self.store.read().await;
        match store.get(id) {
            Some(book) => Ok(book.clone()),
            None => {
                tracing::warn!(book_id = id, "book not found");
                Err(BookError::NotFound { id })
            }
        }
    }

    pub async fn create_book(&self, payload: BookCreate) -> Result<Book, BookError> {
        payload.validate()?;

        let mut store = self.store.write().await;

        if let Some(existing) = store.find_by_isbn(&payload.isbn) {
            tracing::warn!(isbn = %payload.isbn, existing_id = existing.id, "duplicate ISBN on create");
            return Err(BookError::DuplicateIsbn {
                isbn: payload.isbn,
                existing_id: existing.id,
            });
        }

        let book = store.append(payload, OffsetDateTime::now_utc()).clone();
        tracing::info!(book_id = book.id, isbn = %book.isbn, "book created");
        Ok(book)
    }

    /// Merge the supplied fields into book `id`. An empty payload is a no-op.
    pub async fn update_book(&self, id: i64, payload: BookUpdate) -> Result<Book, BookError> {
        let mut store = self.store.write().await;

        if store.get(id).is_none() {
            tracing::warn!(book_id = id, "book not found for update");
            return Err(BookError::NotFound { id });
        }

        payload.validate()?;

        if let Some(isbn) = payload.isbn.as_deref() {
            if let Some(existing) = store.find_by_isbn(isbn) {
                if existing.id != id {
                    tracing::warn!(book_id = id, isbn, existing_id = existing.id, "ISBN already in use");
                    return Err(BookError::IsbnInUse {
                        isbn: isbn.to_string(),
                        existing_id: existing.id,
                    });
                }
            }
        }

        let book = store
            .get_mut(id)
            .ok_or(BookError::NotFound { id })?;
        payload.apply_to(book);

        tracing::info!(book_id = id, "book updated");
        Ok(book.clone())
    }
}
