//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bib_http::{
    error::{AppError, AppResult},
    extract::{JsonBody, PathParams, QueryParams},
};
use serde_json::json;
use utoipa::OpenApi;

use super::models::{Book, BookCreate, BookFilter, BookUpdate};
use super::service::{BookError, BookService};

#[derive(OpenApi)]
#[openapi(
    paths(list_books, get_book, create_book, update_book),
    components(schemas(Book, BookCreate, BookUpdate)),
    tags((name = "Books", description = "Library catalogue"))
)]
pub struct BooksApi;

/// Routes for `/books/`. The bare `/books` path answers the same way.
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book).put(update_book))
        .with_state(service)
}

impl From<BookError> for AppError {
    fn from(error: BookError) -> Self {
        let message = error.to_string();
        match error {
            BookError::Invalid(errors) => AppError::from(errors),
            BookError::NotFound { .. } => AppError::not_found(message),
            BookError::DuplicateIsbn { isbn, existing_id }
            | BookError::IsbnInUse { isbn, existing_id } => AppError::conflict(
                vec![json!({
                    "field": "isbn",
                    "value": isbn,
                    "conflicting_id": existing_id,
                })],
                message,
            ),
        }
    }
}

/// List books, optionally filtered by availability and author
#[utoipa::path(
    get,
    path = "/books/",
    tag = "Books",
    params(BookFilter),
    responses(
        (status = 200, description = "Books matching every given filter", body = [Book]),
        (status = 422, description = "Unparseable query parameters")
    )
)]
pub async fn list_books(
    State(service): State<Arc<BookService>>,
    QueryParams(filter): QueryParams<BookFilter>,
) -> Json<Vec<Book>> {
    tracing::info!(
        available = ?filter.available,
        author = ?filter.author,
        "listing books"
    );

    let books = service.list_books(&filter).await;

    tracing::info!(count = books.len(), "returning books");
    Json(books)
}

/// Fetch a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "No book has this id")
    )
)]
pub async fn get_book(
    State(service): State<Arc<BookService>>,
    PathParams(id): PathParams<i64>,
) -> AppResult<Json<Book>> {
    let book = service.get_book(id).await?;
    tracing::debug!(book_id = id, title = %book.title, "book found");
    Ok(Json(book))
}

/// Add a book to the catalogue
#[utoipa::path(
    post,
    path = "/books/",
    tag = "Books",
    request_body = BookCreate,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "ISBN already used by another book"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_book(
    State(service): State<Arc<BookService>>,
    JsonBody(payload): JsonBody<BookCreate>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = service.create_book(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update the supplied fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 400, description = "ISBN already used by another book"),
        (status = 404, description = "No book has this id"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn update_book(
    State(service): State<Arc<BookService>>,
    PathParams(id): PathParams<i64>,
    JsonBody(payload): JsonBody<BookUpdate>,
) -> AppResult<Json<Book>> {
    let book = service.update_book(id, payload).await?;
    Ok(Json(book))
}
