use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bib_kernel::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let settings = Settings::default();
    let registry = bib_app::build_registry(&settings);
    bib_http::build_router(&registry, &settings)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn book_count(router: &Router) -> usize {
    let (_, books) = send(router, Method::GET, "/books/", None).await;
    books.as_array().unwrap().len()
}

fn new_book(isbn: &str) -> Value {
    json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": isbn,
        "published_year": 1965
    })
}

#[tokio::test]
async fn lists_seeded_books() {
    let router = app();
    let (status, books) = send(&router, Method::GET, "/books/", None).await;

    assert_eq!(status, StatusCode::OK);
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 4);

    let first = &books[0];
    for field in ["id", "title", "author", "isbn", "published_year", "available", "created_at"] {
        assert!(first.get(field).is_some(), "missing {field}");
    }
    assert_eq!(first["created_at"], "2024-01-01T10:00:00Z");
}

#[tokio::test]
async fn filters_by_author() {
    let router = app();
    let (status, books) = send(&router, Method::GET, "/books/?author=J.K.%20Rowling", None).await;

    assert_eq!(status, StatusCode::OK);
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"], 3);
    assert_eq!(books[0]["author"], "J.K. Rowling");
    assert_eq!(books[0]["available"], false);
}

#[tokio::test]
async fn author_filter_ignores_case() {
    let router = app();
    let (_, books) = send(&router, Method::GET, "/books/?author=rowling", None).await;
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn availability_filters_partition_the_catalogue() {
    let router = app();
    let (_, available) = send(&router, Method::GET, "/books/?available=true", None).await;
    let (_, unavailable) = send(&router, Method::GET, "/books/?available=false", None).await;

    let available = available.as_array().unwrap();
    let unavailable = unavailable.as_array().unwrap();
    assert!(available.iter().all(|book| book["available"] == true));
    assert!(unavailable.iter().all(|book| book["available"] == false));
    assert_eq!(available.len() + unavailable.len(), 4);

    let (_, combined) = send(
        &router,
        Method::GET,
        "/books/?available=true&author=rowling",
        None,
    )
    .await;
    assert!(combined.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_filter_value_is_unprocessable() {
    let router = app();
    let (status, body) = send(&router, Method::GET, "/books/?available=sometimes", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn availability_filter_accepts_loose_spellings() {
    let router = app();
    let (_, strict) = send(&router, Method::GET, "/books/?available=true", None).await;

    for raw in ["True", "1", "yes", "on"] {
        let (status, books) = send(&router, Method::GET, &format!("/books/?available={raw}"), None).await;
        assert_eq!(status, StatusCode::OK, "{raw}");
        assert_eq!(books, strict, "{raw}");
    }

    let (status, books) = send(&router, Method::GET, "/books/?available=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(books.as_array().unwrap().iter().all(|book| book["available"] == false));
}

#[tokio::test]
async fn gets_book_by_id() {
    let router = app();
    let (status, book) = send(&router, Method::GET, "/books/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["id"], 1);
    assert_eq!(book["title"], "1984");
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let router = app();
    let (status, body) = send(&router, Method::GET, "/books/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("999"));
    assert_eq!(book_count(&router).await, 4);
}

#[tokio::test]
async fn non_numeric_id_is_unprocessable() {
    let router = app();
    let (status, _) = send(&router, Method::GET, "/books/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn creates_book() {
    let router = app();
    let (status, book) = send(&router, Method::POST, "/books/", Some(new_book("978-0441013593"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], 5);
    assert_eq!(book["available"], true);
    assert!(book["created_at"].is_string());

    let (status, fetched) = send(&router, Method::GET, "/books/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, book);

    let (_, second) = send(&router, Method::POST, "/books", Some(new_book("978-0441013594"))).await;
    assert_eq!(second["id"], 6);
}

#[tokio::test]
async fn create_ignores_client_supplied_availability() {
    let router = app();
    let mut payload = new_book("978-0441013593");
    payload["available"] = json!(false);
    payload["id"] = json!(42);

    let (status, book) = send(&router, Method::POST, "/books/", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["id"], 5);
    assert_eq!(book["available"], true);
}

#[tokio::test]
async fn duplicate_isbn_is_rejected() {
    let router = app();
    let (status, body) = send(&router, Method::POST, "/books/", Some(new_book("978-0451524935"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["details"][0]["conflicting_id"], 1);
    assert!(body["error"]["message"].as_str().unwrap().contains("id: 1"));
    assert_eq!(book_count(&router).await, 4);
}

#[tokio::test]
async fn invalid_create_payloads_are_unprocessable() {
    let router = app();
    let cases = [
        json!({ "title": "", "author": "A", "isbn": "1", "published_year": 2000 }),
        json!({ "title": "T", "author": "A", "isbn": "ISBN 1", "published_year": 2000 }),
        json!({ "title": "T", "author": "A", "isbn": "1", "published_year": 999 }),
        json!({ "title": "T", "author": "A", "isbn": "1", "published_year": 9999 }),
        json!({ "title": "T", "author": "A", "isbn": "1" }),
        json!({ "title": "T", "author": "A", "isbn": "1", "published_year": "19x9" }),
        json!({ "title": "T", "author": "A", "isbn": "1", "published_year": "999" }),
    ];

    for payload in cases {
        let (status, body) = send(&router, Method::POST, "/books/", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
        assert_eq!(body["error"]["code"], "validation_error");
    }
    assert_eq!(book_count(&router).await, 4);
}

#[tokio::test]
async fn numeric_string_year_is_accepted() {
    let router = app();
    let payload = json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "978-0441013593",
        "published_year": "1965"
    });
    let (status, book) = send(&router, Method::POST, "/books/", Some(payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["published_year"], 1965);

    let (status, book) = send(&router, Method::PUT, "/books/5", Some(json!({ "published_year": "1966" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["published_year"], 1966);
}

#[tokio::test]
async fn validation_details_name_the_field() {
    let router = app();
    let payload = json!({ "title": "T", "author": "A", "isbn": "12a", "published_year": 2000 });
    let (_, body) = send(&router, Method::POST, "/books/", Some(payload)).await;

    assert_eq!(body["error"]["details"][0]["field"], "isbn");
    assert_eq!(body["error"]["details"][0]["code"], "isbn_format");
}

#[tokio::test]
async fn updates_availability_only() {
    let router = app();
    let (_, before) = send(&router, Method::GET, "/books/2", None).await;

    let (status, book) = send(&router, Method::PUT, "/books/2", Some(json!({ "available": false }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["available"], false);
    assert_eq!(book["title"], before["title"]);
    assert_eq!(book["created_at"], before["created_at"]);
}

#[tokio::test]
async fn empty_update_changes_nothing() {
    let router = app();
    let (_, before) = send(&router, Method::GET, "/books/4", None).await;

    let (status, after) = send(&router, Method::PUT, "/books/4", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(after, before);
}

#[tokio::test]
async fn update_of_missing_book_is_not_found() {
    let router = app();
    let (status, _) = send(&router, Method::PUT, "/books/999", Some(json!({ "title": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_isbn_used_elsewhere() {
    let router = app();
    let (status, body) = send(
        &router,
        Method::PUT,
        "/books/2",
        Some(json!({ "isbn": "978-0451524935", "title": "Changed" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["conflicting_id"], 1);

    let (_, book) = send(&router, Method::GET, "/books/2", None).await;
    assert_eq!(book["title"], "Le Petit Prince");
    assert_eq!(book["isbn"], "978-2070612758");
}

#[tokio::test]
async fn update_accepts_own_isbn() {
    let router = app();
    let (status, book) = send(
        &router,
        Method::PUT,
        "/books/1",
        Some(json!({ "isbn": "978-0451524935", "published_year": 1950 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["published_year"], 1950);
}

#[tokio::test]
async fn invalid_update_is_unprocessable() {
    let router = app();
    let (status, _) = send(&router, Method::PUT, "/books/1", Some(json!({ "author": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, book) = send(&router, Method::GET, "/books/1", None).await;
    assert_eq!(book["author"], "George Orwell");
}

#[tokio::test]
async fn banner_and_health_are_served() {
    let router = app();

    let (status, banner) = send(&router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banner["message"], "Welcome");

    let (status, health) = send(&router, Method::GET, "/tests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "Healthy");
    assert_eq!(health["service"], "bib-api");
}

#[tokio::test]
async fn openapi_document_includes_books() {
    let router = app();
    let (status, document) = send(&router, Method::GET, "/docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(document["paths"]["/books/{id}"]["get"].is_object());
    assert!(document["components"]["schemas"]["BookUpdate"].is_object());
}
