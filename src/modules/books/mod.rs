pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bib_kernel::{settings::BooksSettings, InitCtx, Module};
use utoipa::OpenApi;

use self::service::BookService;
use self::store::BookStore;

/// The library catalogue: an in-memory book store behind `/books/`
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self {
            service: Arc::new(BookService::new(store)),
        }
    }

    pub fn from_settings(settings: &BooksSettings) -> Self {
        let store = if settings.seed {
            BookStore::seeded()
        } else {
            BookStore::new()
        };
        Self::new(store)
    }

    pub fn service(&self) -> Arc<BookService> {
        self.service.clone()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.service.len().await;
        tracing::info!(
            module = self.name(),
            environment = ctx.settings.environment.as_str(),
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(routes::BooksApi::openapi()) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(module = self.name(), error = %err, "failed to render OpenAPI fragment");
                None
            }
        }
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.service.len().await;
        tracing::info!(
            module = self.name(),
            books,
            "books module stopped; catalogue discarded"
        );
        Ok(())
    }
}

/// Create the books module configured from settings
pub fn create_module(settings: &BooksSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::from_settings(settings))
}
