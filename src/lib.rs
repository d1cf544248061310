//! bib: a REST API over an in-memory library catalogue.

pub mod modules;

use anyhow::Context;
use bib_kernel::{InitCtx, ModuleRegistry, Settings};

pub use modules::*;

/// Registry with every application module registered.
pub fn build_registry(settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings);
    registry
}

/// Initialize modules, serve HTTP until shutdown, then stop modules.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bib_http::start_server(&registry, &settings)
        .await
        .context("HTTP server exited with an error");

    registry.stop_all().await?;
    served
}
