use anyhow::Context;
use bib_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bib settings")?;
    bib_telemetry::init(&settings)?;

    tracing::info!(
        env = settings.environment.as_str(),
        port = settings.server.port,
        "bib-app bootstrap starting"
    );

    bib_app::run(settings).await
}
