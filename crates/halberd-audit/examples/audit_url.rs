//! Example: Audit a live URL end to end.
//!
//! Launches headless Chromium, injects the engine bundle, and runs one
//! accessibility check with the defaults from `halberd.toml`:
//!
//! ```text
//! cargo run --example audit_url -- https://example.com
//! ```
//!
//! Needs a Chromium installation and an engine bundle (by default
//! `node_modules/axe-core/axe.min.js`; override with `HALBERD_ENGINE_PATH`).

use halberd_audit::{Auditor, CheckOptions};
use halberd_browser::{BrowserSession, EngineSource, PageEngine};
use halberd_core::AuditConfig;

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,halberd_audit=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let config = AuditConfig::load_with_env()?;

    println!("Launching browser...");
    let session = BrowserSession::launch_with(&config.browser).await?;
    let page = session.page(&url).await?;

    let engine = PageEngine::inject(page, &EngineSource::from_config(&config.engine)).await?;
    println!("✓ Injected {} v{}", engine.info().name, engine.info().version);

    let auditor = Auditor::new(engine).with_defaults(CheckOptions::from_config(&config.check));

    match auditor.check().await {
        Ok(report) => {
            println!(
                "✓ {} passed after {} attempt(s)",
                url, report.attempts
            );
        }
        Err(e) => {
            eprintln!("✗ {}: {}", url, e);
            session.close().await?;
            std::process::exit(1);
        }
    }

    session.close().await?;
    Ok(())
}
