//! # Rive Viewer
//!
//! Headless player binary.

use clap::Parser;
use rive_viewer::{CliArgs, ViewerApp, ViewerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rive_viewer=info,rive_core=info,rive_renderer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = ViewerConfig::from(args);

    tracing::info!(
        "Viewport {}x{}, {} backend",
        config.width,
        config.height,
        config.backend
    );

    let mut app = ViewerApp::new(config)?;
    app.load()?;
    app.apply_inputs();
    let report = app.run();
    tracing::debug!("Run report: {report:?}");
    app.write_output()?;

    Ok(())
}
