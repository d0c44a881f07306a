mod api;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;
mod worker;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use app::BridgeDashboardApp;
use eframe::egui;

use crate::api::client::BackendClient;
use crate::config::Config;
use crate::worker::Backend;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env().context("Invalid configuration")?;
    let client = BackendClient::new(&config).context("Failed to set up backend client")?;
    log::info!("Using backend at {}", client.base_url());
    let backend: Arc<dyn Backend> = Arc::new(client);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bridge Telemetry Dashboard",
        options,
        Box::new(move |cc| {
            Ok(Box::new(BridgeDashboardApp::new(
                &config,
                backend,
                cc.egui_ctx.clone(),
            )))
        }),
    )
    .map_err(|e| anyhow!("Failed to start dashboard: {e}"))
}
