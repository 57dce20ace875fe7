use std::sync::{mpsc, Arc};

use adpilot::app::AdpilotApp;
use adpilot::backend::Backend;
use adpilot::config::{self, AppConfig};
use adpilot::gateway::{AdsGateway, Credentials, DemoGateway, WebhookClient};
use adpilot::logging;
use eframe::egui;
use tracing::info;

fn build_gateway(config: &AppConfig) -> Result<Arc<dyn AdsGateway>, adpilot::error::ApiError> {
    if config.is_demo() {
        info!("no webhook url configured, using demo data");
        return Ok(Arc::new(DemoGateway::new(config.demo_latency)));
    }

    let url = config.webhook_url.as_deref().unwrap_or_default();
    let credentials = Credentials {
        access_token: config.access_token.clone(),
        ad_account_id: config.ad_account_id.clone(),
    };
    let client = WebhookClient::new(url, credentials, config.request_timeout)?;
    info!(url = client.base_url(), "using workflow webhooks");
    Ok(Arc::new(client))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("failed to initialise logging: {err}");
    }

    let (config, warnings) = config::load();
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("adpilot-runtime")
        .build()?;

    let gateway = build_gateway(&config)?;
    let backend = runtime.block_on(async { Backend::new(gateway, tx) })?;

    let app = AdpilotApp::new(rx, backend, warnings);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AdPilot",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
