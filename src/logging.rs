use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIRECTIVES: &str = "info,adpilot=debug";

/// Installs the global subscriber. `RUST_LOG` overrides the default directives.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .try_init()?;
    Ok(())
}
