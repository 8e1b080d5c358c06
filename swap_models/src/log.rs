use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. `json_format` switches from the human
/// readable console layout to flattened JSON lines.
pub fn init_tracing(json_format: bool) {
    if json_format {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().json().flatten_event(true).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().compact().with_target(false).with_ansi(true))
            .init();
    }
}
