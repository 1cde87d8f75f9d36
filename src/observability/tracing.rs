use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use crate::store::ResourceKind;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("livedash={}", config.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("Tracing init failed: {}", e)))
}

pub fn trace_refresh(kind: ResourceKind, items: usize) -> Span {
    tracing::info_span!(
        "refresh",
        kind = %kind,
        items,
    )
}

pub fn trace_stream(source_id: &str) -> Span {
    tracing::info_span!(
        "price_stream",
        source = source_id,
    )
}
