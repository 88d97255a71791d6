//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info,scenecheck=debug`. With `json`
/// set, events are emitted as JSON lines instead of human-readable text.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing_with_default(json, "info,scenecheck=debug")
}

/// Install the global tracing subscriber with a custom fallback filter.
///
/// `RUST_LOG` still takes precedence over `default_directives`.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing_with_default(
    json: bool,
    default_directives: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true),
            )
            .try_init()?;
    }

    Ok(())
}
