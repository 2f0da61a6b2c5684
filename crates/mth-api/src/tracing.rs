//! Log output for the server.
//!
//! Development prints pretty events with their source location; production
//! prints one JSON object per event with the enclosing request span flattened
//! in, so `request_id`, `card_id` and `user_id` end up as top-level fields.
//! `RUST_LOG` replaces the default directives entirely.

use mth_srs::{SessionLimits, SrsParams};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEVELOPMENT_DIRECTIVES: &str =
    "info,serv=debug,mth_api=debug,mth_db=debug,tower_http=debug,sqlx=warn";

const PRODUCTION_DIRECTIVES: &str =
    "warn,serv=info,mth_api=info,mth_db=info,tower_http=info,tower_governor=warn,sqlx=warn";

/// Filter directives used when `RUST_LOG` is not set
pub const fn default_directives(env: Environment) -> &'static str {
    match env {
        Environment::Development => DEVELOPMENT_DIRECTIVES,
        Environment::Production => PRODUCTION_DIRECTIVES,
    }
}

fn env_filter(env: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(env)))
}

/// Install the global subscriber for `env`
pub fn init_tracing(env: Environment) {
    let filter = env_filter(env);

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "Tracing initialized");
}

/// Log the scheduling parameters the server runs with
pub fn log_scheduler_config(params: &SrsParams, limits: &SessionLimits) {
    tracing::info!(
        default_ease_factor = params.default_ease_factor,
        min_ease_factor = params.min_ease_factor,
        max_ease_factor = params.max_ease_factor,
        max_interval_days = params.max_interval_days,
        session_total_limit = limits.total_limit,
        session_new_limit = limits.new_limit,
        reviews_per_new = limits.reviews_per_new,
        "Scheduler configured"
    );
}
