//! Opt-in diagnostic output for embedders and tests.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "ZOOLA_LOG";

static TRACING_INIT: Once = Once::new();

/// Install a `fmt` subscriber when `ZOOLA_LOG` or `RUST_LOG` is set.
///
/// Later calls are no-ops, as is a call made after another global
/// subscriber was installed. `ZOOLA_LOG=zoola_eval=trace` shows every
/// evaluated node; `debug` shows calls, scope releases and monitors.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Some(filter) = env_filter() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set");
        }
    });
}

fn env_filter() -> Option<EnvFilter> {
    [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .find_map(|var| std::env::var(var).ok())
        .map(EnvFilter::new)
}
