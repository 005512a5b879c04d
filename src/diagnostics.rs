use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Installs a stdout tracing subscriber at `INFO`. Safe to call more than
/// once; only the first call installs anything.
pub fn init_tracing() {
    INIT.call_once(|| {
        let stdout_log = tracing_subscriber::fmt::layer().pretty();
        tracing_subscriber::registry()
            .with(stdout_log.with_filter(LevelFilter::INFO))
            .init();
    });
}
