//! Logging setup (tracing-subscriber).
//!
//! - `RUST_LOG` controls the filter; default is `warn`.
//! - Output goes to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
