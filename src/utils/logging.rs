//! Logging initialisation

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Set once the global subscriber is installed
static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so stdout stays
/// free for command output. Safe to call more than once; only the first call
/// has any effect, and a subscriber installed by someone else is left alone.
pub fn init_logging(level: &str, json: bool) {
    INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);

        let installed = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if installed.is_ok() {
            tracing::debug!("Logging initialized (level: {}, json: {})", level, json);
        }
    });
}
