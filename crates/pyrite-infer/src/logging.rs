//! Log output setup

use crate::settings::LogSettings;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered at the configured level.
///
/// `RUST_LOG` takes precedence over the configured level when set. Returns
/// `false` if a global subscriber was already installed.
pub fn init(settings: &LogSettings) -> bool {
    let level = settings.level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pyrite_infer={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
