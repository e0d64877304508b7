use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "fanhub_ops=info,fanhub_db=info";
const VERBOSE_FILTER: &str = "fanhub_ops=debug,fanhub_db=debug";

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over both defaults.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
