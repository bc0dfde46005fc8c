use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a stderr subscriber the first time a handle is created.
/// A subscriber already installed by the host process wins.
pub(crate) fn init() {
	INIT.call_once(|| {
		let filter = ["HWMON_LOG", "RUST_LOG"]
			.into_iter()
			.find_map(|name| std::env::var(name).ok())
			.and_then(|directives| EnvFilter::try_new(directives).ok())
			.unwrap_or_else(|| EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.try_init();
	});
}
