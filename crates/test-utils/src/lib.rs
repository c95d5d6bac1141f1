pub mod builders;

use std::sync::Once;
use std::time::Duration;

use fanexec::aggregate::TaggedLine;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
///
/// Anything that spawns real processes goes through this so a hung child
/// fails the test instead of the whole suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Render tagged lines the way the CLI prints them.
pub fn rendered(lines: &[TaggedLine]) -> Vec<String> {
    lines.iter().map(ToString::to_string).collect()
}

/// Texts of the lines carrying `label`, in arrival order.
pub fn texts_for(lines: &[TaggedLine], label: &str) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.label == label)
        .map(|line| line.text.clone())
        .collect()
}
