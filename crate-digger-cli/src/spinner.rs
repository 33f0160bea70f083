//! Spinner shown while waiting on a remote catalog.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Run `fut` with a spinner showing `msg`, clearing it when done.
pub(crate) async fn with_spinner<F: Future>(msg: impl Into<String>, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    pb.finish_and_clear();
    output
}
