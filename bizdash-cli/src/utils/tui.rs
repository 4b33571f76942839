use bizdash_core::ImportProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_progress_bar(total: usize, message: String) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:30}] {pos}/{len} {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

/// Advance the bar to the latest counters.
pub fn update_progress(bar: &ProgressBar, progress: ImportProgress) {
    bar.set_position(progress.processed() as u64);
    bar.set_prefix(format!(
        "({} ok, {} failed)",
        progress.succeeded, progress.failed
    ));
}
