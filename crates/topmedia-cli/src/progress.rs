//! Progress display for the resolution pass.
//!
//! Uses `indicatif` to show a per-row bar while permalinks are resolved and
//! spinners for the quick loading steps around it.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICKS: &str = "\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}";

/// Create the bar shown while rows are resolved and classified.
///
/// Hidden in quiet or JSON mode so stdout/stderr stay machine-readable.
pub fn create_row_progress(total: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "  {spinner:.cyan} Resolving URLs [{bar:30.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .tick_chars(SPINNER_TICKS)
    .progress_chars("\u{2588}\u{2589}\u{2591}");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Advance the row bar to `done` of `total`.
pub fn set_rows_done(bar: &ProgressBar, done: usize, total: usize) {
    bar.set_position(done as u64);
    bar.set_message(format!("({}%)", crate::output::percent(done, total)));
}

/// Replace the bar with a completion line.
pub fn finish_rows(bar: &ProgressBar, total: usize) {
    bar.set_style(ProgressStyle::with_template("  {msg}").unwrap_or_else(|_| ProgressStyle::default_bar()));
    bar.finish_with_message(format!(
        "\x1b[32m\u{2713}\x1b[0m {:<22} \x1b[32m{total} rows\x1b[0m",
        "URL resolution"
    ));
}

/// Create a simple spinner for general operations.
pub fn create_spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_TICKS),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Mark a spinner step as complete.
pub fn set_step_done(bar: &ProgressBar, step: &str, detail: &str) {
    bar.set_style(ProgressStyle::with_template("  {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    bar.finish_with_message(format!(
        "\x1b[32m\u{2713}\x1b[0m {step:<22} \x1b[32m{detail}\x1b[0m"
    ));
}
