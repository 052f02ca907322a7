//! Display labels for new recordings.

use std::time::Duration;

use chrono::{DateTime, Local};

/// Title given to the `n`th recording in the collection.
pub fn default_title(n: usize) -> String {
    format!("Recording {}", n)
}

/// Format elapsed time as `MM:SS`. Minutes keep counting past an hour.
pub fn duration_label(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format a creation time the way the list shows it, e.g. `Jan 12`.
pub fn date_label(created_at: DateTime<Local>) -> String {
    created_at.format("%b %-d").to_string()
}
