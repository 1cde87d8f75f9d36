use chrono::Utc;

/// Get current timestamp in milliseconds since epoch
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Upper-case the first character, leave the rest alone ("bitcoin" -> "Bitcoin").
pub fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Percent change from `previous` to `current`. `None` when there is no
/// usable baseline.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous > 0.0 && previous.is_finite() && current.is_finite() {
        Some((current - previous) / previous * 100.0)
    } else {
        None
    }
}
