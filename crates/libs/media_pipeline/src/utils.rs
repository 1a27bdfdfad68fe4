/// Generate a URL-safe random ID of a given length.
#[must_use]
pub fn nice_id(length: usize) -> String {
    const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";
    (0..length)
        .map(|_| {
            let idx = fastrand::usize(0..URL_SAFE.len());
            URL_SAFE[idx] as char
        })
        .collect()
}

/// Formats a byte count for display, e.g. "1.5 MB".
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exponent])
}

/// Reports how much smaller the compressed output is, e.g. "65% smaller".
#[must_use]
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> String {
    if original_size == 0 {
        return "0% smaller".to_string();
    }
    let saved = original_size.saturating_sub(compressed_size) as f64;
    let ratio = saved / original_size as f64 * 100.0;
    format!("{}% smaller", ratio.round())
}

/// Logs a warning message with an 'ALERT:' prefix.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        warn!("ALERT: {}", format_args!($($arg)*));
    };
}
