/// Create a simple ASCII progress bar.
pub fn progress_bar(filled: u64, total: u64, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Format a playback speed multiplier, trimming trailing zeros: ×0.75, ×1, ×1.5
pub fn format_speed(speed: f64) -> String {
    if speed == speed.floor() {
        format!("×{}", speed as i64)
    } else {
        format!("×{}", speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_bounds() {
        assert_eq!(progress_bar(0, 108, 4), "░░░░");
        assert_eq!(progress_bar(108, 108, 4), "████");
        assert_eq!(progress_bar(200, 108, 4), "████");
        assert_eq!(progress_bar(3, 0, 4), "░░░░");
    }

    #[test]
    fn speed_formatting() {
        assert_eq!(format_speed(1.0), "×1");
        assert_eq!(format_speed(0.75), "×0.75");
        assert_eq!(format_speed(1.5), "×1.5");
    }
}
