//! Small utility helpers used across modules.

/// Integer percentage of `earned` against `max`, with an empty maximum
/// counting as zero. `floor(100 * earned / max) >= t` is equivalent to
/// `earned / max >= t / 100` for integer inputs, so star thresholds can
/// compare against this directly.
pub fn percentage(earned: u64, max: u64) -> u32 {
  if max == 0 {
    return 0;
  }
  (earned.saturating_mul(100) / max) as u32
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", &s[..max], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percentage_matches_threshold_arithmetic() {
    assert_eq!(percentage(90, 100), 90);
    assert_eq!(percentage(91, 100), 91);
    assert_eq!(percentage(0, 0), 0);
    // 82/90 is 91.1%, which clears a 91% cutoff under floor division too.
    assert!(percentage(82, 90) >= 91);
    assert!(percentage(81, 90) < 91);
  }

  #[test]
  fn trunc_marks_long_payloads() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert!(trunc_for_log(&"x".repeat(40), 8).contains("40 bytes"));
  }
}
