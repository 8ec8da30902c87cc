//! `PT<H>H<M>M` durations as found in flight schedules

use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)H").expect("valid regex"));
static MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)M").expect("valid regex"));

fn component(re: &Regex, input: &str) -> u64 {
    re.captures(input)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Format `PT2H30M` as `2h 30m`, `PT5H` as `5h` and `PT45M` as `45m`.
///
/// Zero components are dropped, so `PT8H0M` is `8h`.
pub fn format_duration(encoded: &str) -> Result<String> {
    let Some(rest) = encoded.strip_prefix("PT") else {
        return Err(Error::InvalidDurationFormat(encoded.to_string()));
    };

    let hours = component(&HOURS, rest);
    let minutes = component(&MINUTES, rest);

    match (hours, minutes) {
        (0, 0) => Err(Error::NoDurationComponents(encoded.to_string())),
        (h, 0) => Ok(format!("{}h", h)),
        (0, m) => Ok(format!("{}m", m)),
        (h, m) => Ok(format!("{}h {}m", h, m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(format_duration("PT2H30M").unwrap(), "2h 30m");
    }

    #[test]
    fn test_hours_only() {
        assert_eq!(format_duration("PT5H").unwrap(), "5h");
        assert_eq!(format_duration("PT8H0M").unwrap(), "8h");
    }

    #[test]
    fn test_minutes_only() {
        assert_eq!(format_duration("PT45M").unwrap(), "45m");
        assert_eq!(format_duration("PT0H45M").unwrap(), "45m");
    }

    #[test]
    fn test_missing_prefix() {
        assert!(matches!(format_duration("invalid"), Err(Error::InvalidDurationFormat(_))));
        assert!(matches!(format_duration(""), Err(Error::InvalidDurationFormat(_))));
        assert!(matches!(format_duration("2H30M"), Err(Error::InvalidDurationFormat(_))));
    }

    #[test]
    fn test_no_components() {
        assert!(matches!(format_duration("PT"), Err(Error::NoDurationComponents(_))));
        assert!(matches!(format_duration("PT0H0M"), Err(Error::NoDurationComponents(_))));
    }
}
