//! Wire timestamp parsing.
//!
//! Store records carry `stock_at` and `created_at` as strings in a fixed
//! `YYYY/MM/dd HH:mm:ss` local-time format. The core keeps them raw on the
//! records — locale-aware rendering is the display layer's job — and offers
//! this parser for callers that want a typed value.

use chrono::NaiveDateTime;

/// The fixed format the reporting service uses for all timestamps.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Parses a wire timestamp string, returning `None` if it does not match
/// the fixed format. A malformed timestamp never fails the record it came
/// from.
#[must_use]
pub fn parse_wire_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), WIRE_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_wire_format() {
        let ts = parse_wire_timestamp("2020/03/14 09:26:53").expect("should parse");
        assert_eq!(
            (ts.year(), ts.month(), ts.day()),
            (2020, 3, 14)
        );
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (9, 26, 53));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert!(parse_wire_timestamp(" 2020/03/14 09:26:53 ").is_some());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_wire_timestamp("2020-03-14 09:26:53").is_none());
        assert!(parse_wire_timestamp("not a date").is_none());
        assert!(parse_wire_timestamp("").is_none());
    }
}
