use chrono::{DateTime, NaiveDateTime, Utc};

use super::MetafileError;

/// Timestamp pattern used by every date field of the metafile (UTC).
pub const DATE_PATTERN: &str = "dd-MM-yyyy HH:mm:ss.SSSSSS";

const CHRONO_FORMAT: &str = "%d-%m-%Y %H:%M:%S%.6f";

/// Parse a metafile timestamp. The input must match `DATE_PATTERN` exactly:
/// zero-padded fields and six fraction digits.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, MetafileError> {
    let invalid = |source| MetafileError::InvalidDateFormat {
        value: raw.to_string(),
        pattern: DATE_PATTERN,
        source,
    };

    // chrono accepts unpadded numbers and an optional fraction
    if !has_pattern_shape(raw) {
        return Err(invalid(None));
    }

    NaiveDateTime::parse_from_str(raw, CHRONO_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| invalid(Some(e)))
}

/// Letters of the pattern stand for one ASCII digit, everything else must
/// match literally.
fn has_pattern_shape(raw: &str) -> bool {
    raw.len() == DATE_PATTERN.len()
        && DATE_PATTERN
            .bytes()
            .zip(raw.bytes())
            .all(|(expected, actual)| {
                if expected.is_ascii_alphabetic() {
                    actual.is_ascii_digit()
                } else {
                    actual == expected
                }
            })
}
