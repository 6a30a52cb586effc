//! Wire codec for the telemetry link
//!
//! # Wire Format
//!
//! One snapshot per record, a single line of labeled decimal fields in
//! fixed order:
//!
//! ```text
//! Temp:21.50,Humidity:55.00,NH3:0.02,H2S:0.01,CO2:410.30,CH4:1.80
//! ```
//!
//! - **Labels and order**: fixed; this is a strict format, not a lenient
//!   key-value scanner, so parsing cost stays bounded on both stations
//! - **Values**: decimal, optionally signed, optional fractional part;
//!   encoded with two fractional digits
//! - **Framing**: the codec emits no trailing newline; the transport
//!   delimits records with `\n`
//!
//! ## Parse policy
//!
//! All six fields must be present and finite or the whole line is rejected;
//! a partial match never produces a partial snapshot. Whitespace around the
//! whole line is tolerated (the transport's newline falls out of this).
//! A rejected line is carried inside the error for logging and has no
//! effect on any previously accepted snapshot.

use crate::error::{Error, Result};
use crate::types::SensorSnapshot;

/// Field labels in transmission order
const FIELD_LABELS: [&str; 6] = ["Temp", "Humidity", "NH3", "H2S", "CO2", "CH4"];

/// Encode a snapshot as one wire record.
///
/// Never fails: every channel is always present and finite-valued.
pub fn encode(snapshot: &SensorSnapshot) -> String {
    format!(
        "Temp:{:.2},Humidity:{:.2},NH3:{:.2},H2S:{:.2},CO2:{:.2},CH4:{:.2}",
        snapshot.temperature,
        snapshot.humidity,
        snapshot.ammonia,
        snapshot.hydrogen_sulfide,
        snapshot.carbon_dioxide,
        snapshot.methane,
    )
}

/// Parse one wire record into a snapshot.
///
/// Strict sequential scan: each label, colon, value and separator must
/// appear exactly in order, with nothing after the final field.
pub fn parse(line: &str) -> Result<SensorSnapshot> {
    let mut rest = line.trim();
    let mut values = [0.0f32; 6];

    for (index, label) in FIELD_LABELS.iter().enumerate() {
        if index > 0 {
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| malformed(line, "missing field separator"))?;
        }
        rest = rest
            .strip_prefix(label)
            .and_then(|r| r.strip_prefix(':'))
            .ok_or_else(|| malformed(line, "unexpected field label"))?;

        let split = numeric_prefix_len(rest);
        if split == 0 {
            return Err(malformed(line, "expected numeric value"));
        }
        let (digits, tail) = rest.split_at(split);
        let value: f32 = digits
            .parse()
            .map_err(|_| malformed(line, "unparseable numeric value"))?;
        if !value.is_finite() {
            return Err(malformed(line, "non-finite value"));
        }
        values[index] = value;
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(malformed(line, "trailing data after last field"));
    }

    Ok(SensorSnapshot {
        temperature: values[0],
        humidity: values[1],
        ammonia: values[2],
        hydrogen_sulfide: values[3],
        carbon_dioxide: values[4],
        methane: values[5],
    })
}

fn malformed(line: &str, reason: &'static str) -> Error {
    Error::MalformedRecord {
        line: line.trim_end().to_string(),
        reason,
    }
}

/// Length of the leading decimal number in `s`: optional sign, at least one
/// integer digit, optional `.` followed by at least one fractional digit.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return 0;
    }
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // A bare trailing dot is not consumed; the dot then fails the
        // separator check and rejects the line.
        if j > frac_start {
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SensorSnapshot {
        SensorSnapshot {
            temperature: 21.5,
            humidity: 55.0,
            ammonia: 0.02,
            hydrogen_sulfide: 0.01,
            carbon_dioxide: 410.3,
            methane: 1.8,
        }
    }

    #[test]
    fn encodes_fixed_order_two_decimals() {
        assert_eq!(
            encode(&sample()),
            "Temp:21.50,Humidity:55.00,NH3:0.02,H2S:0.01,CO2:410.30,CH4:1.80"
        );
    }

    #[test]
    fn encodes_zero_defaults() {
        assert_eq!(
            encode(&SensorSnapshot::default()),
            "Temp:0.00,Humidity:0.00,NH3:0.00,H2S:0.00,CO2:0.00,CH4:0.00"
        );
    }

    #[test]
    fn round_trips_at_two_decimal_precision() {
        let snapshot = sample();
        let parsed = parse(&encode(&snapshot)).unwrap();
        assert_eq!(parsed, snapshot);

        let awkward = SensorSnapshot {
            temperature: -3.14159,
            humidity: 99.999,
            ammonia: 123.456,
            hydrogen_sulfide: 0.005,
            carbon_dioxide: 5000.0,
            methane: 0.0,
        };
        let reparsed = parse(&encode(&awkward)).unwrap();
        let expected = parse(&encode(&reparsed)).unwrap();
        assert_eq!(reparsed, expected);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let parsed =
            parse("  Temp:21.50,Humidity:55.00,NH3:0.02,H2S:0.01,CO2:410.30,CH4:1.80\r\n").unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn accepts_signed_and_integer_values() {
        let parsed = parse("Temp:-5,Humidity:+40,NH3:0,H2S:0.5,CO2:300,CH4:10").unwrap();
        assert_eq!(parsed.temperature, -5.0);
        assert_eq!(parsed.humidity, 40.0);
        assert_eq!(parsed.hydrogen_sulfide, 0.5);
    }

    #[test]
    fn rejects_missing_field() {
        let err = parse("Temp:21.50,Humidity:55.00,NH3:0.00,H2S:0.00,CO2:0.00").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err =
            parse("Temp:abc,Humidity:55.00,NH3:0.00,H2S:0.00,CO2:0.00,CH4:0.00").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn rejects_fields_out_of_order() {
        assert!(parse("Humidity:55.00,Temp:21.50,NH3:0.00,H2S:0.00,CO2:0.00,CH4:0.00").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(
            parse("Temp:21.50,Humidity:55.00,NH3:0.02,H2S:0.01,CO2:410.30,CH4:1.80,extra")
                .is_err()
        );
        assert!(parse("Temp:21.50,Humidity:55.00,NH3:0.02,H2S:0.01,CO2:410.30,CH4:1.80x").is_err());
    }

    #[test]
    fn rejects_empty_and_junk_lines() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("not-a-record").is_err());
    }

    #[test]
    fn rejects_bare_trailing_dot() {
        assert!(parse("Temp:21.,Humidity:55.00,NH3:0.00,H2S:0.00,CO2:0.00,CH4:0.00").is_err());
    }

    #[test]
    fn error_carries_original_line() {
        let line = "Temp:oops,Humidity:55.00,NH3:0.00,H2S:0.00,CO2:0.00,CH4:0.00";
        match parse(line).unwrap_err() {
            Error::MalformedRecord { line: carried, .. } => assert_eq!(carried, line),
            other => panic!("unexpected error: {other}"),
        }
    }
}
