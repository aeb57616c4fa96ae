//! Fixed-point temperatures: tenths of a degree stored as `i64`.

use crate::error::TemperatureError;
use std::fmt::Write;

/// Parses `-?[0-9]+\.[0-9]` into tenths of a degree without going through
/// floating point, e.g. `b"-40.2"` becomes `-402`.
#[inline(always)]
pub fn parse_temp(bytes: &[u8]) -> Result<i64, TemperatureError> {
    let (neg, rest) = match bytes.split_first() {
        None => return Err(TemperatureError::Empty),
        Some((b'-', rest)) => (true, rest),
        Some(_) => (false, bytes),
    };

    // At least one integer digit, the dot and the fractional digit.
    if rest.len() < 3 {
        return Err(TemperatureError::Malformed);
    }

    let (int_part, frac_part) = rest.split_at(rest.len() - 2);
    if frac_part[0] != b'.' {
        return Err(TemperatureError::Malformed);
    }

    let mut value: i64 = 0;
    for &b in int_part.iter().chain(&frac_part[1..]) {
        let digit = b.wrapping_sub(b'0');
        if digit > 9 {
            return Err(TemperatureError::Malformed);
        }

        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit as i64))
            .ok_or(TemperatureError::Overflow)?;
    }

    Ok(if neg { -value } else { value })
}

/// Writes a fixed-point value as degrees with one decimal (`-5` → `-0.5`).
pub fn write_tenths(out: &mut impl Write, tenths: i64) -> std::fmt::Result {
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    write!(out, "{sign}{}.{}", abs / 10, abs % 10)
}
