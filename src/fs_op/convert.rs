//! Human readable byte sizes.

use crate::fs_op::error::{FsOpError, Result};

const SIZE_UNITS: [&str; 9] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with the largest fitting 1024-based unit, e.g.
/// `1023 bytes`, `1 KB`, `1.50 MB`.
pub fn convert_size_bytes_to_string(size: u64) -> String {
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit < 2 {
        format!("{:.0} {}", value, SIZE_UNITS[unit])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}

/// Parse strings such as `"1.09 GB"` or `"512 kb"` back into a byte count.
/// The result is truncated to a whole number of bytes.
pub fn convert_size_string_to_bytes(size: &str) -> Result<u64> {
    let invalid = || FsOpError::InvalidArgument(format!("invalid size string {size:?}"));
    let mut parts = size.split_whitespace();
    let (Some(amount), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let amount: f64 = amount.parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid());
    }
    let exp = SIZE_UNITS
        .iter()
        .position(|u| u.eq_ignore_ascii_case(unit))
        .ok_or_else(invalid)?;
    let bytes = amount * 1024f64.powi(exp as i32);
    if bytes >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}
