use crate::error::TabulaResult;

/// Parses an integer that the backend returned as text.
pub fn parse_int(s: &str) -> TabulaResult<i64> {
    Ok(s.trim().parse::<i64>()?)
}

/// Parses a floating point number that the backend returned as text.
pub fn parse_double(s: &str) -> TabulaResult<f64> {
    Ok(s.trim().parse::<f64>()?)
}
