use crate::bail;
use crate::error::{ErrorKind, TabulaResult};

/// Interprets a backend small integer as a boolean, `true` iff it is positive.
pub fn int_to_bool(value: i64) -> bool {
    value > 0
}

pub fn bool_to_int(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

/// Parses a boolean returned as text, such as `"1"` or `"0"`.
pub fn parse_bool(s: &str) -> TabulaResult<bool> {
    match s.trim().parse::<i64>() {
        Ok(value) => Ok(int_to_bool(value)),
        Err(_) => match s.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => bail!(
                ErrorKind::CodecError,
                "Invalid boolean value",
                format!("Boolean value must be an integer (received: {other})")
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_ints_are_true() {
        assert!(int_to_bool(1));
        assert!(int_to_bool(5));
        assert!(!int_to_bool(0));
        assert!(!int_to_bool(-1));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("true").unwrap());
        assert_eq!(parse_bool("yes").unwrap_err().kind(), ErrorKind::CodecError);
    }
}
