//! Numeric formatting and bounded parsing

use std::fmt::Display;
use std::io::Write;

use arri_protocol::TypeKind;

/// Append a finite `f32` in its shortest round-trip form.
///
/// Returns `false` for NaN and infinities, which JSON cannot carry.
pub fn append_float32(buf: &mut Vec<u8>, value: f32) -> bool {
    if !value.is_finite() {
        return false;
    }
    // Writing into a Vec cannot fail
    let _ = write!(buf, "{}", value);
    true
}

/// Append a finite `f64` in its shortest round-trip form
pub fn append_float64(buf: &mut Vec<u8>, value: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    let _ = write!(buf, "{}", value);
    true
}

/// Append an integer without quotes
pub fn append_integer(buf: &mut Vec<u8>, value: impl Display) {
    let _ = write!(buf, "{}", value);
}

/// Append a 64-bit integer as a quoted decimal string
pub fn append_quoted_integer(buf: &mut Vec<u8>, value: impl Display) {
    let _ = write!(buf, "\"{}\"", value);
}

/// Inclusive bounds of an integer kind, for error messages
pub fn integer_bounds(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Int8 => "[-128, 127]",
        TypeKind::Int16 => "[-32768, 32767]",
        TypeKind::Int32 => "[-2147483648, 2147483647]",
        TypeKind::Int64 => "[-9223372036854775808, 9223372036854775807]",
        TypeKind::Uint8 => "[0, 255]",
        TypeKind::Uint16 => "[0, 65535]",
        TypeKind::Uint32 => "[0, 4294967295]",
        TypeKind::Uint64 => "[0, 18446744073709551615]",
        TypeKind::Float32 => "[-3.4028235e38, 3.4028235e38]",
        _ => "",
    }
}

/// Accepts an optional leading `-` followed by ASCII digits only
pub fn is_decimal_literal(value: &str, signed: bool) -> bool {
    let digits = match value.strip_prefix('-') {
        Some(rest) if signed => rest,
        Some(_) => return false,
        None => value,
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_shortest_float_form() {
        assert_eq!(text(|b| assert!(append_float64(b, 1.5))), "1.5");
        assert_eq!(text(|b| assert!(append_float64(b, 3.0))), "3");
        assert_eq!(text(|b| assert!(append_float64(b, 0.1))), "0.1");
        assert_eq!(text(|b| assert!(append_float32(b, 0.1))), "0.1");
        assert_eq!(text(|b| assert!(append_float64(b, -0.000001))), "-0.000001");
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut buf = Vec::new();
        assert!(!append_float64(&mut buf, f64::NAN));
        assert!(!append_float32(&mut buf, f32::INFINITY));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_quoted_integers() {
        assert_eq!(text(|b| append_quoted_integer(b, -42i64)), r#""-42""#);
        assert_eq!(text(|b| append_quoted_integer(b, u64::MAX)), r#""18446744073709551615""#);
        assert_eq!(text(|b| append_integer(b, 7u8)), "7");
    }

    #[test]
    fn test_decimal_literal() {
        assert!(is_decimal_literal("-12", true));
        assert!(!is_decimal_literal("-12", false));
        assert!(!is_decimal_literal("+12", true));
        assert!(!is_decimal_literal("1e3", true));
        assert!(!is_decimal_literal("", false));
        assert!(!is_decimal_literal("-", true));
    }
}
