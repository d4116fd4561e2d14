use serde_json::{Number, Value};

/// `[+-]?\d+`
pub fn is_integer_literal(token: &str) -> bool {
    let digits = strip_sign(token.as_bytes());
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// `[+-]?\d+(\.\d+)?([eE][+-]?\d+)?`
pub fn is_float_literal(token: &str) -> bool {
    let bytes = strip_sign(token.as_bytes());
    let mut i = count_digits(bytes);
    if i == 0 {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        let frac = count_digits(&bytes[i + 1..]);
        if frac == 0 {
            return false;
        }
        i += 1 + frac;
    }
    exponent_ends_at(bytes, i)
}

/// Like [`is_float_literal`] but also accepts `.5` and `5.`.
pub fn is_decimal_literal(token: &str) -> bool {
    let bytes = strip_sign(token.as_bytes());
    let int = count_digits(bytes);
    let mut i = int;
    let mut frac = 0;
    if bytes.get(i) == Some(&b'.') {
        frac = count_digits(&bytes[i + 1..]);
        i += 1 + frac;
    }
    if int == 0 && frac == 0 {
        return false;
    }
    exponent_ends_at(bytes, i)
}

pub fn float_value(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

/// Drop the fractional part, keeping the result in `i64` range.
pub fn truncate_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

pub fn format_i64(value: i64) -> String {
    let mut buffer = itoa::Buffer::new();
    buffer.format(value).to_string()
}

/// Shortest text that reads back as the same float. Integral values keep a
/// trailing `.0` so they do not turn into integers on re-import.
pub fn format_f64(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format_finite(value).to_string()
}

fn strip_sign(bytes: &[u8]) -> &[u8] {
    match bytes.first() {
        Some(b'+' | b'-') => &bytes[1..],
        _ => bytes,
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn exponent_ends_at(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i) {
        None => true,
        Some(b'e' | b'E') => {
            let rest = strip_sign(&bytes[i + 1..]);
            !rest.is_empty() && rest.iter().all(u8::is_ascii_digit)
        }
        Some(_) => false,
    }
}
