//! Deep equality over tagged values.

use crate::model::{Primitive, Value};

/// Structural equality used by the diff engine.
///
/// - opaque values compare by canonical encoding, regardless of kind
/// - lists compare pairwise and must have equal length
/// - records must share a key set with pairwise-equal values
/// - `Null` equals only `Null`
/// - integers (including decimal strings that hold integers) compare by exact value
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Callable, Value::Callable) => true,
        (Value::Opaque(x), Value::Opaque(y)) => x.encoded == y.encoded,
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Record(xs), Value::Record(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        (Value::Primitive(x), Value::Primitive(y)) => primitives_equal(x, y),
        _ => false,
    }
}

fn primitives_equal(a: &Primitive, b: &Primitive) -> bool {
    match (a, b) {
        (Primitive::Bool(x), Primitive::Bool(y)) => x == y,
        (Primitive::Str(x), Primitive::Str(y)) => x == y,
        (Primitive::Float(x), Primitive::Float(y)) => x == y,
        (Primitive::Int(x), Primitive::Int(y)) => x == y,
        (Primitive::Float(_), _) | (_, Primitive::Float(_)) => false,
        (Primitive::Bool(_), _) | (_, Primitive::Bool(_)) => false,
        // Remaining pairs mix Int, BigInt and numeric-looking Str
        _ => match (canonical_integer(a), canonical_integer(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Canonical decimal form of an integer-valued primitive.
///
/// Values beyond `i128` keep their trimmed digit string with leading zeros
/// removed, so comparison never goes through a lossy float.
fn canonical_integer(p: &Primitive) -> Option<String> {
    let text = match p {
        Primitive::Int(i) => return Some(i.to_string()),
        Primitive::BigInt(s) | Primitive::Str(s) => s.trim(),
        _ => return None,
    };
    if let Ok(i) = text.parse::<i128>() {
        return Some(i.to_string());
    }
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        return Some("0".to_string());
    }
    Some(format!("{}{}", sign, stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpaqueToken;

    #[test]
    fn test_opaque_values_compare_by_encoding() {
        let a = Value::Opaque(OpaqueToken::public_key("B62qabc"));
        let b = Value::Opaque(OpaqueToken::hash("B62qabc"));
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &Value::public_key("B62qdef")));
    }

    #[test]
    fn test_opaque_never_equals_plain_string() {
        assert!(!values_equal(&Value::public_key("x"), &Value::str("x")));
    }

    #[test]
    fn test_null_equals_only_null() {
        assert!(values_equal(&Value::Null, &Value::Null));
        assert!(!values_equal(&Value::Null, &Value::str("")));
        assert!(!values_equal(&Value::Null, &Value::empty_record()));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let a = Value::Primitive(Primitive::BigInt("900719925474099312345".to_string()));
        let b = Value::str("900719925474099312345");
        let c = Value::str("900719925474099312346");
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
        assert!(values_equal(&Value::int(42), &Value::str("42")));
    }

    #[test]
    fn test_integer_beyond_i128_compares_by_digits() {
        let big = "1".repeat(45);
        let a = Value::Primitive(Primitive::BigInt(big.clone()));
        let b = Value::str(format!("000{}", big));
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn test_lists_compare_pairwise() {
        let a = Value::List(vec![Value::int(1), Value::str("x")]);
        let b = Value::List(vec![Value::int(1), Value::str("x")]);
        let c = Value::List(vec![Value::int(1)]);
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn test_records_require_same_keys() {
        let a = Value::record([("x", Value::int(1))]);
        let b = Value::record([("x", Value::int(1)), ("y", Value::Null)]);
        assert!(!values_equal(&a, &b));
        assert!(values_equal(&a, &a.clone()));
    }
}
