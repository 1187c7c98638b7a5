//! Dynamically typed scalar payloads carried by configuration nodes.

use std::fmt;

/// A scalar configuration value.
///
/// The [`fmt::Display`] implementation is the canonical text serialization:
/// it is what the serializer writes and what the placeholder resolver
/// evaluates.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free-form text, written without quoting or escaping.
    String(String),
}

impl Scalar {
    /// Coerces text into the most specific scalar type it represents.
    ///
    /// Numbers are only recognised when their canonical form reproduces the
    /// input exactly, so `007`, `-0` and `1.50` stay strings. This keeps
    /// `Scalar::auto(text).to_string() == text` for every input.
    #[must_use]
    pub fn auto(text: &str) -> Self {
        match text {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "null" => Self::Null,
            _ => parse_int(text)
                .or_else(|| parse_float(text))
                .unwrap_or_else(|| Self::String(text.to_owned())),
        }
    }

    /// Interprets the value as a flag. Integers are truthy when non-zero.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            Self::Int(number) => Some(*number != 0),
            Self::Null | Self::Float(_) | Self::String(_) => None,
        }
    }

    /// Text form used when the value names a path or command. Null is empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(text) => text.clone(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("null"),
            Self::Bool(flag) => write!(formatter, "{flag}"),
            Self::Int(number) => write!(formatter, "{number}"),
            Self::Float(number) => {
                let text = number.to_string();
                if number.is_finite() && !text.contains('.') {
                    write!(formatter, "{text}.0")
                } else {
                    formatter.write_str(&text)
                }
            }
            Self::String(text) => formatter.write_str(text),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

fn parse_int(text: &str) -> Option<Scalar> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let candidate = Scalar::Int(text.parse().ok()?);
    (candidate.to_string() == text).then_some(candidate)
}

fn parse_float(text: &str) -> Option<Scalar> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.')?;
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return None;
    }
    let candidate = Scalar::Float(text.parse().ok()?);
    (candidate.to_string() == text).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", Scalar::Bool(true))]
    #[case("false", Scalar::Bool(false))]
    #[case("null", Scalar::Null)]
    #[case("27017", Scalar::Int(27017))]
    #[case("-12", Scalar::Int(-12))]
    #[case("0", Scalar::Int(0))]
    #[case("0.5", Scalar::Float(0.5))]
    #[case("-2.25", Scalar::Float(-2.25))]
    #[case("1.0", Scalar::Float(1.0))]
    #[case("mongod", Scalar::String("mongod".to_owned()))]
    fn auto_detects_most_specific_type(#[case] text: &str, #[case] expected: Scalar) {
        assert_eq!(Scalar::auto(text), expected);
    }

    #[rstest]
    #[case("007")]
    #[case("-0")]
    #[case("1.50")]
    #[case("1e5")]
    #[case("True")]
    #[case("+5")]
    #[case(".5")]
    #[case("5.")]
    #[case("99999999999999999999")]
    #[case("")]
    #[case("0700")]
    fn non_canonical_text_stays_a_string(#[case] text: &str) {
        assert_eq!(Scalar::auto(text), Scalar::String(text.to_owned()));
    }

    #[rstest]
    #[case("127.0.0.1")]
    #[case("0.1")]
    #[case("3.14159")]
    #[case("/var/log/mongodb/mongod.log")]
    #[case("-9223372036854775808")]
    fn auto_preserves_canonical_text(#[case] text: &str) {
        assert_eq!(Scalar::auto(text).to_string(), text);
    }

    #[rstest]
    fn whole_floats_keep_a_decimal_point() {
        assert_eq!(Scalar::Float(3.0).to_string(), "3.0");
        assert_eq!(Scalar::Float(-0.5).to_string(), "-0.5");
    }

    #[rstest]
    fn flags_accept_integers() {
        assert_eq!(Scalar::Int(1).as_bool(), Some(true));
        assert_eq!(Scalar::Int(0).as_bool(), Some(false));
        assert_eq!(Scalar::from("yes").as_bool(), None);
    }

    #[rstest]
    fn null_text_is_empty() {
        assert_eq!(Scalar::Null.to_text(), "");
        assert_eq!(Scalar::Int(5).to_text(), "5");
    }
}
