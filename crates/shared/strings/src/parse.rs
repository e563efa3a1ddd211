use crate::{StringsError, StringsErrorExt};

macro_rules! parser {
    ($(#[$doc:meta])* $name:ident, $ty:ty, trim = $trim:expr) => {
        $(#[$doc])*
        ///
        /// # Errors
        /// [`StringsError::Empty`] for an empty input, [`StringsError::Parse`]
        /// when it is not a base-10 integer in range.
        pub fn $name(value: &str) -> Result<$ty, StringsError> {
            let value = if $trim { value.trim() } else { value };
            if value.is_empty() {
                return Err(StringsError::Empty { context: Some(stringify!($name).into()) });
            }
            value.parse::<$ty>().context(stringify!($name))
        }
    };
}

parser!(parse_u64, u64, trim = false);
parser!(parse_i64, i64, trim = false);
parser!(
    /// Like [`parse_i64`] but for `i32`, ignoring surrounding whitespace.
    parse_i32, i32, trim = true
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers() {
        assert_eq!(parse_u64("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(parse_i64("-42").unwrap(), -42);
        assert_eq!(parse_i32("  7 \n").unwrap(), 7);
    }

    #[test]
    fn empty_input_names_operation() {
        let err = parse_u64("").unwrap_err();
        assert!(matches!(err, StringsError::Empty { .. }));
        assert_eq!(err.to_string(), "Empty value (parse_u64)");
        assert!(matches!(parse_i32("   "), Err(StringsError::Empty { .. })));
    }

    #[test]
    fn invalid_digits_are_parse_errors() {
        assert!(matches!(parse_u64("-1"), Err(StringsError::Parse { .. })));
        assert!(matches!(parse_i64(" 5"), Err(StringsError::Parse { .. })));
        assert!(matches!(parse_i32("2147483648"), Err(StringsError::Parse { .. })));
        assert!(parse_i64("12abc").unwrap_err().to_string().starts_with("Parse error (parse_i64): "));
    }
}
