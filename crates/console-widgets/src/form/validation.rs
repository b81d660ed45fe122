//! Validation for text input before it reaches the filter state.

use super::descriptor::FieldDescriptor;
use regex::Regex;

/// Validator for text fields.
#[derive(Clone)]
pub enum Validator {
    /// Maximum length in characters
    MaxLength(usize),
    /// Regular expression pattern
    Regex(Regex),
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Regex(r) => write!(f, "Regex({})", r.as_str()),
        }
    }
}

impl Validator {
    /// Create a regex validator from a pattern string.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    /// Validate a value.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            Self::MaxLength(max) => {
                if value.chars().count() > *max {
                    Err(format!("최대 {}자까지 입력할 수 있습니다", max))
                } else {
                    Ok(())
                }
            }
            Self::Regex(regex) => {
                // Empty input clears the filter and is always accepted.
                if value.is_empty() || regex.is_match(value) {
                    Ok(())
                } else {
                    Err("형식이 올바르지 않습니다".into())
                }
            }
        }
    }
}

/// Validators implied by a field descriptor.
pub fn validators_for(field: &FieldDescriptor) -> Vec<Validator> {
    let mut validators = Vec::new();
    if let Some(max) = field.effective_max_length() {
        validators.push(Validator::MaxLength(max));
    }
    if let Some(ref pattern) = field.pattern {
        match Validator::pattern(pattern) {
            Ok(v) => validators.push(v),
            Err(e) => tracing::warn!(field = %field.id, error = %e, "ignoring invalid pattern"),
        }
    }
    validators
}

/// Run a field's validators; the first failure is reported with the field label.
pub fn validate_field(field: &FieldDescriptor, value: &str) -> Result<(), String> {
    for validator in validators_for(field) {
        if let Err(msg) = validator.validate(value) {
            return Err(format!("{}: {}", field.display_label(), msg));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::descriptor::FieldKind;

    #[test]
    fn test_max_length_counts_characters() {
        let v = Validator::MaxLength(5);
        assert!(v.validate("12345").is_ok());
        assert!(v.validate("123456").is_err());
        // Five Hangul syllables are fifteen bytes but five characters.
        assert!(v.validate("가나다라마").is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let field = FieldDescriptor::new("carno", FieldKind::Text).pattern("[");
        let validators = validators_for(&field);
        assert_eq!(validators.len(), 1);
        assert!(matches!(validators[0], Validator::MaxLength(255)));
    }

    #[test]
    fn test_validate_field() {
        let field = FieldDescriptor::new("carno", FieldKind::Text)
            .label("차량번호")
            .max_length(5)
            .pattern(r"^[0-9가-힣]+$");

        assert!(validate_field(&field, "12가34").is_ok());
        assert!(validate_field(&field, "").is_ok());
        assert_eq!(
            validate_field(&field, "123456").unwrap_err(),
            "차량번호: 최대 5자까지 입력할 수 있습니다"
        );
        assert_eq!(validate_field(&field, "ab").unwrap_err(), "차량번호: 형식이 올바르지 않습니다");
    }

    #[test]
    fn test_default_limit_applies_to_text() {
        let field = FieldDescriptor::new("memo", FieldKind::Textarea);
        let long = "x".repeat(256);
        assert!(validate_field(&field, &long).is_err());
        assert!(validate_field(&field, &long[..255]).is_ok());
    }
}
