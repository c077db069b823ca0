//! # Field Rules
//!
//! Validation rules compiled once per form load. Constraints other than
//! "required" apply only when a value is present.

use regex::Regex;
use serde_json::Value;
use shared_types::{FieldKind, FormDefinitionError, FormField};

/// Message for a missing required answer.
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Default message for a pattern mismatch.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format";

/// Message for a non-numeric answer to a number field.
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";

/// Message for an answer outside the declared options.
pub const INVALID_OPTION_MESSAGE: &str = "Please select a valid option";

/// True for absent-equivalent values: null, blank text, empty list or
/// object. `false` and `0` are answers.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Compiled rules of one field. Patterns are unanchored; forms that need
/// a full match write `^...$`.
#[derive(Clone, Debug)]
pub struct FieldRules {
    field: FormField,
    pattern: Option<Regex>,
}

impl FieldRules {
    /// Compile a field's rules.
    pub fn compile(field: &FormField) -> Result<Self, FormDefinitionError> {
        let pattern = match field.validation.as_ref().and_then(|v| v.pattern.as_deref()) {
            Some(source) => Some(Regex::new(source).map_err(|e| {
                FormDefinitionError::InvalidPattern {
                    field: field.id.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            field: field.clone(),
            pattern,
        })
    }

    /// Field these rules belong to.
    pub fn field(&self) -> &FormField {
        &self.field
    }

    /// Check one answer. Returns the message of the first violated rule.
    pub fn check(&self, value: Option<&Value>) -> Option<String> {
        let value = match value {
            Some(v) if !is_empty_value(v) => v,
            _ if self.field.required => return Some(REQUIRED_MESSAGE.to_string()),
            _ => return None,
        };

        self.check_choice(value)
            .or_else(|| self.check_length(value))
            .or_else(|| self.check_pattern(value))
            .or_else(|| self.check_numeric(value))
    }

    fn check_choice(&self, value: &Value) -> Option<String> {
        let options = self.field.choice_options()?;
        let allowed = |v: &str| options.iter().any(|o| o.value == v);
        let valid = match (&self.field.kind, value) {
            (FieldKind::Checkbox { .. }, Value::Array(items)) => items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| allowed(s))),
            (FieldKind::Checkbox { .. }, _) => false,
            (_, Value::String(s)) => allowed(s),
            _ => false,
        };
        (!valid).then(|| INVALID_OPTION_MESSAGE.to_string())
    }

    fn check_length(&self, value: &Value) -> Option<String> {
        let rules = self.field.validation.as_ref()?;
        let text = value.as_str()?;
        let len = text.chars().count();
        if let Some(min) = rules.min_length {
            if len < min {
                return Some(format!("Minimum {min} characters required"));
            }
        }
        if let Some(max) = rules.max_length {
            if len > max {
                return Some(format!("Maximum {max} characters allowed"));
            }
        }
        None
    }

    fn check_pattern(&self, value: &Value) -> Option<String> {
        let regex = self.pattern.as_ref()?;
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if regex.is_match(&text) {
            return None;
        }
        let message = self
            .field
            .validation
            .as_ref()
            .and_then(|v| v.pattern_message.clone())
            .unwrap_or_else(|| INVALID_FORMAT_MESSAGE.to_string());
        Some(message)
    }

    fn check_numeric(&self, value: &Value) -> Option<String> {
        let is_number_field = matches!(self.field.kind, FieldKind::Number);
        let rules = self.field.validation.as_ref();
        let bounded = rules.is_some_and(|r| r.min.is_some() || r.max.is_some());
        if !is_number_field && !bounded {
            return None;
        }

        let Some(number) = as_number(value) else {
            return Some(INVALID_NUMBER_MESSAGE.to_string());
        };
        let rules = rules?;
        if let Some(min) = rules.min {
            if number < min {
                return Some(format!("Value must be at least {min}"));
            }
        }
        if let Some(max) = rules.max {
            if number > max {
                return Some(format!("Value must be at most {max}"));
            }
        }
        None
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{ChoiceOption, FieldValidation};

    fn rules(field: FormField) -> FieldRules {
        FieldRules::compile(&field).unwrap()
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("  ")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!("x")));
    }

    #[test]
    fn test_required() {
        let r = rules(FormField::new("q1", "Name", FieldKind::Text).required());
        assert_eq!(r.check(None).as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(r.check(Some(&json!(""))).as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(r.check(Some(&json!("Ana"))), None);
    }

    #[test]
    fn test_optional_empty_skips_other_rules() {
        let r = rules(
            FormField::new("q1", "Code", FieldKind::Text).with_validation(FieldValidation {
                min_length: Some(3),
                ..FieldValidation::default()
            }),
        );
        assert_eq!(r.check(None), None);
        assert_eq!(r.check(Some(&json!(""))), None);
    }

    #[test]
    fn test_length_bounds() {
        let r = rules(
            FormField::new("q1", "Code", FieldKind::Text).with_validation(FieldValidation {
                min_length: Some(2),
                max_length: Some(4),
                ..FieldValidation::default()
            }),
        );
        assert_eq!(
            r.check(Some(&json!("a"))).as_deref(),
            Some("Minimum 2 characters required")
        );
        assert_eq!(
            r.check(Some(&json!("abcde"))).as_deref(),
            Some("Maximum 4 characters allowed")
        );
        assert_eq!(r.check(Some(&json!("abc"))), None);
    }

    #[test]
    fn test_pattern() {
        let r = rules(
            FormField::new("q1", "Phone", FieldKind::Phone).with_validation(FieldValidation {
                pattern: Some("^[0-9]{10}$".into()),
                pattern_message: Some("Enter 10 digits".into()),
                ..FieldValidation::default()
            }),
        );
        assert_eq!(r.check(Some(&json!("0712345678"))), None);
        assert_eq!(
            r.check(Some(&json!("07123456789"))).as_deref(),
            Some("Enter 10 digits")
        );

        let plain = rules(
            FormField::new("q2", "Code", FieldKind::Text).with_validation(FieldValidation {
                pattern: Some("[A-Z]+".into()),
                ..FieldValidation::default()
            }),
        );
        assert_eq!(
            plain.check(Some(&json!("abc"))).as_deref(),
            Some(INVALID_FORMAT_MESSAGE)
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let r = rules(
            FormField::new("age", "Age", FieldKind::Number).with_validation(FieldValidation {
                min: Some(0.0),
                max: Some(120.0),
                ..FieldValidation::default()
            }),
        );
        assert_eq!(r.check(Some(&json!(30))), None);
        assert_eq!(r.check(Some(&json!("45"))), None);
        assert_eq!(
            r.check(Some(&json!(-1))).as_deref(),
            Some("Value must be at least 0")
        );
        assert_eq!(
            r.check(Some(&json!(121.5))).as_deref(),
            Some("Value must be at most 120")
        );
        assert_eq!(
            r.check(Some(&json!("old"))).as_deref(),
            Some(INVALID_NUMBER_MESSAGE)
        );
    }

    #[test]
    fn test_choices() {
        let options = vec![ChoiceOption::plain("yes"), ChoiceOption::plain("no")];
        let radio = rules(FormField::new(
            "q1",
            "Consent",
            FieldKind::Radio {
                options: options.clone(),
            },
        ));
        assert_eq!(radio.check(Some(&json!("yes"))), None);
        assert_eq!(
            radio.check(Some(&json!("maybe"))).as_deref(),
            Some(INVALID_OPTION_MESSAGE)
        );

        let checkbox = rules(FormField::new("q2", "Assets", FieldKind::Checkbox { options }));
        assert_eq!(checkbox.check(Some(&json!(["yes", "no"]))), None);
        assert_eq!(
            checkbox.check(Some(&json!(["yes", "car"]))).as_deref(),
            Some(INVALID_OPTION_MESSAGE)
        );
        assert_eq!(
            checkbox.check(Some(&json!("yes"))).as_deref(),
            Some(INVALID_OPTION_MESSAGE)
        );
    }

    #[test]
    fn test_bad_pattern_fails_compile() {
        let field = FormField::new("q1", "Code", FieldKind::Text).with_validation(FieldValidation {
            pattern: Some("(".into()),
            ..FieldValidation::default()
        });
        assert!(matches!(
            FieldRules::compile(&field),
            Err(FormDefinitionError::InvalidPattern { .. })
        ));
    }
}
