//! # Form Definitions
//!
//! Forms as delivered by the backend: an ordered field list plus presentation
//! settings. Field records are a closed tagged union keyed by `type`, so an
//! unknown field type fails at load time instead of at render time.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::FormDefinitionError;

/// A single selectable option for select/radio/checkbox fields.
///
/// Accepts either a bare string (`"yes"`) or `{ "value": .., "label": .. }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawChoiceOption")]
pub struct ChoiceOption {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl ChoiceOption {
    /// Option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChoiceOption {
    Plain(String),
    Labeled {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<RawChoiceOption> for ChoiceOption {
    fn from(raw: RawChoiceOption) -> Self {
        match raw {
            RawChoiceOption::Plain(value) => ChoiceOption::plain(value),
            RawChoiceOption::Labeled { value, label } => Self {
                label: label.unwrap_or_else(|| value.clone()),
                value,
            },
        }
    }
}

/// Field type with per-variant payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Numeric input.
    Number,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Calendar date.
    Date,
    /// Single choice from a dropdown.
    Select {
        /// Allowed options.
        #[serde(default)]
        options: Vec<ChoiceOption>,
    },
    /// Single choice from radio buttons.
    Radio {
        /// Allowed options.
        #[serde(default)]
        options: Vec<ChoiceOption>,
    },
    /// Multiple choice.
    Checkbox {
        /// Allowed options.
        #[serde(default)]
        options: Vec<ChoiceOption>,
    },
    /// GPS coordinate capture.
    Gps,
    /// Photo capture.
    Photo,
    /// Read-only note, never answered.
    Note,
    /// Page separator, never answered.
    PageBreak,
}

/// Optional value constraints, applied only when a value is present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Minimum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_message: Option<String>,
    /// Numeric lower bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Numeric upper bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Per-field layout flags.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    /// This field begins a new page.
    #[serde(default)]
    pub start_new_page: bool,
}

/// One field of a form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FormField {
    /// Field identifier, the key in the response map.
    pub id: String,
    /// Question text.
    #[serde(default)]
    pub label: String,
    /// An answer is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Type and type-specific payload.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Value constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    /// Layout flags.
    #[serde(default)]
    pub settings: FieldSettings,
}

impl FormField {
    /// Create a field with no constraints.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: false,
            kind,
            validation: None,
            settings: FieldSettings::default(),
        }
    }

    /// Create a page-break marker.
    pub fn page_break(id: impl Into<String>) -> Self {
        Self::new(id, "", FieldKind::PageBreak)
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach validation rules.
    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Set the "start new page" flag.
    pub fn starting_new_page(mut self) -> Self {
        self.settings.start_new_page = true;
        self
    }

    /// True for page-break markers.
    pub fn is_page_break(&self) -> bool {
        matches!(self.kind, FieldKind::PageBreak)
    }

    /// True if this field takes an answer.
    pub fn is_input(&self) -> bool {
        !matches!(self.kind, FieldKind::PageBreak | FieldKind::Note)
    }

    /// Declared options for choice fields.
    pub fn choice_options(&self) -> Option<&[ChoiceOption]> {
        match &self.kind {
            FieldKind::Select { options }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => Some(options),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Presentation settings of a form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    /// Randomly reorder fields before pagination.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Accent color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    /// Show the progress bar.
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
    /// Message shown after completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            shuffle_questions: false,
            primary_color: None,
            show_progress_bar: true,
            thank_you_message: None,
        }
    }
}

/// Default completion message.
pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Thank you for completing our survey!";

impl FormSettings {
    /// Completion message, falling back to the default.
    pub fn thank_you_message(&self) -> &str {
        self.thank_you_message
            .as_deref()
            .unwrap_or(DEFAULT_THANK_YOU_MESSAGE)
    }
}

/// A complete form as fetched from the backend. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FormDefinition {
    /// Form identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered fields.
    #[serde(default)]
    pub fields: Vec<FormField>,
    /// Settings.
    #[serde(default)]
    pub settings: FormSettings,
}

impl FormDefinition {
    /// Create a form with default settings.
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            fields,
            settings: FormSettings::default(),
        }
    }

    /// Look up a field by id.
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields that take answers.
    pub fn input_fields(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.is_input())
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), FormDefinitionError> {
        if self.id.trim().is_empty() {
            return Err(FormDefinitionError::EmptyFormId);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.id.trim().is_empty() {
                return Err(FormDefinitionError::EmptyFieldId);
            }
            if !seen.insert(field.id.as_str()) {
                return Err(FormDefinitionError::DuplicateFieldId(field.id.clone()));
            }
            if let Some(options) = field.choice_options() {
                if options.is_empty() {
                    return Err(FormDefinitionError::MissingOptions(field.id.clone()));
                }
            }
            if let Some(rules) = &field.validation {
                validate_rules(&field.id, rules)?;
            }
        }
        Ok(())
    }
}

fn validate_rules(field_id: &str, rules: &FieldValidation) -> Result<(), FormDefinitionError> {
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            return Err(FormDefinitionError::InvertedLengthBounds(field_id.to_string()));
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            return Err(FormDefinitionError::InvertedNumericBounds(field_id.to_string()));
        }
    }
    if let Some(pattern) = &rules.pattern {
        Regex::new(pattern).map_err(|e| FormDefinitionError::InvalidPattern {
            field: field_id.to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Summary of a form assigned to a collection link.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormRef {
    /// Form identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Number of fields (markers included).
    pub field_count: usize,
}

impl From<&FormDefinition> for FormRef {
    fn from(form: &FormDefinition) -> Self {
        Self {
            id: form.id.clone(),
            name: form.name.clone(),
            description: form.description.clone(),
            field_count: form.fields.len(),
        }
    }
}
