//! # Session Paginator
//!
//! Owns the [`SessionState`] of one form fill: responses, current page,
//! and the validation errors shown on screen.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared_types::{FieldErrors, FormDefinition, ResponseMap, SessionState};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::PaginatorConfig;
use crate::domain::{paginate, shuffle_fields, FieldRules, Page, PaginatorError, ValidationErrors};
use crate::ports::SessionNavigation;

/// Paginated, validated survey session.
#[derive(Clone, Debug)]
pub struct SessionPaginator {
    form: FormDefinition,
    pages: Vec<Page>,
    rules: HashMap<String, FieldRules>,
    state: SessionState,
}

impl SessionPaginator {
    /// Validate `form`, compile its rules, and lay it out.
    pub fn load(form: FormDefinition, config: &PaginatorConfig) -> Result<Self, PaginatorError> {
        form.validate()?;

        let rules = form
            .input_fields()
            .map(|field| FieldRules::compile(field).map(|rules| (field.id.clone(), rules)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        let mut fields = form.fields.clone();
        if form.settings.shuffle_questions {
            shuffle_fields(&mut fields, config.shuffle_seed);
        }

        let title = if form.name.trim().is_empty() {
            config.default_title.as_str()
        } else {
            form.name.as_str()
        };
        let pages = paginate(&fields, title);

        info!(
            form_id = %form.id,
            pages = pages.len(),
            shuffled = form.settings.shuffle_questions,
            "[fc-03] Form laid out"
        );

        Ok(Self {
            form,
            pages,
            rules,
            state: SessionState::default(),
        })
    }

    /// The loaded form.
    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// All pages.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages (at least one).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page on screen.
    pub fn current_page(&self) -> &Page {
        &self.pages[self.state.current_page.min(self.pages.len() - 1)]
    }

    /// True on the first page.
    pub fn is_first_page(&self) -> bool {
        self.state.current_page == 0
    }

    /// Progress bar value in percent; `None` when the form hides the bar.
    pub fn progress_percent(&self) -> Option<f64> {
        if !self.form.settings.show_progress_bar {
            return None;
        }
        Some((self.state.current_page + 1) as f64 / self.pages.len() as f64 * 100.0)
    }

    /// Current responses.
    pub fn responses(&self) -> &ResponseMap {
        &self.state.responses
    }

    /// One response.
    pub fn response(&self, field_id: &str) -> Option<&Value> {
        self.state.responses.get(field_id)
    }

    /// Errors on screen.
    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    /// Full session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True once any answer exists.
    pub fn has_responses(&self) -> bool {
        self.state.has_responses()
    }

    /// Remove an answer.
    pub fn clear_response(&mut self, field_id: &str) {
        self.state.responses.remove(field_id);
        self.state.errors.remove(field_id);
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.state.last_saved = Some(at);
    }

    /// Replace all state with a resumed session. The page index is clamped
    /// to the current layout; errors are dropped.
    pub fn restore(&mut self, responses: ResponseMap, current_page: usize) {
        let last = self.pages.len() - 1;
        if current_page > last {
            debug!(current_page, last, "[fc-03] Resumed page out of range, clamping");
        }
        self.state = SessionState {
            responses,
            current_page: current_page.min(last),
            errors: FieldErrors::new(),
            last_saved: self.state.last_saved,
        };
    }

    /// Start over on page one with no answers.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    fn page_errors(&self) -> FieldErrors {
        self.current_page()
            .fields
            .iter()
            .filter_map(|field| {
                let rules = self.rules.get(&field.id)?;
                let message = rules.check(self.state.responses.get(&field.id))?;
                Some((field.id.clone(), message))
            })
            .collect()
    }
}

impl SessionNavigation for SessionPaginator {
    fn set_response(&mut self, field_id: &str, value: Value) -> Result<(), PaginatorError> {
        let field = self
            .form
            .field(field_id)
            .ok_or_else(|| PaginatorError::UnknownField(field_id.to_string()))?;
        if !field.is_input() {
            return Err(PaginatorError::NotAnInput(field_id.to_string()));
        }
        self.state.responses.insert(field_id.to_string(), value);
        self.state.errors.remove(field_id);
        Ok(())
    }

    fn validate_current_page(&mut self) -> Result<(), ValidationErrors> {
        let errors = self.page_errors();
        self.state.errors = errors.clone();
        if errors.is_empty() {
            Ok(())
        } else {
            debug!(
                page = self.state.current_page,
                invalid = errors.len(),
                "[fc-03] Page has invalid fields"
            );
            Err(ValidationErrors(errors))
        }
    }

    fn go_next(&mut self) -> Result<usize, PaginatorError> {
        self.validate_current_page()?;
        if !self.is_last_page() {
            self.state.current_page += 1;
        }
        Ok(self.state.current_page)
    }

    fn go_previous(&mut self) -> usize {
        self.state.current_page = self.state.current_page.saturating_sub(1);
        self.state.current_page
    }

    fn current_page_index(&self) -> usize {
        self.state.current_page
    }

    fn is_last_page(&self) -> bool {
        self.state.current_page + 1 >= self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{FieldKind, FormDefinitionError, FormField};

    fn survey() -> FormDefinition {
        FormDefinition::new(
            "f1",
            "Household",
            vec![
                FormField::new("name", "Name", FieldKind::Text).required(),
                FormField::page_break("br1"),
                FormField::new("age", "Age", FieldKind::Number),
                FormField::page_break("br2"),
                FormField::new("notes", "Notes", FieldKind::Textarea),
            ],
        )
    }

    fn load(form: FormDefinition) -> SessionPaginator {
        SessionPaginator::load(form, &PaginatorConfig::for_testing()).unwrap()
    }

    #[test]
    fn test_layout() {
        let p = load(survey());
        assert_eq!(p.page_count(), 3);
        assert_eq!(p.current_page().title, "Page 1");
        assert!(p.is_first_page());
        assert!(!p.is_last_page());
    }

    #[test]
    fn test_required_blocks_advance() {
        let mut p = load(survey());
        let err = p.go_next().unwrap_err();
        assert!(matches!(err, PaginatorError::Validation(_)));
        assert_eq!(p.current_page_index(), 0);
        assert_eq!(
            p.errors().get("name").map(String::as_str),
            Some("This field is required")
        );
    }

    #[test]
    fn test_set_response_clears_error_and_advances() {
        let mut p = load(survey());
        let _ = p.go_next();
        p.set_response("name", json!("Ana")).unwrap();
        assert!(p.errors().is_empty());
        assert_eq!(p.go_next().unwrap(), 1);
    }

    #[test]
    fn test_only_current_page_is_validated() {
        let mut p = load(survey());
        p.set_response("name", json!("Ana")).unwrap();
        p.go_next().unwrap();
        // Later invalid answers do not matter on page two.
        p.set_response("age", json!(33)).unwrap();
        assert_eq!(p.go_next().unwrap(), 2);
        assert!(p.is_last_page());
        assert_eq!(p.go_next().unwrap(), 2);
    }

    #[test]
    fn test_back_never_validates() {
        let mut p = load(survey());
        p.set_response("name", json!("Ana")).unwrap();
        p.go_next().unwrap();
        p.set_response("age", json!("abc")).unwrap();
        assert_eq!(p.go_previous(), 0);
        assert_eq!(p.go_previous(), 0);
    }

    #[test]
    fn test_unknown_and_non_input_fields() {
        let mut p = load(survey());
        assert_eq!(
            p.set_response("missing", json!(1)),
            Err(PaginatorError::UnknownField("missing".into()))
        );
        assert_eq!(
            p.set_response("br1", json!(1)),
            Err(PaginatorError::NotAnInput("br1".into()))
        );
    }

    #[test]
    fn test_progress() {
        let mut p = load(survey());
        let first = p.progress_percent().unwrap();
        assert!((first - 100.0 / 3.0).abs() < 1e-9);

        p.set_response("name", json!("Ana")).unwrap();
        p.go_next().unwrap();
        p.go_next().unwrap();
        assert_eq!(p.progress_percent(), Some(100.0));

        let mut form = survey();
        form.settings.show_progress_bar = false;
        assert_eq!(load(form).progress_percent(), None);
    }

    #[test]
    fn test_restore_and_reset() {
        let mut p = load(survey());
        let mut responses = ResponseMap::new();
        responses.insert("name".into(), json!("Ana"));

        p.restore(responses.clone(), 9);
        assert_eq!(p.current_page_index(), 2);
        assert_eq!(p.responses(), &responses);

        p.reset();
        assert!(!p.has_responses());
        assert_eq!(p.current_page_index(), 0);
    }

    #[test]
    fn test_invalid_form_rejected_at_load() {
        let form = FormDefinition::new(
            "f1",
            "Broken",
            vec![
                FormField::new("q", "A", FieldKind::Text),
                FormField::new("q", "B", FieldKind::Text),
            ],
        );
        assert_eq!(
            SessionPaginator::load(form, &PaginatorConfig::default()).unwrap_err(),
            PaginatorError::InvalidForm(FormDefinitionError::DuplicateFieldId("q".into()))
        );
    }

    #[test]
    fn test_unnamed_form_uses_default_title() {
        let form = FormDefinition::new("f1", "", vec![FormField::new("q", "Q", FieldKind::Text)]);
        assert_eq!(load(form).current_page().title, "Survey");
    }

    #[test]
    fn test_seeded_shuffle_is_stable_across_loads() {
        let fields = (0..12)
            .map(|i| FormField::new(format!("q{i}"), "Q", FieldKind::Text))
            .collect();
        let mut form = FormDefinition::new("f1", "Shuffled", fields);
        form.settings.shuffle_questions = true;

        let a = load(form.clone());
        let b = load(form);
        assert_eq!(a.pages(), b.pages());
    }
}
