//! Editable state of the filter popup.

use shelf_types::{FilterError, FilterOptions};

use super::DraftInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    MinAppId,
    MaxAppId,
    ExcludeTerms,
}

impl FilterField {
    pub const ALL: [Self; 3] = [Self::MinAppId, Self::MaxAppId, Self::ExcludeTerms];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinAppId => "Min App ID",
            Self::MaxAppId => "Max App ID",
            Self::ExcludeTerms => "Exclude terms",
        }
    }

    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::MinAppId => "Min",
            Self::MaxAppId => "Max",
            Self::ExcludeTerms => "demo, test, beta",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::MinAppId => 0,
            Self::MaxAppId => 1,
            Self::ExcludeTerms => 2,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::MinAppId => Self::MaxAppId,
            Self::MaxAppId => Self::ExcludeTerms,
            Self::ExcludeTerms => Self::MinAppId,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::MinAppId => Self::ExcludeTerms,
            Self::MaxAppId => Self::MinAppId,
            Self::ExcludeTerms => Self::MaxAppId,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    fields: [DraftInput; 3],
    focus: FilterField,
    error: Option<FilterError>,
}

impl FilterForm {
    /// Pre-fill from the filters currently applied.
    #[must_use]
    pub fn from_options(options: &FilterOptions) -> Self {
        let bound = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            fields: [
                DraftInput::with_text(bound(options.min_app_id)),
                DraftInput::with_text(bound(options.max_app_id)),
                DraftInput::with_text(options.exclude_terms().join(", ")),
            ],
            focus: FilterField::MinAppId,
            error: None,
        }
    }

    #[must_use]
    pub fn focus(&self) -> FilterField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    #[must_use]
    pub fn field(&self, field: FilterField) -> &DraftInput {
        &self.fields[field.index()]
    }

    pub fn focused_mut(&mut self) -> &mut DraftInput {
        self.error = None;
        &mut self.fields[self.focus.index()]
    }

    #[must_use]
    pub fn error(&self) -> Option<&FilterError> {
        self.error.as_ref()
    }

    /// Parse all three fields. On failure the error is kept for display.
    pub fn parse(&mut self) -> Result<FilterOptions, FilterError> {
        let result = FilterOptions::from_inputs(
            self.fields[0].text(),
            self.fields[1].text(),
            self.fields[2].text(),
        );
        self.error = result.as_ref().err().cloned();
        result
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.clear();
        }
        self.focus = FilterField::MinAppId;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_applied_filters_into_fields() {
        let options = FilterOptions::from_inputs("10", "", "Demo, beta").unwrap();
        let form = FilterForm::from_options(&options);
        assert_eq!(form.field(FilterField::MinAppId).text(), "10");
        assert_eq!(form.field(FilterField::MaxAppId).text(), "");
        assert_eq!(form.field(FilterField::ExcludeTerms).text(), "demo, beta");
    }

    #[test]
    fn parse_error_is_retained_until_edit() {
        let mut form = FilterForm::default();
        form.focused_mut().enter_char('x');
        assert!(form.parse().is_err());
        assert!(form.error().is_some());
        form.focused_mut().delete_char();
        assert!(form.error().is_none());
        assert_eq!(form.parse(), Ok(FilterOptions::default()));
    }

    #[test]
    fn focus_cycles() {
        let mut form = FilterForm::default();
        form.focus_prev();
        assert_eq!(form.focus(), FilterField::ExcludeTerms);
        form.focus_next();
        assert_eq!(form.focus(), FilterField::MinAppId);
    }
}
