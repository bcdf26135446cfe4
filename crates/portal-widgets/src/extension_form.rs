//! Validation and submit guard for the extension-request form.
//!
//! The form moves through [`FormState`]: it starts `Pristine`, becomes
//! `Validating` while a pass runs, and ends each pass `Valid` or `Invalid`.
//! Every pass clears the rendered errors and recomputes them from the current
//! field values.
//!
//! Rules for the new expiry date, first failure wins:
//!
//! 1. it is required;
//! 2. it must be after the current due date;
//! 3. it must be after today;
//! 4. it may be at most `max_extension_days` past the current due date.
//!
//! The reason may be at most `reason_max_length` characters.

use std::any::Any;

use chrono::{Days, NaiveDate};
use portal_core::dates::{format_iso, parse_date};
use portal_core::error::ValidationError;
use portal_core::i18n::gettext;
use portal_core::settings::PortalSettings;
use portal_dom::{el, Document, NodeId};

use crate::behavior::{Behavior, Event, EventBinding, EventKind, EventResult, PageContext};
use crate::field_errors::{clear_all_errors, show_field_error};
use crate::timers::{TimerAction, TimerId};

const DATE_FIELD: &str = r#"input[name="requested_expiry_date"]"#;
const REASON_FIELD: &str = r#"textarea[name="request_reason"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

/// Where the form is in its validation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Pristine,
    Validating,
    Valid,
    Invalid,
}

/// The selectable range of the new expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConstraint {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateConstraint {
    /// `min` is tomorrow; `max` is `max_days` past the current due date, or
    /// past `min` when the current due date is unknown.
    pub fn compute(today: NaiveDate, current_due: Option<NaiveDate>, max_days: i64) -> Self {
        let min = today.succ_opt().unwrap_or(today);
        let base = current_due.unwrap_or(min);
        let max = u64::try_from(max_days)
            .ok()
            .and_then(|days| base.checked_add_days(Days::new(days)))
            .unwrap_or(base);
        Self { min, max }
    }
}

/// Checks the new expiry date.
///
/// A non-empty value that is not a date passes; rules that need the current
/// due date are skipped when it is unknown.
///
/// ```
/// use chrono::NaiveDate;
/// use portal_widgets::extension_form::validate_new_date;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let current = NaiveDate::from_ymd_opt(2024, 1, 10);
/// let err = validate_new_date("2024-01-09", current, today, 30).unwrap_err();
/// assert_eq!(err.message, "New expiry date must be after current due date.");
/// assert!(validate_new_date("2024-01-20", current, today, 30).is_ok());
/// ```
pub fn validate_new_date(
    raw: &str,
    current_due: Option<NaiveDate>,
    today: NaiveDate,
    max_days: i64,
) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::new(
            gettext("New expiry date is required."),
            "required",
        ));
    }
    let Some(new_date) = parse_date(raw) else {
        return Ok(());
    };
    if current_due.is_some_and(|current| new_date <= current) {
        return Err(ValidationError::new(
            gettext("New expiry date must be after current due date."),
            "not_after_current",
        ));
    }
    if new_date <= today {
        return Err(ValidationError::new(
            gettext("New expiry date must be in the future."),
            "not_in_future",
        ));
    }
    if let Some(current) = current_due {
        if (new_date - current).num_days() > max_days {
            return Err(ValidationError::new(
                gettext("Extension cannot exceed {max} days.").replace("{max}", &max_days.to_string()),
                "too_long_extension",
            )
            .with_param("max", max_days.to_string()));
        }
    }
    Ok(())
}

/// Checks the length of the request reason, counted in characters.
pub fn validate_reason(reason: &str, max_length: usize) -> Result<(), ValidationError> {
    if reason.chars().count() > max_length {
        return Err(ValidationError::new(
            gettext("Reason cannot exceed {max} characters.").replace("{max}", &max_length.to_string()),
            "max_length",
        )
        .with_param("max", max_length.to_string()));
    }
    Ok(())
}

/// Number of days the new date extends the current due date, floored at zero.
pub fn extension_days(new_date: NaiveDate, current_due: NaiveDate) -> i64 {
    (new_date - current_due).num_days().max(0)
}

/// Guards the extension-request form.
#[derive(Debug)]
pub struct ExtensionRequestFormValidator {
    root: NodeId,
    state: FormState,
    constraint: Option<DateConstraint>,
    pending_submit: Option<TimerId>,
}

const EVENTS: &[EventBinding] = &[
    EventBinding::on_root(EventKind::Submit, "submit"),
    EventBinding::delegated(EventKind::Change, DATE_FIELD, "date_change"),
    EventBinding::delegated(EventKind::KeyUp, REASON_FIELD, "reason_change"),
];

impl ExtensionRequestFormValidator {
    pub const fn new(root: NodeId) -> Self {
        Self {
            root,
            state: FormState::Pristine,
            constraint: None,
            pending_submit: None,
        }
    }

    pub const fn state(&self) -> FormState {
        self.state
    }

    /// The date range set on the date input at start, if the form has one.
    pub const fn constraint(&self) -> Option<DateConstraint> {
        self.constraint
    }

    /// The delayed native submission scheduled by a valid submit.
    pub const fn pending_submit(&self) -> Option<TimerId> {
        self.pending_submit
    }

    fn current_due(doc: &Document, date_input: NodeId) -> Option<NaiveDate> {
        doc.data(date_input, "current-due-date").and_then(parse_date)
    }

    /// Computes the date range and writes it to the input's `min`/`max`.
    pub fn init_date_constraints(&mut self, doc: &mut Document, today: NaiveDate, settings: &PortalSettings) {
        let Some(date_input) = doc.query(self.root, DATE_FIELD) else {
            return;
        };
        let constraint = DateConstraint::compute(
            today,
            Self::current_due(doc, date_input),
            settings.max_extension_days,
        );
        doc.set_attr(date_input, "min", &format_iso(constraint.min));
        doc.set_attr(date_input, "max", &format_iso(constraint.max));
        self.constraint = Some(constraint);
    }

    /// Runs a full validation pass and renders its errors.
    pub fn validate(&mut self, doc: &mut Document, today: NaiveDate, settings: &PortalSettings) -> bool {
        self.state = FormState::Validating;
        clear_all_errors(doc, self.root);

        let mut errors = Vec::new();
        if let Some(date_input) = doc.query(self.root, DATE_FIELD) {
            let result = validate_new_date(
                &doc.value(date_input),
                Self::current_due(doc, date_input),
                today,
                settings.max_extension_days,
            );
            if let Err(error) = result {
                errors.push((date_input, error));
            }
        }
        if let Some(reason) = doc.query(self.root, REASON_FIELD) {
            if let Err(error) = validate_reason(&doc.value(reason), settings.reason_max_length) {
                errors.push((reason, error));
            }
        }

        for (field, error) in &errors {
            show_field_error(doc, *field, error);
        }
        self.state = if errors.is_empty() {
            FormState::Valid
        } else {
            FormState::Invalid
        };
        tracing::debug!(state = ?self.state, errors = errors.len(), "extension form validated");
        errors.is_empty()
    }

    fn on_date_change(&mut self, ctx: &mut PageContext<'_>, date_input: NodeId) {
        let new_date = parse_date(&ctx.doc.value(date_input));
        let current_due = Self::current_due(ctx.doc, date_input);
        if let (Some(new_date), Some(current_due)) = (new_date, current_due) {
            if let Some(display) = ctx.doc.query(self.root, ".extension-days-display") {
                let days = extension_days(new_date, current_due);
                ctx.doc.set_text(display, &days.to_string());
            }
        }
        self.validate(ctx.doc, ctx.clock.today(), ctx.settings);
    }

    fn on_reason_change(&mut self, ctx: &mut PageContext<'_>, reason: NodeId) {
        let length = ctx.doc.value(reason).chars().count();
        let max = ctx.settings.reason_max_length;
        if let Some(counter) = ctx.doc.query(self.root, ".char-count") {
            ctx.doc.set_text(counter, &format!("{length}/{max}"));
            ctx.doc.toggle_class(counter, "text-danger", length > max);
        }
        self.validate(ctx.doc, ctx.clock.today(), ctx.settings);
    }

    fn on_submit(&mut self, ctx: &mut PageContext<'_>, form: NodeId) -> EventResult {
        if !self.validate(ctx.doc, ctx.clock.today(), ctx.settings) {
            tracing::debug!("extension request blocked");
            return EventResult::prevent();
        }
        if let Some(button) = ctx.doc.query(self.root, SUBMIT_BUTTON) {
            ctx.doc.set_disabled(button, true);
            show_busy_label(ctx.doc, button, &gettext("Submitting..."));
        }
        let timer = ctx
            .scheduler
            .schedule_once(ctx.settings.submit_delay(), TimerAction::SubmitForm(form));
        self.pending_submit = Some(timer);
        EventResult::prevent()
    }
}

/// Replaces a button's label with a spinner and `label`.
pub fn show_busy_label(doc: &mut Document, button: NodeId, label: &str) {
    doc.clear_children(button);
    doc.append_built(button, el("i").class("fa fa-spinner fa-spin"));
    let text = doc.create_text(&format!(" {label}"));
    doc.append_child(button, text);
}

impl Behavior for ExtensionRequestFormValidator {
    fn name(&self) -> &'static str {
        "extension_form"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn start(&mut self, ctx: &mut PageContext<'_>) {
        self.init_date_constraints(ctx.doc, ctx.clock.today(), ctx.settings);
    }

    fn events(&self) -> &'static [EventBinding] {
        EVENTS
    }

    fn handle(&mut self, ctx: &mut PageContext<'_>, binding: &EventBinding, event: &Event) -> EventResult {
        match binding.handler {
            "submit" => return self.on_submit(ctx, event.target),
            "date_change" => self.on_date_change(ctx, event.current_target),
            "reason_change" => self.on_reason_change(ctx, event.current_target),
            _ => {}
        }
        EventResult::proceed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn check(raw: &str) -> Result<(), String> {
        validate_new_date(raw, Some(date("2024-01-10")), date("2024-01-05"), 30).map_err(|e| e.message)
    }

    #[test]
    fn test_rules_in_order() {
        assert_eq!(check("").unwrap_err(), "New expiry date is required.");
        assert_eq!(check("   ").unwrap_err(), "New expiry date is required.");
        assert_eq!(
            check("2024-01-09").unwrap_err(),
            "New expiry date must be after current due date."
        );
        assert_eq!(
            check("2024-01-10").unwrap_err(),
            "New expiry date must be after current due date."
        );
        assert_eq!(check("2024-02-15").unwrap_err(), "Extension cannot exceed 30 days.");
        assert!(check("2024-01-20").is_ok());
        assert!(check("2024-02-09").is_ok());
        assert!(check("2024-02-10").is_err());
    }

    #[test]
    fn test_future_rule_when_due_date_passed() {
        let result = validate_new_date("2024-01-04", Some(date("2024-01-01")), date("2024-01-05"), 30);
        let err = result.unwrap_err();
        assert_eq!(err.message, "New expiry date must be in the future.");
        assert_eq!(err.code, "not_in_future");
    }

    #[test]
    fn test_unparseable_date_passes() {
        assert!(check("someday").is_ok());
    }

    #[test]
    fn test_missing_current_due_skips_relative_rules() {
        let today = date("2024-01-05");
        assert!(validate_new_date("2024-06-01", None, today, 30).is_ok());
        assert!(validate_new_date("2024-01-05", None, today, 30).is_err());
    }

    #[test]
    fn test_limit_comes_from_settings() {
        let err = validate_new_date("2024-01-20", Some(date("2024-01-10")), date("2024-01-05"), 7).unwrap_err();
        assert_eq!(err.message, "Extension cannot exceed 7 days.");
        assert_eq!(err.params.get("max").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_reason_length_counts_characters() {
        assert!(validate_reason(&"é".repeat(500), 500).is_ok());
        let err = validate_reason(&"a".repeat(501), 500).unwrap_err();
        assert_eq!(err.message, "Reason cannot exceed 500 characters.");
        assert_eq!(err.code, "max_length");
    }

    #[test]
    fn test_date_constraint() {
        let c = DateConstraint::compute(date("2024-01-05"), Some(date("2024-01-10")), 30);
        assert_eq!(c.min, date("2024-01-06"));
        assert_eq!(c.max, date("2024-02-09"));

        let c = DateConstraint::compute(date("2024-01-05"), None, 30);
        assert_eq!(c.max, date("2024-02-05"));
    }

    #[test]
    fn test_extension_days_floor() {
        assert_eq!(extension_days(date("2024-01-20"), date("2024-01-10")), 10);
        assert_eq!(extension_days(date("2024-01-01"), date("2024-01-10")), 0);
    }

    #[test]
    fn test_busy_label() {
        let mut doc = Document::new();
        let button = doc.build(el("button").text("Request Extension"));
        show_busy_label(&mut doc, button, "Submitting...");
        assert_eq!(
            doc.inner_html(button),
            r#"<i class="fa fa-spinner fa-spin"></i> Submitting..."#
        );
    }
}
