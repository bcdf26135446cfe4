//! Validation and submit guard for the profile form.

use std::any::Any;

use once_cell::sync::Lazy;
use portal_core::error::ValidationError;
use portal_core::i18n::gettext;
use portal_dom::{Document, NodeId};
use regex::Regex;

use crate::behavior::{Behavior, Event, EventBinding, EventKind, EventResult, PageContext};
use crate::extension_form::show_busy_label;
use crate::field_errors::{apply_result, clear_all_errors};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// An optional `+6`/`60` style prefix followed by 8 to 10 digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+?6?0?)(\d{8,10})$").expect("valid regex"));

const NAME_FIELD: &str = r#"input[name="name"]"#;
const EMAIL_FIELD: &str = r#"input[name="email"]"#;
const PHONE_FIELD: &str = r#"input[name="phone"]"#;

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new(gettext("Name is required."), "required"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::new(gettext("Email is required."), "required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new(
            gettext("Please enter a valid email address."),
            "invalid",
        ));
    }
    Ok(())
}

/// Checks an optional phone number. Hyphens and spaces are ignored.
///
/// ```
/// use portal_widgets::profile_form::validate_phone;
///
/// assert!(validate_phone("").is_ok());
/// assert!(validate_phone("+60 12-345 6789").is_ok());
/// assert!(validate_phone("12").is_err());
/// ```
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Ok(());
    }
    let cleaned: String = phone.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
    if !PHONE_RE.is_match(&cleaned) {
        return Err(ValidationError::new(
            gettext("Please enter a valid phone number."),
            "invalid",
        ));
    }
    Ok(())
}

const FIELDS: &[(&str, fn(&str) -> Result<(), ValidationError>)] = &[
    (NAME_FIELD, validate_name),
    (EMAIL_FIELD, validate_email),
    (PHONE_FIELD, validate_phone),
];

const EVENTS: &[EventBinding] = &[
    EventBinding::on_root(EventKind::Submit, "submit"),
    EventBinding::delegated(EventKind::Change, NAME_FIELD, "field_change"),
    EventBinding::delegated(EventKind::Change, EMAIL_FIELD, "field_change"),
    EventBinding::delegated(EventKind::Change, PHONE_FIELD, "field_change"),
];

/// Guards the profile form. Fields the form does not have are not checked.
#[derive(Debug)]
pub struct ProfileFormValidator {
    root: NodeId,
}

impl ProfileFormValidator {
    pub const fn new(root: NodeId) -> Self {
        Self { root }
    }

    /// Validates every field present and renders the errors.
    pub fn validate_form(&self, doc: &mut Document) -> bool {
        clear_all_errors(doc, self.root);
        let mut valid = true;
        for (selector, rule) in FIELDS {
            if let Some(field) = doc.query(self.root, selector) {
                let result = rule(&doc.value(field));
                valid &= apply_result(doc, field, &result);
            }
        }
        tracing::debug!(valid, "profile form validated");
        valid
    }

    /// Validates a single field and shows or clears its error.
    pub fn validate_field(&self, doc: &mut Document, field: NodeId) -> bool {
        let Some((_, rule)) = FIELDS.iter().find(|(selector, _)| doc.is(field, selector)) else {
            return true;
        };
        let result = rule(&doc.value(field));
        apply_result(doc, field, &result)
    }

    fn on_submit(&self, ctx: &mut PageContext<'_>) -> EventResult {
        if !self.validate_form(ctx.doc) {
            tracing::debug!("profile update blocked");
            return EventResult::prevent();
        }
        if let Some(button) = ctx.doc.query(self.root, r#"button[type="submit"]"#) {
            ctx.doc.set_disabled(button, true);
            show_busy_label(ctx.doc, button, &gettext("Updating..."));
        }
        EventResult::proceed()
    }
}

impl Behavior for ProfileFormValidator {
    fn name(&self) -> &'static str {
        "profile_form"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn start(&mut self, _ctx: &mut PageContext<'_>) {}

    fn events(&self) -> &'static [EventBinding] {
        EVENTS
    }

    fn handle(&mut self, ctx: &mut PageContext<'_>, binding: &EventBinding, event: &Event) -> EventResult {
        match binding.handler {
            "submit" => self.on_submit(ctx),
            "field_change" => {
                self.validate_field(ctx.doc, event.current_target);
                EventResult::proceed()
            }
            _ => EventResult::proceed(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
