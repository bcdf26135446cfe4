//! The page runtime: one document, its attached behaviors, and their timers.

use std::time::Duration;

use portal_core::clock::{Clock, SystemClock};
use portal_core::logging::behavior_span;
use portal_core::settings::PortalSettings;
use portal_dom::{Document, NodeId, Selector};
use serde::Serialize;

use crate::behavior::{Behavior, Event, EventKind, PageContext};
use crate::notifications;
use crate::registry::Registry;
use crate::timers::{Scheduler, TimerAction};

/// A native form submission, as the browser would post it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    #[serde(skip)]
    pub form: NodeId,
    pub action: String,
    pub method: String,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// Collects the named, enabled controls of `form`.
    pub fn collect(doc: &Document, form: NodeId) -> Self {
        let fields = doc
            .query_all(form, "input[name], textarea[name], select[name]")
            .into_iter()
            .filter(|&control| !doc.is_disabled(control))
            .filter(|&control| {
                let checkable = matches!(doc.attr(control, "type"), Some("checkbox" | "radio"));
                !checkable || doc.has_attr(control, "checked")
            })
            .filter_map(|control| {
                let name = doc.attr(control, "name")?.to_string();
                Some((name, doc.value(control)))
            })
            .collect();
        Self {
            form,
            action: doc.attr(form, "action").unwrap_or_default().to_string(),
            method: doc
                .attr(form, "method")
                .unwrap_or("get")
                .to_ascii_lowercase(),
            fields,
        }
    }

    /// Returns the first submitted value for `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A rendered page with behaviors attached.
///
/// ```
/// use std::time::Duration;
/// use portal_dom::{el, Document};
/// use portal_widgets::{Page, Registry};
///
/// let mut doc = Document::new();
/// let root = doc.root();
/// doc.append_built(root, el("div").class("auto-refresh-pending").data("has-pending", "1"));
///
/// let mut page = Page::new(doc);
/// page.mount(&Registry::default_portal());
/// page.advance(Duration::from_secs(30));
/// assert_eq!(page.reload_count(), 1);
/// ```
#[derive(Debug)]
pub struct Page {
    doc: Document,
    settings: PortalSettings,
    clock: Box<dyn Clock>,
    scheduler: Scheduler,
    behaviors: Vec<Box<dyn Behavior>>,
    mounted: bool,
    submissions: Vec<FormSubmission>,
    reloads: usize,
}

impl Page {
    /// Wraps a rendered document, using default settings and the system clock.
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            settings: PortalSettings::default(),
            clock: Box::new(SystemClock),
            scheduler: Scheduler::new(),
            behaviors: Vec::new(),
            mounted: false,
            submissions: Vec::new(),
            reloads: 0,
        }
    }

    /// Replaces the settings. Takes effect for behaviors mounted afterwards.
    #[must_use]
    pub fn with_settings(mut self, settings: PortalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub const fn settings(&self) -> &PortalSettings {
        &self.settings
    }

    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Attaches every registered behavior to every element matching its
    /// selector and starts it. Returns the number of behaviors attached.
    ///
    /// Mounting is done once per page life; later calls attach nothing.
    pub fn mount(&mut self, registry: &Registry) -> usize {
        if self.mounted {
            tracing::debug!("page already mounted");
            return 0;
        }
        self.mounted = true;

        let Self {
            doc,
            settings,
            clock,
            scheduler,
            behaviors,
            ..
        } = self;
        let mut ctx = PageContext {
            doc,
            settings,
            clock: clock.as_ref(),
            scheduler,
        };

        let before = behaviors.len();
        for registration in registry.iter() {
            let page_root = ctx.doc.root();
            for root in ctx.doc.query_all(page_root, &registration.selector) {
                let mut behavior = (registration.factory)(root);
                let span = behavior_span(behavior.name(), root.index());
                let _guard = span.enter();
                behavior.start(&mut ctx);
                tracing::debug!("behavior started");
                behaviors.push(behavior);
            }
        }
        let attached = behaviors.len() - before;
        tracing::info!(attached, "page mounted");
        attached
    }

    /// Fires an event at `target` and runs the default action unless a
    /// handler prevented it. Returns whether the default action proceeded.
    pub fn dispatch(&mut self, kind: EventKind, target: NodeId) -> bool {
        let Self {
            doc,
            settings,
            clock,
            scheduler,
            behaviors,
            ..
        } = self;
        let mut ctx = PageContext {
            doc,
            settings,
            clock: clock.as_ref(),
            scheduler,
        };

        let mut prevented = false;
        for behavior in behaviors.iter_mut() {
            let root = behavior.root();
            let scopes = behavior.scopes();
            for binding in behavior.events().iter().filter(|b| b.kind == kind) {
                let current_target = match binding.selector {
                    None => ctx.doc.contains(root, target).then_some(root),
                    Some(selector) => match Selector::parse(selector) {
                        Ok(selector) => scopes
                            .iter()
                            .filter(|&&scope| ctx.doc.contains(scope, target))
                            .find_map(|&scope| ctx.doc.closest_within(target, &selector, scope)),
                        Err(err) => {
                            tracing::warn!(handler = binding.handler, error = %err, "bad binding selector");
                            None
                        }
                    },
                };
                let Some(current_target) = current_target else {
                    continue;
                };

                let span = behavior_span(behavior.name(), root.index());
                let _guard = span.enter();
                tracing::trace!(event = %kind, handler = binding.handler, "dispatching");
                let event = Event {
                    kind,
                    target,
                    current_target,
                };
                prevented |= behavior.handle(&mut ctx, binding, &event).prevent_default;
            }
        }

        if prevented {
            tracing::debug!(event = %kind, "default action prevented");
            return false;
        }
        self.default_action(kind, target);
        true
    }

    fn default_action(&mut self, kind: EventKind, target: NodeId) {
        match kind {
            EventKind::Submit if self.doc.tag(target) == Some("form") => {
                self.record_submission(target);
            }
            EventKind::Click => {
                if notifications::dismiss_alert(&mut self.doc, target) {
                    return;
                }
                if let Some(form) = self.submit_button_form(target) {
                    self.dispatch(EventKind::Submit, form);
                }
            }
            _ => {}
        }
    }

    fn submit_button_form(&self, target: NodeId) -> Option<NodeId> {
        let is_submit = match self.doc.tag(target)? {
            "button" => self.doc.attr(target, "type").unwrap_or("submit") == "submit",
            "input" => self.doc.attr(target, "type") == Some("submit"),
            _ => false,
        };
        if !is_submit {
            return None;
        }
        self.doc
            .ancestors(target)
            .into_iter()
            .find(|&node| self.doc.tag(node) == Some("form"))
    }

    fn record_submission(&mut self, form: NodeId) {
        let submission = FormSubmission::collect(&self.doc, form);
        tracing::info!(action = %submission.action, method = %submission.method, "form submitted");
        self.submissions.push(submission);
    }

    /// Clicks an element. Disabled controls receive no click.
    pub fn click(&mut self, target: NodeId) -> bool {
        if self.doc.is_disabled(target) {
            tracing::debug!(target = target.index(), "click on disabled control ignored");
            return false;
        }
        self.dispatch(EventKind::Click, target)
    }

    /// Sets a control's value and fires `input`.
    pub fn input(&mut self, target: NodeId, value: &str) -> bool {
        self.doc.set_value(target, value);
        self.dispatch(EventKind::Input, target)
    }

    /// Sets a control's value and fires `change`.
    pub fn change(&mut self, target: NodeId, value: &str) -> bool {
        self.doc.set_value(target, value);
        self.dispatch(EventKind::Change, target)
    }

    /// Sets a control's value and fires `keyup`.
    pub fn keyup(&mut self, target: NodeId, value: &str) -> bool {
        self.doc.set_value(target, value);
        self.dispatch(EventKind::KeyUp, target)
    }

    /// Fires `submit` on a form.
    pub fn submit(&mut self, form: NodeId) -> bool {
        self.dispatch(EventKind::Submit, form)
    }

    /// Advances virtual time and performs every timer action that fell due.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerAction> {
        let fired = self.scheduler.advance(by);
        for action in &fired {
            match *action {
                TimerAction::SubmitForm(form) => self.record_submission(form),
                TimerAction::ReloadPage => {
                    self.reloads += 1;
                    tracing::info!(reloads = self.reloads, "page reload");
                }
            }
        }
        fired
    }

    /// Native form submissions performed so far.
    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    /// How many times the page asked to be reloaded.
    pub const fn reload_count(&self) -> usize {
        self.reloads
    }

    /// The attached behaviors, in start order.
    pub fn behaviors(&self) -> &[Box<dyn Behavior>] {
        &self.behaviors
    }

    /// Returns the first attached behavior of type `T`.
    pub fn behavior<T: Behavior>(&self) -> Option<&T> {
        self.behaviors
            .iter()
            .find_map(|b| b.as_any().downcast_ref::<T>())
    }

    /// Returns the attached behavior of type `T` whose root is `root`.
    pub fn behavior_at<T: Behavior>(&self, root: NodeId) -> Option<&T> {
        self.behaviors
            .iter()
            .filter(|b| b.root() == root)
            .find_map(|b| b.as_any().downcast_ref::<T>())
    }
}
