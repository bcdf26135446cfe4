//! The contract between the page runtime and a view behavior.
//!
//! A behavior is attached to one root element. It gets a single
//! [`start`](Behavior::start) call after attachment and afterwards reacts to
//! the events it declares through [`events`](Behavior::events). Bindings are
//! delegated: a binding with a selector fires when the event target is, or
//! lies inside, an element matching the selector within the behavior's scope.

use std::any::Any;
use std::fmt;

use portal_core::clock::Clock;
use portal_core::settings::PortalSettings;
use portal_dom::{Document, NodeId};

use crate::timers::Scheduler;

/// The DOM events behaviors can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Change,
    KeyUp,
    Submit,
}

impl EventKind {
    /// Returns the DOM event name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Change => "change",
            Self::KeyUp => "keyup",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares that a behavior handles one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBinding {
    pub kind: EventKind,
    /// Delegation selector; `None` binds to the root element itself.
    pub selector: Option<&'static str>,
    /// Name passed back to [`Behavior::handle`] to pick the handler.
    pub handler: &'static str,
}

impl EventBinding {
    /// Binds events on elements matching `selector` inside the root.
    pub const fn delegated(kind: EventKind, selector: &'static str, handler: &'static str) -> Self {
        Self {
            kind,
            selector: Some(selector),
            handler,
        }
    }

    /// Binds events on the root element.
    pub const fn on_root(kind: EventKind, handler: &'static str) -> Self {
        Self {
            kind,
            selector: None,
            handler,
        }
    }
}

/// An event being delivered to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// The element the event was fired on.
    pub target: NodeId,
    /// The element the binding matched: the root, or the nearest ancestor of
    /// the target matching the delegation selector.
    pub current_target: NodeId,
}

/// What a handler asks of the page after running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResult {
    pub prevent_default: bool,
}

impl EventResult {
    /// Lets the default action proceed.
    pub const fn proceed() -> Self {
        Self {
            prevent_default: false,
        }
    }

    /// Cancels the default action, like `event.preventDefault()`.
    pub const fn prevent() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// Everything a behavior may touch while it runs.
pub struct PageContext<'a> {
    pub doc: &'a mut Document,
    pub settings: &'a PortalSettings,
    pub clock: &'a dyn Clock,
    pub scheduler: &'a mut Scheduler,
}

impl fmt::Debug for PageContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("nodes", &self.doc.len())
            .field("clock", &self.clock)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// A view behavior attached to one root element.
pub trait Behavior: fmt::Debug + 'static {
    /// A short identifier used in logs.
    fn name(&self) -> &'static str;

    /// The element this behavior is attached to.
    fn root(&self) -> NodeId;

    /// Elements whose descendants delegated bindings listen on.
    ///
    /// Defaults to the root. Behaviors that insert controls outside their
    /// root list those here so the controls stay live.
    fn scopes(&self) -> Vec<NodeId> {
        vec![self.root()]
    }

    /// Runs once, right after the behavior is attached.
    fn start(&mut self, ctx: &mut PageContext<'_>);

    /// The events this behavior listens to.
    fn events(&self) -> &'static [EventBinding] {
        &[]
    }

    /// Handles one event matched by `binding`.
    fn handle(
        &mut self,
        _ctx: &mut PageContext<'_>,
        _binding: &EventBinding,
        _event: &Event,
    ) -> EventResult {
        EventResult::proceed()
    }

    /// Allows the page to hand out typed references to attached behaviors.
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::KeyUp.to_string(), "keyup");
        assert_eq!(EventKind::Submit.as_str(), "submit");
    }

    #[test]
    fn test_binding_constructors() {
        let b = EventBinding::delegated(EventKind::Click, ".filter-status", "filter");
        assert_eq!(b.selector, Some(".filter-status"));
        let r = EventBinding::on_root(EventKind::Submit, "submit");
        assert_eq!(r.selector, None);
    }

    #[test]
    fn test_event_result_default_proceeds() {
        assert_eq!(EventResult::default(), EventResult::proceed());
        assert!(EventResult::prevent().prevent_default);
    }
}
