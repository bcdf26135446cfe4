//! Registration of behaviors against root selectors.
//!
//! A [`Registry`] is an ordered list of `(selector, factory)` pairs. When a
//! page mounts, every element matching a selector gets a fresh behavior from
//! the factory, in registration order. That order is also the start order,
//! so later behaviors observe the markup left by earlier ones.

use std::fmt;

use portal_dom::NodeId;

use crate::behavior::Behavior;
use crate::book_table::BookTableEnhancer;
use crate::extension_form::ExtensionRequestFormValidator;
use crate::extension_status::ExtensionStatusDecorator;
use crate::notifications::NotificationBanner;
use crate::pending_poller::PendingPoller;
use crate::profile_form::ProfileFormValidator;

/// Builds a behavior for a matched root element.
pub type BehaviorFactory = fn(NodeId) -> Box<dyn Behavior>;

/// One registered behavior.
#[derive(Clone)]
pub struct Registration {
    pub name: &'static str,
    pub selector: String,
    pub factory: BehaviorFactory,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of behavior registrations.
///
/// # Examples
///
/// ```
/// use portal_widgets::registry::Registry;
///
/// let registry = Registry::default_portal();
/// let names: Vec<&str> = registry.iter().map(|r| r.name).collect();
/// assert_eq!(names[0], "book_table");
/// assert_eq!(names.last(), Some(&"pending_poller"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a behavior for elements matching `selector`.
    ///
    /// Registering a name twice replaces the earlier entry in place.
    pub fn register(
        &mut self,
        name: &'static str,
        selector: &str,
        factory: BehaviorFactory,
    ) -> &mut Self {
        let registration = Registration {
            name,
            selector: selector.to_string(),
            factory,
        };
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            *entry = registration;
        } else {
            self.entries.push(registration);
        }
        self
    }

    /// Removes the registration with the given name.
    ///
    /// Returns `true` if a registration was found and removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() < before
    }

    /// Returns the registrations in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.iter()
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The six portal behaviors, in the order the portal starts them.
    pub fn default_portal() -> Self {
        let mut registry = Self::new();
        registry
            .register("book_table", ".o_portal_my_doc_table", |root| {
                Box::new(BookTableEnhancer::new(root))
            })
            .register("extension_status", ".extension-request-table", |root| {
                Box::new(ExtensionStatusDecorator::new(root))
            })
            .register(
                "notification_banner",
                ".o_portal_my_doc_table, .extension-request-table",
                |root| Box::new(NotificationBanner::new(root)),
            )
            .register(
                "extension_form",
                r#"#extension_request_form, form.s_website_form:not([action*="profile"])"#,
                |root| Box::new(ExtensionRequestFormValidator::new(root)),
            )
            .register(
                "profile_form",
                r#"form.s_website_form[action*="profile"]"#,
                |root| Box::new(ProfileFormValidator::new(root)),
            )
            .register("pending_poller", ".auto-refresh-pending", |root| {
                Box::new(PendingPoller::new(root))
            });
        registry
    }
}
