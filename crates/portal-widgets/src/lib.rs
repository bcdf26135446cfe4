//! # portal-widgets
//!
//! View behaviors for the borrower portal and the page runtime that drives
//! them. A [`Registry`] maps root selectors to behaviors; a [`Page`] mounts
//! them on a document, dispatches events, and advances virtual time for the
//! timers they schedule.
//!
//! ## Behaviors
//!
//! - [`book_table::BookTableEnhancer`] - urgency markers, status filter, search, sort
//! - [`extension_status::ExtensionStatusDecorator`] - status icons and request ages
//! - [`notifications::NotificationBanner`] - summary alerts above decorated tables
//! - [`extension_form::ExtensionRequestFormValidator`] - extension request validation and delayed submit
//! - [`profile_form::ProfileFormValidator`] - profile validation
//! - [`pending_poller::PendingPoller`] - reload while requests are pending
//!
//! ```
//! use portal_core::clock::FixedClock;
//! use portal_dom::{el, Document};
//! use portal_widgets::{Page, Registry};
//!
//! let mut doc = Document::new();
//! let body = doc.root();
//! let form = doc.append_built(
//!     body,
//!     el("form")
//!         .class("s_website_form")
//!         .attr("action", "/my/profile/update")
//!         .child(el("input").attr("name", "email").attr("value", "bad@")),
//! );
//!
//! let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let mut page = Page::new(doc).with_clock(FixedClock::on(today));
//! page.mount(&Registry::default_portal());
//! assert!(!page.submit(form));
//! assert!(page.submissions().is_empty());
//! ```

pub mod behavior;
pub mod book_table;
pub mod extension_form;
pub mod extension_status;
pub mod field_errors;
pub mod humanize;
pub mod notifications;
pub mod page;
pub mod pending_poller;
pub mod profile_form;
pub mod registry;
pub mod timers;

pub use behavior::{Behavior, Event, EventBinding, EventKind, EventResult, PageContext};
pub use page::{FormSubmission, Page};
pub use registry::Registry;
pub use timers::{Scheduler, TimerAction, TimerId};
