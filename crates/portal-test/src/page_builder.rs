//! Building mounted pages on a fixed clock.
//!
//! ```
//! use portal_test::fixtures::pending_container;
//! use portal_test::page_builder::PageBuilder;
//! use std::time::Duration;
//!
//! let mut page = PageBuilder::new()
//!     .today("2024-01-10")
//!     .with(pending_container(Some("true")))
//!     .build();
//!
//! page.advance(Duration::from_secs(30));
//! assert_eq!(page.reload_count(), 1);
//! ```

use std::ops::{Deref, DerefMut};

use chrono::NaiveDateTime;
use portal_core::clock::FixedClock;
use portal_core::dates::{parse_date, parse_datetime};
use portal_core::settings::PortalSettings;
use portal_dom::{Document, ElementBuilder, NodeId};
use portal_widgets::{Page, Registry};

const DEFAULT_NOW: &str = "2024-01-10 12:00";

/// Assembles a document from fixtures and mounts the portal behaviors on it.
#[derive(Debug)]
pub struct PageBuilder {
    doc: Document,
    roots: Vec<NodeId>,
    now: NaiveDateTime,
    settings: PortalSettings,
    registry: Registry,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    /// Starts an empty page at noon on 2024-01-10 with default settings.
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            roots: Vec::new(),
            now: parse_datetime(DEFAULT_NOW).expect("valid default datetime"),
            settings: PortalSettings::default(),
            registry: Registry::default_portal(),
        }
    }

    /// Sets the clock to noon on `date`.
    ///
    /// # Panics
    ///
    /// Panics if `date` does not parse.
    #[must_use]
    pub fn today(self, date: &str) -> Self {
        let date = parse_date(date).unwrap_or_else(|| panic!("bad fixture date {date:?}"));
        self.now(&format!("{date} 12:00"))
    }

    /// Sets the clock to `datetime`.
    ///
    /// # Panics
    ///
    /// Panics if `datetime` does not parse.
    #[must_use]
    pub fn now(mut self, datetime: &str) -> Self {
        self.now = parse_datetime(datetime).unwrap_or_else(|| panic!("bad fixture datetime {datetime:?}"));
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: PortalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the behaviors to mount.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Appends a fixture to the body. Its root is available as
    /// [`TestPage::root`] in append order.
    #[must_use]
    pub fn with(mut self, fragment: ElementBuilder) -> Self {
        let body = self.doc.root();
        let root = self.doc.append_built(body, fragment);
        self.roots.push(root);
        self
    }

    /// Mounts the behaviors and returns the page.
    pub fn build(self) -> TestPage {
        let mut page = Page::new(self.doc)
            .with_settings(self.settings)
            .with_clock(FixedClock::new(self.now));
        let attached = page.mount(&self.registry);
        tracing::debug!(fixtures = self.roots.len(), attached, now = %self.now, "test page built");
        TestPage {
            page,
            roots: self.roots,
        }
    }
}

/// A mounted page plus the roots of its fixtures.
#[derive(Debug)]
pub struct TestPage {
    page: Page,
    roots: Vec<NodeId>,
}

impl TestPage {
    /// The root of the `index`-th fixture.
    ///
    /// # Panics
    ///
    /// Panics if fewer fixtures were added.
    pub fn root(&self, index: usize) -> NodeId {
        self.roots[index]
    }

    pub fn doc(&self) -> &Document {
        self.page.document()
    }

    /// The first element under the body matching `selector`.
    ///
    /// # Panics
    ///
    /// Panics if nothing matches.
    pub fn find(&self, selector: &str) -> NodeId {
        let doc = self.page.document();
        doc.query(doc.root(), selector)
            .unwrap_or_else(|| panic!("no element matches {selector:?}"))
    }

    /// Every element under the body matching `selector`.
    pub fn find_all(&self, selector: &str) -> Vec<NodeId> {
        let doc = self.page.document();
        doc.query_all(doc.root(), selector)
    }
}

impl Deref for TestPage {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl DerefMut for TestPage {
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.page
    }
}
