//! # portal-test
//!
//! Testing utilities for the borrower portal: markup fixtures shaped like the
//! server-rendered portal pages, a [`PageBuilder`](page_builder::PageBuilder)
//! that mounts the behaviors on a fixed clock, and assertion helpers.

pub mod assertions;
pub mod fixtures;
pub mod page_builder;

pub use page_builder::{PageBuilder, TestPage};
