//! Test utilities and fixture types for Braid development.
//!
//! Provides instrumented element types for validating container
//! lifecycle behavior: [`DropTally`] counts constructions and drops,
//! [`Tallied`] is an element wrapper that reports to one.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{DropTally, Tallied};
