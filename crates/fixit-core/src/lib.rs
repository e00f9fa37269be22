//! Core types and the report query engine for the fixit reporting backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! is reached only through the [`store::ReportStore`] trait, which callers
//! inject into [`service::ReportService`].

pub mod details;
pub mod error;
pub mod lifecycle;
pub mod report;
pub mod service;
pub mod stats;
pub mod store;
pub mod timings;

pub use error::{Error, Result};
