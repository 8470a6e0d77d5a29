//! paperflow - document digitization pipeline.
//!
//! Coordinates scanner discovery, image acquisition, OCR text extraction
//! with heuristic metadata classification, and archive-reference
//! sequencing for physical-to-digital record conversion.
//!
//! The surrounding record-management system participates through three
//! collaborator seams: an authorization service ([`auth::Authorizer`]),
//! a document store ([`store::DocumentStore`]), and an audit sink
//! ([`audit::AuditSink`]).

pub mod archive;
pub mod audit;
pub mod auth;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod models;
pub mod ocr;
pub mod scanner;
pub mod services;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
