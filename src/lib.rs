//! Cargo Quote Engine - underwriting decisions for cargo-insurance quotes
//!
//! This crate validates submitted quotes against configurable underwriting
//! rules, scores their risk, moves them through the quote lifecycle with
//! optimistic concurrency, and lapses quotes whose decision window closed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
