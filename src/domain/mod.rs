//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, status, errors)
//! - `quote` - Quote aggregate and shipment value objects
//! - `underwriting` - Pure validation, risk scoring and decision mapping
//! - `audit` - Append-only audit trail entries

pub mod audit;
pub mod foundation;
pub mod quote;
pub mod underwriting;
