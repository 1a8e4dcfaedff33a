//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod quote;

pub use quote::{
    DecisionResult, ProcessQuoteCommand, ProcessQuoteHandler, SweepExpiredQuotesHandler,
    SweepReport,
};
