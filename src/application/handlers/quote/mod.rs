//! Quote command handlers.

mod audit;
mod process_quote;
mod sweep_expired_quotes;

pub use process_quote::{DecisionResult, ProcessQuoteCommand, ProcessQuoteHandler};
pub use sweep_expired_quotes::{SweepExpiredQuotesHandler, SweepReport};
