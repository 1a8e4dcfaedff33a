//! Quote domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Quote aggregate and the transitions it accepts
//! - `errors` - Errors surfaced by the decision and expiration handlers
//! - `values` - Shipment value objects (cargo, value, route, coverage)

mod aggregate;
mod errors;
mod values;

pub use aggregate::{Quote, QuoteTransition, DEFAULT_REJECTION_REASON};
pub use errors::QuoteError;
pub use values::{CargoCategory, CoveragePeriod, Location, Shipment, ShipmentValue, TransportMode};
