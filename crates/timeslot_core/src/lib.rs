//! Set algebra over half-open time slots.
//! Builds availability/booking views by subtracting, intersecting and
//! merging ordered slot collections.

pub mod grid;
pub mod logging;
pub mod model;
pub mod set;

pub use grid::config::{parse_iso_duration, GridConfig};
pub use grid::generator::{make_aligned_grid, make_grid, GridError, GridResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{Record, END_KEY, START_KEY};
pub use model::slot::{format_instant, Instant, Payload, Slot, SlotError, SlotResult};
pub use set::slot_set::SlotSet;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
