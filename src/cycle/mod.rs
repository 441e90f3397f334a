//! Poll cycle module
//!
//! Drives fetch, compare, report and deliver on a fixed cadence

mod driver;
mod schedule;

pub use driver::{CycleDriver, CycleOutcome, CycleState};
pub use schedule::{delay_until_next_slot, next_time_slot};
