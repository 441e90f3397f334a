//! Token report module
//!
//! Gathers spot and futures context for an asset whose borrow went up

mod builder;
mod listing;
mod types;

pub use builder::ReportBuilder;
pub use listing::PerpetualListing;
pub use types::{
    LongShortSection, MarginSection, ReportError, Section, TokenReport, VolumeSection,
};
