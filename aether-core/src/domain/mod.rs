//! Domain types for Aether

pub mod bar;
pub mod period;
pub mod source;

pub use bar::{Bar, OhlcvSeries};
pub use period::{ParsePeriodError, Period};
pub use source::{DataSource, ParseSourceError, ProviderId, SourcePreference};
