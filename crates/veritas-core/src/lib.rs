//! Veritas Core — Fundamental types shared by the credential trust and
//! predicate matching crates.

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use types::{parse_timestamp, Address, Timestamp};
