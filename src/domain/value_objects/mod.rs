//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **Room codes**: short human-typeable room identifiers
//! - **StatsPeriod / TimeWindow**: statistics period selectors and the
//!   windows they resolve to

mod period;
mod room_code;

pub use period::*;
pub use room_code::*;
