//! Address-to-timezone resolution backed by an external maps provider.
//!
//! The pipeline turns one-or-many postal addresses into geographic
//! coordinates and then into IANA timezone identifiers, carrying every
//! expected failure as a value rather than a raised error. A separate
//! service converts wall-clock times between two named timezones.

pub mod api;
pub mod config;
pub mod location;
pub mod server;
pub mod timezone;
