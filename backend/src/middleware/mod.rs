//! Request middleware for cross-cutting concerns: trace identifiers and the
//! origin whitelist.

pub mod origin;
pub mod trace;

pub use origin::OriginWhitelist;
pub use trace::Trace;
