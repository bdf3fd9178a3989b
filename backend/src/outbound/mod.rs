//! Outbound adapters implementing the domain's repository ports.
//!
//! - **memory**: process-local tables behind one mutex, used when no
//!   database is configured and by the behaviour tests
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
