//! Test infrastructure
//!
//! Docker-managed MySQL servers for the integration tests under `tests/`.

pub mod container;

pub use container::MySQLContainer;
