//! Configuration helpers shared by the CLI options.

pub mod duration;

pub use duration::parse_duration;
