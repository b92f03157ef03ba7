//! Application-level configuration.
//!
//! [`CouncilConfig`] bundles the roster with each component's tuning
//! parameters; the parameter structs themselves live next to the
//! components they tune.

pub mod council_config;

pub use council_config::CouncilConfig;
