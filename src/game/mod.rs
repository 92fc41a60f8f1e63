// Sandbox game layer
//
// - `config`: typed configuration with defaults and TOML loading
// - `softbody`: mass-spring lattice generator
// - `sandbox`: world setup and input handling

pub mod config;
pub mod sandbox;
pub mod softbody;

// Re-export commonly used types
pub use config::{ConfigError, SimulationConfig};
pub use sandbox::Sandbox;
pub use softbody::{SoftBody, SoftBodyConfig};
