//! Input discovery for a project directory.

mod scan;

pub use scan::{discover_inputs, has_extension, DiscoveredInputs, DiscoveryError, DiscoveryResult};
