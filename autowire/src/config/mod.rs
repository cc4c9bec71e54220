// src/config/mod.rs
// Loading container bindings from a YAML document.

pub mod de; // YAML to engine value conversion
pub mod processed; // The validated configuration applied to a container
pub mod raw; // Structs directly mapping to the YAML structure

pub use processed::ContainerConfig;
