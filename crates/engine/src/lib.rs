pub mod align;
pub mod bench; // profiling utilities
pub mod extract;
pub mod numeric;
pub mod runner;
pub mod scalar;
pub mod sweep;
pub mod synthetic;
pub mod theory;
