mod metric;
mod profile;
mod raw_number;
mod registry;
mod sample;

pub use metric::*;
pub use profile::*;
pub use raw_number::*;
pub use registry::*;
pub use sample::*;
