mod band;
mod classifier;
mod forecast;
mod trend;

pub use band::*;
pub use classifier::*;
pub use forecast::*;
pub use trend::*;
