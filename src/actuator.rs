mod gateway;
mod kind;
mod profile;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use gateway::*;
pub use kind::*;
pub use profile::*;
pub use transport::*;
