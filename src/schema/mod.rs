mod benchmark;
mod config;
mod persist;
mod policy;
mod results;

pub use benchmark::*;
pub use config::*;
pub use persist::*;
pub use policy::*;
pub use results::*;
