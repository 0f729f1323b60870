pub mod parser;

pub use parser::{load, parse, SupervisorConfig};
