pub mod message;
pub mod process;
