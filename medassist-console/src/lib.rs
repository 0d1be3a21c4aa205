pub mod commands;
pub mod session;

pub use commands::{Command, CommandError, parse};
pub use session::{Console, Flow};
