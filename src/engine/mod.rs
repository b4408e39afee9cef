mod command;
mod reducer;

pub use command::Command;
pub use reducer::reduce;
