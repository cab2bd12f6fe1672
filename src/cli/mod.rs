mod interactive;
mod replay;
mod root;

pub use root::Cli;
