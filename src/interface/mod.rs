pub mod cli;
pub mod window;
