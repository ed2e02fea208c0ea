//! Library side of the `riotfmt` command line tool
//!
//! The binary is a thin clap front end; conversion and logging setup live
//! here so they can be driven from tests.

pub mod commands;
pub mod logging;

pub use commands::{run, Mode, RunOptions, RunReport};
pub use logging::{init_logging, LogConfig, LogFormat};
