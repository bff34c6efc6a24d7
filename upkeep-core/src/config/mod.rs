//! Configuration types and the configuration file parser

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{parse_config, ParseError};
pub use types::*;
