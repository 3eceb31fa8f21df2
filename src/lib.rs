#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in the other modules
#[macro_use]
mod fmt;

pub mod cli;
pub mod config;
pub mod line;
pub mod radio;
pub mod tool;
pub mod tx;

#[cfg(feature = "embedded")]
pub mod board;
