//! The grab-bag of stuff every tool in this repo needs: logging setup, phase
//! timing, and pretty-printing.

#[macro_use]
extern crate log;

pub mod logger;
mod time;

pub use crate::time::{elapsed_seconds, prettyprint_time, prettyprint_usize, Timer};
