#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod agent;
mod bitboard;
mod board;
mod common;
mod config;
mod constraint;
mod generator;
mod heatmap;
#[cfg(feature = "std")]
mod logging;
mod referee;
mod sampler;
mod selector;
mod ship;

pub use agent::*;
pub use bitboard::{BitBoard, BitBoardError, Mask};
pub use board::*;
pub use common::*;
pub use config::*;
pub use constraint::*;
pub use generator::*;
pub use heatmap::*;
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_with, LOG_ENV};
pub use referee::*;
pub use sampler::*;
pub use selector::*;
pub use ship::*;
