//! The Ringgz board engine.
//!
//! A pure, synchronous model of one game's board: which rings sit on
//! which of the 25 fields, whether a placement is legal, when no legal
//! placement is left, and how the final board scores.
//!
//! # Key types
//!
//! - [`Board`]: the 5×5 grid plus the starting base
//! - [`Placement`]: a validated-in-range (field, color, format) triple
//! - [`Violation`]: which placement rule a rejected move broke
//! - [`score`] / [`GameResult`]: final standings from color ownership

mod board;
mod error;
mod scoring;
mod types;

pub use board::{Board, STARTING_BASE_FIELDS};
pub use error::{BoardError, Violation};
pub use scoring::{GameResult, color_points, score};
pub use types::{
    BOARD_SIDE, COLOR_COUNT, Color, FIELD_COUNT, FORMAT_COUNT, Format,
    Placement,
};
