//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Vector, matrix and color types
//! - Float rectangles
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
pub mod rect;

pub use math::{Color, Mat3, Quad, Vec2};
pub use rect::RectF;
