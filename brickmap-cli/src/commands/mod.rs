//! Command implementations for the brickmap CLI

pub mod bricks;
pub mod density;
