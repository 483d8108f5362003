//! Chip drivers for the illumination module.

pub mod lm36011;
