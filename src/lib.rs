//! LED illumination module library.
//!
//! Exposes the LM36011 driver, the command-processing controller and the
//! bus adapters for integration testing.  Linux-only hardware bring-up
//! is guarded by the `linux` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
