//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller and
//! LM36011 driver together against the journaling mocks in `mock_hw`.
//! All tests run on the host with no real hardware required.

mod controller_tests;
mod shutdown_tests;
