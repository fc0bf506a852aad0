//! Scenario tests for the stepping engine and sweeps.
//!
//! Unit tests for rule parsing, configuration and the rate schedule live
//! next to their modules; these cover cross-module behavior of full runs.

mod simulation;
