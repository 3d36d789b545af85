//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Accuracy tracker state machine tests

#[cfg(test)]
mod tracker_tests;
