//! Integration test harness for `jolt-refactor`.
//!
//! All integration tests live under `tests/suite/` and compile into this one
//! test binary.

mod suite;
