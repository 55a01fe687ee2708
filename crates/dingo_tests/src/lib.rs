//! End-to-end test harness for the dingo pipeline.
//!
//! All tests live in `tests/`; this library target exists so the crate
//! can be built and listed as a workspace member.
