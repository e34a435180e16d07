//! Command-level tests
//!
//! Local and cloud workflows end to end, with containers and restic mocked and
//! the filesystem real.

mod cloud;
mod local;
