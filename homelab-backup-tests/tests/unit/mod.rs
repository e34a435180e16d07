//! Unit tests for homelab-backup
//!
//! These tests exercise individual components against mocks.

mod batch;
mod config;
mod database;
mod shell;
