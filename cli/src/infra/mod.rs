//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: local process execution,
//! the SSH transport, session construction, and config persistence.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod session;
pub mod ssh;
pub mod target;
