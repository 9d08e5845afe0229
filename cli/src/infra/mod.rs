//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, package
//! and service management, git, the local filesystem and HTTP.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod apt;
pub mod clock;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod git;
pub mod host;
pub mod http;
pub mod systemd;
pub mod venv;
