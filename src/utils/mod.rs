//! Utility functions and helpers for the code-translator relay.
//!
//! This module provides cross-cutting concerns like structured logging and
//! API key redaction.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization with security filters.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
