//! Inbound traffic handling for grafana-copilot.
//!
//! This module provides functionality for handling robot callbacks:
//! - The webhook endpoint that authenticates and decodes callbacks
//! - Command dispatch that turns a callback into a reply

pub mod command;
pub mod webhook;
