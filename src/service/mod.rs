//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by grafana-copilot:
//! - Chat services (e.g., the Infoflow robot webhook)
//! - Dashboard catalogs (e.g., Grafana)
//! - LLM services (e.g., OpenAI-compatible endpoints)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod dashboard;
pub mod llm;
