//! Nova Gateway - voice-driven customer support
//!
//! This library provides the core functionality for the Nova gateway:
//! - Voice processing (utterance segmentation, STT, TTS)
//! - The tool-augmented conversational dispatch loop
//! - Lookup tools over the local product/order/policy database
//! - Catalog ingestion from JSON and PDF sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │     Microphone/Speaker  │  HTTP API (dashboard)     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Nova Gateway                        │
//! │   Daemon  │  Segmenter  │  STT/TTS  │  Agent        │
//! └──────────┬──────────────────────────┬───────────────┘
//!            │                          │
//! ┌──────────▼───────────┐   ┌──────────▼───────────────┐
//! │  Hosted LLM (tools)  │   │  SQLite support catalog  │
//! └──────────────────────┘   └──────────────────────────┘
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod daemon;
pub mod db;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod tools;
pub mod voice;

pub use agent::{build_system_prompt, SupportAgent, AGENT_NAME};
pub use config::Config;
pub use daemon::Daemon;
pub use db::{DbConn, DbPool};
pub use error::{Error, Result};
pub use ingest::{IngestSummary, Ingestor};
pub use llm::{ChatClient, RetryPolicy};
pub use tools::ToolExecutor;
