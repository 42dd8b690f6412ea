//! BotForge - dataset ingestion and AI-assisted retrieval
//!
//! Loads sample public datasets into a vector-enabled document store, embeds
//! every record through the Gemini API and answers natural-language questions
//! over them. A best-effort statistics endpoint summarizes stored documents.

pub mod analysis;
pub mod assistant;
pub mod config;
pub mod context;
pub mod datasets;
pub mod error;
pub mod genai;
pub mod ingest;
pub mod server;
pub mod store;
