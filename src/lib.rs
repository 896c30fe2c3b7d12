//! Vocabulary flashcard rendering.
//!
//! [`dashscope`] acquires a generated background through DashScope's async
//! text2image tasks; [`layout`] fits the headword, meaning and example sentence
//! onto it and scores how legible the result is. [`pipeline::CardRenderer`]
//! wires the two together for one card.

pub mod artifact;
pub mod config;
pub mod dashscope;
pub mod error;
pub mod layout;
pub mod logger;
pub mod models;
pub mod pipeline;

pub use artifact::SavedCard;
pub use config::{CardConfig, DashScopeConfig, LayoutConfig, ScoringConfig};
pub use dashscope::{DashScopeBackend, DashScopeClient, ImageClient, TaskBackend};
pub use error::{CardError, Result};
pub use layout::{FixedMetricFontProvider, FontProvider, LayoutEngine, SystemFontProvider};
pub use models::*;
pub use pipeline::CardRenderer;
