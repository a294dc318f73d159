//! Trademark comparison pipeline
//!
//! A request pairs one desired trademark with any number of registered ones.
//! Each pair is sent to the language model with the current instruction
//! document; replies are validated strictly and anything unusable is
//! replaced by a default record so the response shape never changes. The
//! riskiest pair determines the overall registration chance, and the
//! finished report is kept in a bounded store for later export.

pub mod fallback;
pub mod llm;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod risk;
pub mod service;
pub mod store;

pub use llm::{LanguageModel, OpenAiClient};
pub use models::{
    AnalysisReport, AnalyzeRequest, ComparisonResult, DesiredTrademark, RegisteredTrademark,
};
pub use risk::{ChanceOutlook, RiskLevel, calculate_registration_chance};
pub use service::{AnalysisService, PairOutcome};
pub use store::AnalysisStore;
