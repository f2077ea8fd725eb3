// Analyzer module: EMA engine, signal classification and the report builder.

pub mod ema;
pub mod signal;
pub mod price_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use price_analysis::{Analyzer, AnalyzerImpl};
