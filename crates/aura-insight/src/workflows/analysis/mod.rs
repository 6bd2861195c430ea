//! Typed boundary to the external narrative generator.

mod gateway;
mod reasons;
mod report;

pub use gateway::{AnalysisError, AnalysisGateway, OfflineAnalysisGateway};
pub use reasons::{explain_recommendations, parse_reasons};
pub use report::{parse_analysis, strip_json_fences, AnalysisReport, AnalysisRequest};
