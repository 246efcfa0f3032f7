pub mod cache;
pub mod cache_keys;
pub mod claims;
pub mod evidence;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod response;
pub mod text;

pub use cache::AnalysisCache;
pub use claims::ClaimExtractionService;
pub use evidence::EvidenceMatcher;
pub use ingest::Ingestor;
pub use pipeline::{AnalysisPipeline, PipelineError};
pub use response::ResponseGenerator;
