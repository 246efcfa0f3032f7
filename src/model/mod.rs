pub mod analysis;
pub mod claims;
pub mod config;
pub mod options;
pub mod outputs;
pub mod report;
pub mod request;
pub mod source;

pub use analysis::{Analysis, AnalysisStatus, InputType, PipelineStep, Severity, TransitionError};
pub use claims::{Citation, Claim, ClaimDraft, ClaimType, ClaimWithCitations, Stance, UrgencyHint};
pub use config::{Config, PipelineConfig, RetrieverConfig};
pub use options::{Audience, Platform, Region, Tone};
pub use outputs::{GeneratedOutput, OutputFormat, OutputLength, variant_matrix};
pub use report::{AnalysisReport, Feedback};
pub use request::{AnalysisRequest, InputError};
pub use source::SourceDocument;
