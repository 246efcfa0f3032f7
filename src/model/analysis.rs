//! Analysis job record and its step state machine
//!
//! An analysis walks `pending → running(ingest) → running(claims) →
//! running(risk) → running(response) → done`. Any step may divert to
//! `error`, which like `done` is terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::options::{Audience, Platform, Region, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Url,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Url => "url",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(InputType::Text),
            "url" => Some(InputType::Url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    Running,
    Error,
    Done,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Running => "running",
            AnalysisStatus::Error => "error",
            AnalysisStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AnalysisStatus::Pending),
            "running" => Some(AnalysisStatus::Running),
            "error" => Some(AnalysisStatus::Error),
            "done" => Some(AnalysisStatus::Done),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Error | AnalysisStatus::Done)
    }
}

/// Pipeline stage identifiers, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Ingest,
    Claims,
    Risk,
    Response,
}

impl PipelineStep {
    /// Fixed stage order; `completed_steps` is always a prefix of this
    pub const ORDER: [PipelineStep; 4] = [
        PipelineStep::Ingest,
        PipelineStep::Claims,
        PipelineStep::Risk,
        PipelineStep::Response,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::Ingest => "ingest",
            PipelineStep::Claims => "claims",
            PipelineStep::Risk => "risk",
            PipelineStep::Response => "response",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ingest" => Some(PipelineStep::Ingest),
            "claims" => Some(PipelineStep::Claims),
            "risk" => Some(PipelineStep::Risk),
            "response" => Some(PipelineStep::Response),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Harm-weighted risk rating; ordering is `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// High and critical claims raise analysis-level red flags
    pub fn is_red_flag(&self) -> bool {
        *self >= Severity::High
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("analysis is terminal ({0:?})")]
    Terminal(AnalysisStatus),

    #[error("step {requested} cannot start; expected {expected:?}")]
    OutOfOrder {
        requested: PipelineStep,
        expected: Option<PipelineStep>,
    },

    #[error("step {0} is not the current step")]
    NotCurrent(PipelineStep),

    #[error("analysis finished with {completed} of 4 steps completed")]
    Incomplete { completed: usize },
}

/// One unit of work: a single input run through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Analysis {
    pub id: Uuid,
    pub input_type: InputType,
    pub input_text: String,
    pub input_url: Option<String>,
    pub region: Region,
    pub tone: Tone,
    pub audience: Audience,
    pub platform: Platform,
    pub status: AnalysisStatus,
    pub current_step: Option<PipelineStep>,
    pub completed_steps: Vec<PipelineStep>,
    /// Output of the ingest step, kept so later steps resume from durable state
    pub canonical_text: Option<String>,
    pub overall_severity: Option<Severity>,
    pub red_flags_detected: bool,
    pub red_flags: Vec<String>,
    pub topics: Vec<String>,
    pub disclaimer: Option<String>,
    pub what_is_wrong: Option<String>,
    pub what_we_know: Option<String>,
    pub what_to_do: Option<String>,
    pub when_to_seek_care: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Analysis {
    pub fn new(
        input_type: InputType,
        input_text: String,
        input_url: Option<String>,
        region: Region,
        tone: Tone,
        audience: Audience,
        platform: Platform,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_type,
            input_text,
            input_url,
            region,
            tone,
            audience,
            platform,
            status: AnalysisStatus::Pending,
            current_step: None,
            completed_steps: Vec::new(),
            canonical_text: None,
            overall_severity: None,
            red_flags_detected: false,
            red_flags: Vec::new(),
            topics: Vec::new(),
            disclaimer: None,
            what_is_wrong: None,
            what_we_know: None,
            what_to_do: None,
            when_to_seek_care: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// The step that must run next, or `None` once every step has completed
    pub fn next_step(&self) -> Option<PipelineStep> {
        PipelineStep::ORDER.get(self.completed_steps.len()).copied()
    }

    /// Move into `step`; only the next step in order may begin
    pub fn begin_step(&mut self, step: PipelineStep) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        let expected = self.next_step();
        if expected != Some(step) {
            return Err(TransitionError::OutOfOrder {
                requested: step,
                expected,
            });
        }
        self.status = AnalysisStatus::Running;
        self.current_step = Some(step);
        Ok(())
    }

    /// Record `step` as completed; its output must already be durable
    pub fn complete_step(&mut self, step: PipelineStep) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        if self.current_step != Some(step) || self.next_step() != Some(step) {
            return Err(TransitionError::NotCurrent(step));
        }
        self.completed_steps.push(step);
        debug_assert_eq!(
            self.completed_steps[step.index()],
            PipelineStep::ORDER[step.index()]
        );
        Ok(())
    }

    /// Terminal success; requires every step to have completed
    pub fn finish(&mut self) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        if self.completed_steps.len() != PipelineStep::ORDER.len() {
            return Err(TransitionError::Incomplete {
                completed: self.completed_steps.len(),
            });
        }
        self.status = AnalysisStatus::Done;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Terminal failure at `step`. Completed steps and their outputs are kept.
    pub fn fail(&mut self, step: PipelineStep, message: String) {
        if self.status.is_terminal() {
            return;
        }
        self.status = AnalysisStatus::Error;
        self.current_step = Some(step);
        self.error_message = Some(message);
        self.completed_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> Analysis {
        Analysis::new(
            InputType::Text,
            "Antibiotics cure colds".to_string(),
            None,
            Region::default(),
            Tone::default(),
            Audience::default(),
            Platform::default(),
        )
    }

    #[test]
    fn test_full_walk_reaches_done() {
        let mut a = analysis();
        assert_eq!(a.status, AnalysisStatus::Pending);

        for step in PipelineStep::ORDER {
            a.begin_step(step).unwrap();
            assert_eq!(a.status, AnalysisStatus::Running);
            assert_eq!(a.current_step, Some(step));
            a.complete_step(step).unwrap();
        }
        a.finish().unwrap();

        assert_eq!(a.status, AnalysisStatus::Done);
        assert_eq!(a.completed_steps, PipelineStep::ORDER.to_vec());
        assert!(a.completed_at.is_some());
    }

    #[test]
    fn test_cannot_skip_a_step() {
        let mut a = analysis();
        let err = a.begin_step(PipelineStep::Claims).unwrap_err();
        assert_eq!(
            err,
            TransitionError::OutOfOrder {
                requested: PipelineStep::Claims,
                expected: Some(PipelineStep::Ingest),
            }
        );
        assert!(a.completed_steps.is_empty());
    }

    #[test]
    fn test_cannot_complete_step_twice() {
        let mut a = analysis();
        a.begin_step(PipelineStep::Ingest).unwrap();
        a.complete_step(PipelineStep::Ingest).unwrap();
        assert!(a.complete_step(PipelineStep::Ingest).is_err());
        assert_eq!(a.completed_steps, vec![PipelineStep::Ingest]);
    }

    #[test]
    fn test_failure_keeps_completed_prefix() {
        let mut a = analysis();
        a.begin_step(PipelineStep::Ingest).unwrap();
        a.complete_step(PipelineStep::Ingest).unwrap();
        a.begin_step(PipelineStep::Claims).unwrap();
        a.fail(PipelineStep::Claims, "claims: extraction failed".to_string());

        assert_eq!(a.status, AnalysisStatus::Error);
        assert_eq!(a.current_step, Some(PipelineStep::Claims));
        assert_eq!(a.completed_steps, vec![PipelineStep::Ingest]);

        // terminal analyses are immutable
        assert_eq!(
            a.begin_step(PipelineStep::Risk),
            Err(TransitionError::Terminal(AnalysisStatus::Error))
        );
        a.fail(PipelineStep::Risk, "other".to_string());
        assert_eq!(a.error_message.as_deref(), Some("claims: extraction failed"));
    }

    #[test]
    fn test_finish_requires_all_steps() {
        let mut a = analysis();
        a.begin_step(PipelineStep::Ingest).unwrap();
        a.complete_step(PipelineStep::Ingest).unwrap();
        assert_eq!(a.finish(), Err(TransitionError::Incomplete { completed: 1 }));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(
            [Severity::Medium, Severity::Critical, Severity::Low]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
        assert!(Severity::High.is_red_flag());
        assert!(!Severity::Medium.is_red_flag());
    }
}
