use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    SocialReply,
    Handout,
    ClinicianNote,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::SocialReply,
        OutputFormat::Handout,
        OutputFormat::ClinicianNote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::SocialReply => "social_reply",
            OutputFormat::Handout => "handout",
            OutputFormat::ClinicianNote => "clinician_note",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "social_reply" => Some(OutputFormat::SocialReply),
            "handout" => Some(OutputFormat::Handout),
            "clinician_note" => Some(OutputFormat::ClinicianNote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputLength {
    Short,
    Medium,
    Long,
}

impl OutputLength {
    pub const ALL: [OutputLength; 3] = [OutputLength::Short, OutputLength::Medium, OutputLength::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputLength::Short => "short",
            OutputLength::Medium => "medium",
            OutputLength::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "short" => Some(OutputLength::Short),
            "medium" => Some(OutputLength::Medium),
            "long" => Some(OutputLength::Long),
            _ => None,
        }
    }
}

/// Cartesian product of formats and lengths, in persisted order
pub fn variant_matrix() -> impl Iterator<Item = (OutputFormat, OutputLength)> {
    OutputFormat::ALL
        .into_iter()
        .flat_map(|format| OutputLength::ALL.into_iter().map(move |length| (format, length)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedOutput {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub format: OutputFormat,
    pub length: OutputLength,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_variant_matrix_covers_every_pair_once() {
        let cells: Vec<_> = variant_matrix().collect();
        assert_eq!(cells.len(), 9);
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(unique.len(), 9);
        assert_eq!(cells[0], (OutputFormat::SocialReply, OutputLength::Short));
        assert_eq!(cells[8], (OutputFormat::ClinicianNote, OutputLength::Long));
    }
}
