//! Response configuration surfaces
//!
//! These only shape generated wording; stance and severity never read them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Region {
    #[default]
    #[serde(rename = "WHO")]
    Who,
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "UK")]
    Uk,
}

string_enum!(Region { Who => "WHO", Us => "US", Uk => "UK" });

impl Region {
    /// Health authority named in patient-facing guidance
    pub fn authority(&self) -> &'static str {
        match self {
            Region::Who => "the World Health Organization (WHO)",
            Region::Us => "the CDC",
            Region::Uk => "the NHS",
        }
    }

    pub fn emergency_advice(&self) -> &'static str {
        match self {
            Region::Who => "contact your local emergency number",
            Region::Us => "call 911",
            Region::Uk => "call 999, or NHS 111 if it is not an emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Neutral,
    Empathetic,
    Direct,
}

string_enum!(Tone { Neutral => "neutral", Empathetic => "empathetic", Direct => "direct" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    General,
    Patient,
    Clinician,
}

string_enum!(Audience { General => "general", Patient => "patient", Clinician => "clinician" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    General,
    Social,
    Email,
}

string_enum!(Platform { General => "general", Social => "social", Email => "email" });
