use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FormError, max_len, require};

pub const OUTREACH_DISTRICTS: &[&str] = &[
    "Hyderabad", "Secunderabad", "Warangal", "Nizamabad", "Karimnagar", "Khammam",
    "Mahbubnagar", "Nalgonda", "Adilabad", "Medak", "Rangareddy", "Sangareddy",
    "Visakhapatnam", "Vijayawada", "Guntur", "Nellore", "Kurnool", "Rajahmundry",
    "Tirupati", "Kakinada", "Eluru", "Ongole", "Anantapur", "Kadapa", "Srikakulam",
    "Vizianagaram", "Chittoor", "Prakasam", "Krishna", "West Godavari", "East Godavari",
];

const MAX_CONTEXT_LEN: usize = 200;
const MAX_FOCUS_LEN: usize = 200;
const MAX_PROGRAM_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutreachProfile {
    Rural,
    Urban,
    #[default]
    Both,
}

impl OutreachProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachProfile::Rural => "rural",
            OutreachProfile::Urban => "urban",
            OutreachProfile::Both => "both",
        }
    }

    /// Corporates only make sense as channels where there is an urban workforce.
    pub fn includes_corporates(&self) -> bool {
        matches!(self, OutreachProfile::Urban | OutreachProfile::Both)
    }
}

impl FromStr for OutreachProfile {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rural" => Ok(OutreachProfile::Rural),
            "urban" => Ok(OutreachProfile::Urban),
            "both" => Ok(OutreachProfile::Both),
            other => Err(FormError::Invalid {
                field: "profile",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutreachProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for the outreach channel finder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSearch {
    pub district: String,
    #[serde(default)]
    pub profile: OutreachProfile,
    #[serde(default)]
    pub additional_context: String,
}

impl ChannelSearch {
    pub fn validate(&self) -> Result<(), FormError> {
        require("district", &self.district)?;
        max_len("additionalContext", &self.additional_context, MAX_CONTEXT_LEN)
    }
}

/// Input for the funding scout. Every field is optional; the engine fills
/// in defaults for anything left blank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundingSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_type: Option<String>,
}

impl FundingSearch {
    pub fn validate(&self) -> Result<(), FormError> {
        if let Some(focus) = &self.focus_area {
            max_len("focusArea", focus, MAX_FOCUS_LEN)?;
        }
        if let Some(program) = &self.program_description {
            max_len("programDescription", program, MAX_PROGRAM_LEN)?;
        }
        Ok(())
    }

    pub fn focus_area(&self) -> Option<&str> {
        non_blank(self.focus_area.as_deref())
    }

    pub fn program_description(&self) -> Option<&str> {
        non_blank(self.program_description.as_deref())
    }

    pub fn funding_type(&self) -> Option<&str> {
        non_blank(self.funding_type.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
