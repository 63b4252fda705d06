use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lenient;

/// Generates a categorical field that keeps unknown model output verbatim
/// instead of failing the whole result.
macro_rules! open_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(s) => s.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                let key = raw.trim();
                $(
                    if key.eq_ignore_ascii_case($wire) {
                        return $name::$variant;
                    }
                )+
                $name::Other(key.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum!(ChannelType {
    Hospital => "hospital",
    Clinic => "clinic",
    MedicalCollege => "medical_college",
    Corporate => "corporate",
    Ngo => "ngo",
    HealthOffice => "health_office",
    Phc => "PHC",
});

open_enum!(FunderType {
    Foundation => "foundation",
    CorporateFund => "corporate_fund",
    Hni => "hni",
    NgoPartner => "ngo_partner",
    GrantProgram => "grant_program",
});

open_enum!(FundingCapacity {
    Small => "small",
    Medium => "medium",
    Large => "large",
});

open_enum!(Priority {
    High => "high",
    Medium => "medium",
    Low => "low",
});

impl Default for ChannelType {
    fn default() -> Self {
        ChannelType::Other(String::new())
    }
}

impl Default for FunderType {
    fn default() -> Self {
        FunderType::Other(String::new())
    }
}

// ---------------------------------------------------------------------------
// Recommendation engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hospital {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suitability: String,
    #[serde(deserialize_with = "lenient::text")]
    pub distance: String,
    #[serde(deserialize_with = "lenient::score")]
    pub confidence: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scheme {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub benefits: String,
    #[serde(deserialize_with = "lenient::text")]
    pub eligibility: String,
    #[serde(deserialize_with = "lenient::text")]
    pub how_to_apply: String,
    #[serde(deserialize_with = "lenient::score")]
    pub confidence: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ngo {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub support_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub coverage: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact: String,
    #[serde(deserialize_with = "lenient::score")]
    pub confidence: u8,
}

/// Hospitals, schemes and NGOs for one profile. The three lists must be
/// present for the result to count as well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub hospitals: Vec<Hospital>,
    pub schemes: Vec<Scheme>,
    pub ngos: Vec<Ngo>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub overall_confidence: u8,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Engine 1: channel finder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Channel {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::open_enum")]
    pub channel_type: ChannelType,
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::score")]
    pub relevance_score: u8,
    #[serde(deserialize_with = "lenient::text")]
    pub reasoning: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_info: String,
    #[serde(deserialize_with = "lenient::text")]
    pub why_it_matters: String,
    #[serde(deserialize_with = "lenient::text")]
    pub outreach_approach: String,
    /// Free-form; models answer with words ("high") as often as numbers.
    #[serde(deserialize_with = "lenient::text")]
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub district: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile: String,
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_discovered: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub coverage_analysis: String,
}

// ---------------------------------------------------------------------------
// Engine 2: funding scout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Funder {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::open_enum")]
    pub funder_type: FunderType,
    #[serde(deserialize_with = "lenient::string_list")]
    pub focus_areas: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub geographic_focus: String,
    #[serde(deserialize_with = "lenient::score")]
    pub relevance_score: u8,
    #[serde(deserialize_with = "lenient::text")]
    pub reasoning: String,
    #[serde(deserialize_with = "capacity")]
    pub funding_capacity: Option<FundingCapacity>,
    #[serde(deserialize_with = "lenient::text")]
    pub why_they_fund: String,
    #[serde(deserialize_with = "lenient::text")]
    pub approach_strategy: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contact_info: String,
    /// `None` when the model did not rank the funder.
    #[serde(deserialize_with = "lenient::optional_enum")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub focus_area: String,
    pub funders: Vec<Funder>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_discovered: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub top_recommendation: String,
}

fn capacity<'de, D>(deserializer: D) -> Result<Option<FundingCapacity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = lenient::text(deserializer)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    // "large (>$1M)" and similar annotated answers still map to a size.
    let head = raw.split_whitespace().next().unwrap_or_default().to_string();
    Ok(Some(FundingCapacity::from(head)))
}
