use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{FormError, max_len, require};

pub const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh", "Assam", "Bihar", "Chhattisgarh", "Delhi", "Goa", "Gujarat",
    "Haryana", "Himachal Pradesh", "Jharkhand", "Karnataka", "Kerala", "Madhya Pradesh",
    "Maharashtra", "Manipur", "Meghalaya", "Mizoram", "Nagaland", "Odisha", "Punjab",
    "Rajasthan", "Sikkim", "Tamil Nadu", "Telangana", "Tripura", "Uttar Pradesh",
    "Uttarakhand", "West Bengal",
];

const MAX_DISTRICT_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;
const MAX_INCOME: u64 = 10_000_000;
const GESTATION_WEEKS: (u64, u64) = (1, 42);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AreaType {
    #[default]
    Rural,
    SemiUrban,
    Urban,
}

impl AreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Rural => "rural",
            AreaType::SemiUrban => "semi-urban",
            AreaType::Urban => "urban",
        }
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rural" => Ok(AreaType::Rural),
            "semi-urban" | "semi_urban" | "semiurban" => Ok(AreaType::SemiUrban),
            "urban" => Ok(AreaType::Urban),
            other => Err(FormError::Invalid {
                field: "areaType",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            other => Err(FormError::Invalid {
                field: "riskLevel",
                value: other.to_string(),
            }),
        }
    }
}

/// A mother's profile as submitted to the recommendation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub state: String,
    pub district: String,
    pub area_type: AreaType,
    /// Monthly household income in rupees.
    pub income: u64,
    pub risk_level: RiskLevel,
    /// Weeks, 1..=42.
    pub gestational_age: u8,
    #[serde(default)]
    pub notes: String,
}

impl Profile {
    /// Server-side checks. Lighter than [`ProfileDraft::parse`]: the state is
    /// only required to be present, not to come from the known list.
    pub fn validate(&self) -> Result<(), FormError> {
        require("state", &self.state)?;
        require("district", &self.district)?;
        max_len("district", &self.district, MAX_DISTRICT_LEN)?;
        max_len("notes", &self.notes, MAX_NOTES_LEN)?;

        if self.income > MAX_INCOME {
            return Err(FormError::OutOfRange {
                field: "income",
                min: 0,
                max: MAX_INCOME,
                value: self.income,
            });
        }

        let weeks = u64::from(self.gestational_age);
        if weeks < GESTATION_WEEKS.0 || weeks > GESTATION_WEEKS.1 {
            return Err(FormError::OutOfRange {
                field: "gestationalAge",
                min: GESTATION_WEEKS.0,
                max: GESTATION_WEEKS.1,
                value: weeks,
            });
        }

        Ok(())
    }
}

/// Raw text fields as the profile form holds them before submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub state: String,
    pub district: String,
    pub area_type: String,
    pub income: String,
    pub risk_level: String,
    pub gestational_age: String,
    pub notes: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            state: String::new(),
            district: String::new(),
            area_type: "rural".to_string(),
            income: String::new(),
            risk_level: "low".to_string(),
            gestational_age: String::new(),
            notes: String::new(),
        }
    }
}

impl ProfileDraft {
    pub fn parse(&self) -> Result<Profile, FormError> {
        require("state", &self.state)?;
        let state = self.state.trim();
        if !INDIAN_STATES.iter().any(|s| s.eq_ignore_ascii_case(state)) {
            return Err(FormError::Invalid {
                field: "state",
                value: state.to_string(),
            });
        }

        require("income", &self.income)?;
        let income = parse_number("income", &self.income)?;

        require("gestationalAge", &self.gestational_age)?;
        let weeks = parse_number("gestationalAge", &self.gestational_age)?;
        let gestational_age = u8::try_from(weeks).map_err(|_| FormError::OutOfRange {
            field: "gestationalAge",
            min: GESTATION_WEEKS.0,
            max: GESTATION_WEEKS.1,
            value: weeks,
        })?;

        let profile = Profile {
            state: state.to_string(),
            district: self.district.trim().to_string(),
            area_type: self.area_type.parse()?,
            income,
            risk_level: self.risk_level.parse()?,
            gestational_age,
            notes: self.notes.trim().to_string(),
        };
        profile.validate()?;
        Ok(profile)
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<u64, FormError> {
    raw.trim().parse::<u64>().map_err(|_| FormError::Invalid {
        field,
        value: raw.trim().to_string(),
    })
}
