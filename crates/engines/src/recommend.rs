use forms::{FormError, Profile};
use serde::{Deserialize, Serialize};

use crate::prompt::{UseCase, or_default};

const SYSTEM_PROMPT: &str = r#"You are MotherSource AI, a maternal healthcare recommendation engine for India. Given a mother's profile, recommend support in three categories:

1. Hospitals (3 recommendations): hospitals suited to the pregnancy risk level and location. Give the hospital name, city/district, why it is suitable (ICU, C-section capability, NICU) and a distance category (nearby/moderate/far).

2. Government schemes (3 recommendations): healthcare schemes the mother is eligible for given income, rural/urban status and state. Give the scheme name, key benefits, eligibility summary and how to apply.

3. NGO support (2-3 recommendations): organisations providing financial aid, emergency transport or maternal support. Give the organisation name, type of support, coverage area and contact method.

Every recommendation carries a confidence score (0-100) for how reliable it is, and the response explains its reasoning briefly.

Respond with valid JSON only, using this structure:
{
  "hospitals": [{ "name": "", "location": "", "suitability": "", "distance": "", "confidence": 0 }],
  "schemes": [{ "name": "", "benefits": "", "eligibility": "", "howToApply": "", "confidence": 0 }],
  "ngos": [{ "name": "", "supportType": "", "coverage": "", "contact": "", "confidence": 0 }],
  "overallConfidence": 0,
  "reasoning": ""
}

Use realistic Indian healthcare data. If the location is vague, use representative options for that region. Always prioritise safety for high-risk pregnancies."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub profile: Profile,
}

pub struct Recommend;

impl UseCase for Recommend {
    const NAME: &'static str = "recommend";

    type Request = RecommendRequest;

    fn validate(request: &RecommendRequest) -> Result<(), FormError> {
        request.profile.validate()
    }

    fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_message(request: &RecommendRequest) -> String {
        let p = &request.profile;
        format!(
            "Patient Profile:
- State/Location: {}
- District/City: {}
- Area Type: {}
- Monthly Household Income: ₹{}
- Pregnancy Risk Level: {}
- Gestational Age: {} weeks
- Additional Notes: {}

Please provide personalized recommendations.",
            p.state,
            p.district,
            p.area_type,
            p.income,
            p.risk_level,
            p.gestational_age,
            or_default(Some(p.notes.as_str()), "None"),
        )
    }
}
