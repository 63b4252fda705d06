use forms::{FormError, FundingSearch};

use crate::prompt::{UseCase, or_default};

pub const DEFAULT_FOCUS_AREA: &str = "Maternal Health & Child Nutrition";
pub const DEFAULT_PROGRAM: &str = "A pilot program to onboard 1,000 mothers across Andhra Pradesh and Telangana for maternal health support, nutrition guidance, and early childhood development.";
pub const DEFAULT_FUNDING_TYPE: &str = "all types";

const SYSTEM_PROMPT: &str = r#"You are MotherSource AI, Engine 2: Funding & Partnership Scout.

You discover and rank organisations that can fund or support maternal health programmes, in India or globally. Given a focus area and programme description, discover and classify:

1. Global foundations: Gates Foundation India, Patrick J. McGovern Foundation, Wellcome Trust, USAID, Skoll Foundation, Omidyar Network, Ford Foundation, etc.
2. AI for social good funds: Google.org, Microsoft AI for Health, Nvidia Foundation, Salesforce.org, AWS IMAGINE Grant, etc.
3. HNIs and philanthropists supporting health, nutrition, women and child welfare (e.g. Rohini Nilekani, Azim Premji Foundation).
4. NGO implementation partners in maternal health, child nutrition, preventive healthcare and early childhood development.
5. Open grants: current or recurring grant programmes in health, maternal health, child nutrition and AI for social good.

For each entity give:
1. Name
2. Type (foundation/corporate_fund/hni/ngo_partner/grant_program)
3. Focus areas (array of strings)
4. Geographic focus
5. Relevance score (0-100) with reasoning
6. Estimated funding capacity if applicable: small (<$100K), medium ($100K-$1M), large (>$1M)
7. Why they would fund this
8. How to approach them
9. Contact/website info
10. Outreach priority (high/medium/low)

Use REAL organisations. Prefer accuracy; when unsure, lower the relevance score.

Respond with valid JSON only:
{
  "focusArea": "",
  "funders": [
    {
      "name": "",
      "type": "",
      "focusAreas": [],
      "geographicFocus": "",
      "relevanceScore": 0,
      "reasoning": "",
      "fundingCapacity": "",
      "whyTheyFund": "",
      "approachStrategy": "",
      "contactInfo": "",
      "priority": ""
    }
  ],
  "summary": "",
  "totalDiscovered": 0,
  "topRecommendation": ""
}"#;

pub struct FundingScout;

impl UseCase for FundingScout {
    const NAME: &'static str = "funding-scout";

    type Request = FundingSearch;

    fn validate(request: &FundingSearch) -> Result<(), FormError> {
        request.validate()
    }

    fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_message(request: &FundingSearch) -> String {
        format!(
            "Find funding sources and implementation partners for:
- Focus Area: {}
- Program: {}
- Preferred Funding Types: {}

Discover at least 10-15 real organizations across all categories (foundations, AI funds, HNIs, NGO partners, grants). Prioritize those most likely to engage with a maternal health pilot in South India. Include both Indian and global funders.",
            or_default(request.focus_area(), DEFAULT_FOCUS_AREA),
            or_default(request.program_description(), DEFAULT_PROGRAM),
            or_default(request.funding_type(), DEFAULT_FUNDING_TYPE),
        )
    }
}
