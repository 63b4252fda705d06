use forms::{ChannelSearch, FormError};

use crate::prompt::UseCase;

const SYSTEM_PROMPT: &str = r#"You are MotherSource AI, Engine 1: Mother Onboarding Channel Finder.

You help a maternal health organisation discover and rank outreach channels for reaching mothers across Andhra Pradesh and Telangana. Given a target district/city and a mother profile (rural/urban), discover and classify outreach channels.

For RURAL areas, focus on:
- Medical colleges (e.g. ASRAM Medical College Eluru, Kakatiya Medical College Warangal)
- Government and district hospitals
- Primary Health Centres (PHCs) and Community Health Centres (CHCs)
- District health offices and NHM district units
- Anganwadi centres and ASHA worker networks
- NGOs working with rural mothers

For URBAN areas, focus on:
- Private hospitals and maternity clinics (e.g. Lotus Hospitals, Fernandez Hospital)
- OB-GYN specialists and paediatricians
- Large corporates with a women workforce (TCS, Infosys, Deloitte, Amazon offices)
- Women's clinics and paediatric speciality centres
- Corporate wellness programmes
- Urban NGOs (e.g. Dhaatri Mothers Milk Bank)

For each entity give:
1. Name
2. Type (hospital/clinic/PHC/corporate/ngo/medical_college/health_office)
3. Category (rural_source or urban_source)
4. Location (city/district)
5. Relevance score (0-100) with explicit reasoning
6. Contact info if known
7. Why this channel matters for reaching mothers
8. Suggested outreach approach (1-2 sentences)

Use REAL entities from AP and Telangana. Prefer accuracy over quantity; when unsure about an entity, say so and lower its confidence.

Respond with valid JSON only:
{
  "district": "",
  "profile": "",
  "channels": [
    {
      "name": "",
      "type": "",
      "category": "",
      "location": "",
      "relevanceScore": 0,
      "reasoning": "",
      "contactInfo": "",
      "whyItMatters": "",
      "outreachApproach": "",
      "confidence": ""
    }
  ],
  "summary": "",
  "totalDiscovered": 0,
  "coverageAnalysis": ""
}"#;

pub struct ChannelFinder;

impl UseCase for ChannelFinder {
    const NAME: &'static str = "channel-finder";

    type Request = ChannelSearch;

    fn validate(request: &ChannelSearch) -> Result<(), FormError> {
        request.validate()
    }

    fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_message(request: &ChannelSearch) -> String {
        let mut msg = format!(
            "Find outreach channels to reach mothers in:
- District/City: {}
- Profile: {} (rural/urban/both)
- State(s): Andhra Pradesh and Telangana
",
            request.district.trim(),
            request.profile,
        );

        let context = request.additional_context.trim();
        if !context.is_empty() {
            msg.push_str(&format!("- Additional context: {}\n", context));
        }

        let corporates = if request.profile.includes_corporates() {
            "corporates, "
        } else {
            ""
        };
        msg.push_str(&format!(
            "\nDiscover at least 8-12 real entities. Include a mix of healthcare facilities, NGOs, {}and government health infrastructure. Prioritize entities most likely to help onboard 1,000 mothers for a maternal health pilot program.",
            corporates
        ));

        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forms::OutreachProfile;

    fn search(profile: OutreachProfile, context: &str) -> ChannelSearch {
        ChannelSearch {
            district: "Warangal".to_string(),
            profile,
            additional_context: context.to_string(),
        }
    }

    #[test]
    fn test_rural_search_skips_corporates() {
        let msg = ChannelFinder::user_message(&search(OutreachProfile::Rural, ""));
        assert!(msg.contains("- District/City: Warangal"));
        assert!(msg.contains("- Profile: rural"));
        assert!(!msg.contains("corporates"));
        assert!(!msg.contains("Additional context"));
    }

    #[test]
    fn test_urban_and_both_include_corporates() {
        for profile in [OutreachProfile::Urban, OutreachProfile::Both] {
            let msg = ChannelFinder::user_message(&search(profile, ""));
            assert!(msg.contains("NGOs, corporates, and government"));
        }
    }

    #[test]
    fn test_additional_context_line() {
        let msg = ChannelFinder::user_message(&search(OutreachProfile::Both, "Focus on tribal areas"));
        assert!(msg.contains("- Additional context: Focus on tribal areas\n"));
    }
}
