use extract::{Channel, Funder, Hospital, Ngo, Priority, Scheme};

/// What the renderer needs from an entity to draw, filter and sort it.
pub trait Card {
    fn title(&self) -> &str;

    /// Categorical `type` used by the type filter, if the entity has one.
    fn kind(&self) -> Option<&str> {
        None
    }

    fn priority(&self) -> Option<&str> {
        None
    }

    /// Relevance or confidence, 0..=100.
    fn score(&self) -> u8;

    /// One line shown under the title while collapsed.
    fn subtitle(&self) -> String;

    /// Secondary fields revealed when the card is expanded. Empty values
    /// are skipped by the renderer.
    fn details(&self) -> Vec<(&'static str, String)>;
}

impl Card for Hospital {
    fn title(&self) -> &str {
        &self.name
    }

    fn score(&self) -> u8 {
        self.confidence
    }

    fn subtitle(&self) -> String {
        join(&[&self.location, &self.distance])
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![("Suitability", self.suitability.clone())]
    }
}

impl Card for Scheme {
    fn title(&self) -> &str {
        &self.name
    }

    fn score(&self) -> u8 {
        self.confidence
    }

    fn subtitle(&self) -> String {
        self.benefits.clone()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Eligibility", self.eligibility.clone()),
            ("How to apply", self.how_to_apply.clone()),
        ]
    }
}

impl Card for Ngo {
    fn title(&self) -> &str {
        &self.name
    }

    fn score(&self) -> u8 {
        self.confidence
    }

    fn subtitle(&self) -> String {
        join(&[&self.support_type, &self.coverage])
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![("Contact", self.contact.clone())]
    }
}

impl Card for Channel {
    fn title(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> Option<&str> {
        Some(self.channel_type.as_str())
    }

    fn score(&self) -> u8 {
        self.relevance_score
    }

    fn subtitle(&self) -> String {
        join(&[&self.location, &self.category])
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Why it matters", self.why_it_matters.clone()),
            ("Reasoning", self.reasoning.clone()),
            ("Outreach approach", self.outreach_approach.clone()),
            ("Contact", self.contact_info.clone()),
            ("Confidence", self.confidence.clone()),
        ]
    }
}

impl Card for Funder {
    fn title(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> Option<&str> {
        Some(self.funder_type.as_str())
    }

    fn priority(&self) -> Option<&str> {
        self.priority.as_ref().map(Priority::as_str)
    }

    fn score(&self) -> u8 {
        self.relevance_score
    }

    fn subtitle(&self) -> String {
        let capacity = self
            .funding_capacity
            .as_ref()
            .map(|c| format!("{} capacity", c))
            .unwrap_or_default();
        join(&[&self.geographic_focus, &capacity])
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Focus areas", self.focus_areas.join(", ")),
            ("Why they fund", self.why_they_fund.clone()),
            ("Reasoning", self.reasoning.clone()),
            ("Approach", self.approach_strategy.clone()),
            ("Contact", self.contact_info.clone()),
        ]
    }
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}
