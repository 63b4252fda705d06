//! Text rendering of engine results.
//!
//! Every result goes through [`render_outcome`] first, so the error panel and
//! the raw-text fallback look the same for all three engines.

pub mod card;
pub mod view;

pub use card::Card;
pub use view::{Filter, ResultView, SortKey};

use extract::{ChannelResult, Failure, FundingResult, Outcome, RecommendationResult};
use std::fmt::Write;

pub fn render_outcome<T>(outcome: &Outcome<T>, body: impl FnOnce(&T) -> String) -> String {
    match outcome {
        Outcome::Ok(value) => body(value),
        Outcome::Degraded(raw) => render_raw(raw),
        Outcome::Failed(failure) => render_error(failure),
    }
}

pub fn render_error(failure: &Failure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "! Error");
    let _ = writeln!(out, "  {}", failure.message);
    if failure.kind.is_retryable() {
        let _ = writeln!(out, "  Please try again in a moment.");
    }
    out
}

/// The model's text, verbatim, under a short notice.
pub fn render_raw(raw: &str) -> String {
    let mut out =
        String::from("(The response could not be read as structured data; showing it as-is.)\n\n");
    out.push_str(raw);
    if !raw.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Header line with match count, then one block per visible card.
pub fn render_cards<T: Card>(view: &ResultView<T>) -> String {
    let mut out = String::new();
    let visible = view.visible();

    let kinds = view.kinds();
    if !kinds.is_empty() {
        let listing: Vec<String> = kinds.iter().map(|(k, n)| format!("{} ({})", k, n)).collect();
        let _ = writeln!(out, "Types: all ({}) | {}", view.items().len(), listing.join(" | "));
    }
    let _ = writeln!(out, "{} results", visible.len());

    for (index, item) in visible {
        render_card(&mut out, index, item, view.is_expanded(index));
    }
    out
}

fn render_card<T: Card>(out: &mut String, index: usize, item: &T, expanded: bool) {
    let marker = if expanded { "▾" } else { "▸" };
    let mut tags = String::new();
    if let Some(kind) = item.kind().filter(|k| !k.is_empty()) {
        let _ = write!(tags, " [{}]", kind.replace('_', " "));
    }
    if let Some(priority) = item.priority() {
        let _ = write!(tags, " [{}]", priority);
    }

    let _ = writeln!(out, "{} #{} {}{}  {}%", marker, index + 1, item.title(), tags, item.score());

    let subtitle = item.subtitle();
    if !subtitle.is_empty() {
        let _ = writeln!(out, "    {}", subtitle);
    }

    if expanded {
        for (label, value) in item.details() {
            if !value.trim().is_empty() {
                let _ = writeln!(out, "    {}: {}", label, value.trim());
            }
        }
    }
}

/// The three recommendation lists, each with its own expansion state.
pub struct RecommendationView {
    pub hospitals: ResultView<extract::Hospital>,
    pub schemes: ResultView<extract::Scheme>,
    pub ngos: ResultView<extract::Ngo>,
    overall_confidence: u8,
    reasoning: String,
}

impl RecommendationView {
    pub fn new(result: RecommendationResult) -> Self {
        Self {
            hospitals: ResultView::new(result.hospitals),
            schemes: ResultView::new(result.schemes),
            ngos: ResultView::new(result.ngos),
            overall_confidence: result.overall_confidence,
            reasoning: result.reasoning,
        }
    }

    pub fn expand_all(&mut self) {
        self.hospitals.expand_all();
        self.schemes.expand_all();
        self.ngos.expand_all();
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Overall confidence: {}%", self.overall_confidence);
        if !self.reasoning.trim().is_empty() {
            let _ = writeln!(out, "{}", self.reasoning.trim());
        }

        for (heading, section) in [
            ("Hospitals", render_cards(&self.hospitals)),
            ("Government Schemes", render_cards(&self.schemes)),
            ("NGO Support", render_cards(&self.ngos)),
        ] {
            let _ = writeln!(out, "\n== {} ==", heading);
            out.push_str(&section);
        }
        out
    }
}

pub fn render_channels(result: &ChannelResult, view: &ResultView<extract::Channel>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Outreach channels for {} ({}): {} discovered",
        result.district, result.profile, result.total_discovered
    );
    if !result.summary.trim().is_empty() {
        let _ = writeln!(out, "{}", result.summary.trim());
    }
    if !result.coverage_analysis.trim().is_empty() {
        let _ = writeln!(out, "Coverage: {}", result.coverage_analysis.trim());
    }
    out.push('\n');
    out.push_str(&render_cards(view));
    out
}

pub fn render_funding(result: &FundingResult, view: &ResultView<extract::Funder>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Funders for {}: {} discovered",
        result.focus_area, result.total_discovered
    );
    if !result.top_recommendation.trim().is_empty() {
        let _ = writeln!(out, "Top recommendation: {}", result.top_recommendation.trim());
    }
    if !result.summary.trim().is_empty() {
        let _ = writeln!(out, "{}", result.summary.trim());
    }
    out.push('\n');
    out.push_str(&render_cards(view));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{Channel, ChannelType, FailureKind, Hospital};
    use serde_json::json;

    #[test]
    fn test_error_panel() {
        let outcome: Outcome<ChannelResult> =
            Outcome::failed(FailureKind::RateLimited, "Rate limit exceeded. Please try again shortly.");
        let text = render_outcome(&outcome, |_| unreachable!());
        assert!(text.starts_with("! Error"));
        assert!(text.contains("Rate limit exceeded"));
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let raw = "Here are some hospitals:\n1. Niloufer\n2. Gandhi";
        let outcome: Outcome<ChannelResult> = Outcome::Degraded(raw.to_string());
        let text = render_outcome(&outcome, |_| unreachable!());
        assert!(text.contains(raw));
    }

    #[test]
    fn test_collapsed_card_hides_details() {
        let channel = Channel {
            name: "Fernandez Hospital".to_string(),
            channel_type: ChannelType::Hospital,
            location: "Hyderabad".to_string(),
            relevance_score: 95,
            outreach_approach: "Meet the OB-GYN lead".to_string(),
            ..Default::default()
        };
        let mut view = ResultView::new(vec![channel]);

        let collapsed = render_cards(&view);
        assert!(collapsed.contains("▸ #1 Fernandez Hospital [hospital]  95%"));
        assert!(!collapsed.contains("Outreach approach"));

        view.toggle(0);
        let expanded = render_cards(&view);
        assert!(expanded.contains("▾ #1"));
        assert!(expanded.contains("Outreach approach: Meet the OB-GYN lead"));
        assert!(!expanded.contains("Contact:"));
    }

    #[test]
    fn test_recommendation_sections() {
        let result: RecommendationResult = serde_json::from_value(json!({
            "hospitals": [{ "name": "Niloufer Hospital", "location": "Hyderabad", "confidence": 90 }],
            "schemes": [{ "name": "Janani Suraksha Yojana", "confidence": 85 }],
            "ngos": [],
            "overallConfidence": 80,
            "reasoning": "High risk; prefer tertiary care."
        }))
        .unwrap();

        let text = RecommendationView::new(result).render();
        assert!(text.contains("Overall confidence: 80%"));
        assert!(text.contains("== Hospitals =="));
        assert!(text.contains("Niloufer Hospital"));
        assert!(text.contains("== NGO Support ==\n0 results"));
    }

    #[test]
    fn test_hospital_card_has_no_kind_tag() {
        let view = ResultView::new(vec![Hospital {
            name: "Gandhi Hospital".to_string(),
            confidence: 70,
            ..Default::default()
        }]);
        let text = render_cards(&view);
        assert!(text.starts_with("1 results"));
        assert!(text.contains("▸ #1 Gandhi Hospital  70%"));
    }
}
