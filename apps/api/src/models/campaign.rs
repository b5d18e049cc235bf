use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which kind of copy to write. Drives the exemplar and structural skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyType {
    Email,
    SalesPage,
}

impl CopyType {
    pub const ALL: [CopyType; 2] = [CopyType::Email, CopyType::SalesPage];

    pub fn label(self) -> &'static str {
        match self {
            CopyType::Email => "Email",
            CopyType::SalesPage => "Sales Page",
        }
    }
}

/// Target market. Each carries the locale rule handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Australia,
    UnitedKingdom,
    Canada,
    UnitedStates,
}

impl Country {
    pub const ALL: [Country; 4] = [
        Country::Australia,
        Country::UnitedKingdom,
        Country::Canada,
        Country::UnitedStates,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Country::Australia => "Australia",
            Country::UnitedKingdom => "United Kingdom",
            Country::Canada => "Canada",
            Country::UnitedStates => "United States",
        }
    }

    /// Spelling convention, currency and market index for the locale.
    pub fn rules(self) -> &'static str {
        match self {
            Country::Australia => "Use Australian English, prices in AUD, reference the ASX.",
            Country::UnitedKingdom => "Use British English, prices in GBP, reference the FTSE.",
            Country::Canada => "Use Canadian English, prices in CAD, reference the TSX.",
            Country::UnitedStates => "Use American English, prices in USD, reference the S&P 500.",
        }
    }
}

/// Named word-count tier. Upper bounds carry ~10% slack over the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
    ExtraLong,
    ScrollingMonster,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 5] = [
        LengthBucket::Short,
        LengthBucket::Medium,
        LengthBucket::Long,
        LengthBucket::ExtraLong,
        LengthBucket::ScrollingMonster,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LengthBucket::Short => "Short (100–200 words)",
            LengthBucket::Medium => "Medium (200–500 words)",
            LengthBucket::Long => "Long (500–1500 words)",
            LengthBucket::ExtraLong => "Extra Long (1500–3000 words)",
            LengthBucket::ScrollingMonster => "Scrolling Monster (3000+ words)",
        }
    }

    /// `(min_words, max_words)`; `None` means unbounded.
    pub fn bounds(self) -> (u32, Option<u32>) {
        match self {
            LengthBucket::Short => (100, Some(220)),
            LengthBucket::Medium => (200, Some(550)),
            LengthBucket::Long => (500, Some(1600)),
            LengthBucket::ExtraLong => (1500, Some(3200)),
            LengthBucket::ScrollingMonster => (3000, None),
        }
    }

    pub fn min_words(self) -> u32 {
        self.bounds().0
    }
}

/// Free-text campaign fields. Only hook and details are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignBrief {
    pub hook: String,
    pub details: String,
    pub offer_price: String,
    pub retail_price: String,
    pub offer_term: String,
    pub reports: String,
    pub stocks_to_tease: String,
    pub quotes_news: String,
}

impl CampaignBrief {
    pub fn is_ready(&self) -> bool {
        !self.hook.trim().is_empty() && !self.details.trim().is_empty()
    }

    pub fn has_offer(&self) -> bool {
        [&self.offer_price, &self.retail_price, &self.offer_term]
            .iter()
            .any(|f| !f.trim().is_empty())
    }
}

pub const MIN_TRAIT_SCORE: u8 = 1;
pub const MAX_TRAIT_SCORE: u8 = 10;

/// Trait name → intensity in [1, 10], iterated in name order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TraitScores(BTreeMap<String, u8>);

impl TraitScores {
    pub fn new(scores: impl IntoIterator<Item = (String, u8)>) -> Self {
        Self(scores.into_iter().collect())
    }

    /// Starting positions of the intensity panel.
    pub fn default_panel() -> Self {
        Self::new(
            [
                ("Urgency", 8),
                ("Data_Richness", 7),
                ("Social_Proof", 6),
                ("Comparative_Framing", 6),
                ("Imagery", 7),
                ("Conversational_Tone", 8),
                ("FOMO", 7),
                ("Repetition", 5),
            ]
            .into_iter()
            .map(|(name, score)| (name.to_string(), score)),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TraitScores {
    fn default() -> Self {
        Self::default_panel()
    }
}

/// Scores as a client sent them. Any integer decodes, so out-of-range values
/// are reported as validation errors rather than body decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TraitInput(BTreeMap<String, i64>);

impl TraitInput {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validated scores, or the names of traits scored outside [1, 10].
    pub fn into_scores(self) -> Result<TraitScores, Vec<String>> {
        let range = i64::from(MIN_TRAIT_SCORE)..=i64::from(MAX_TRAIT_SCORE);
        let bad: Vec<String> = self
            .0
            .iter()
            .filter(|(_, score)| !range.contains(score))
            .map(|(name, _)| name.clone())
            .collect();
        if !bad.is_empty() {
            return Err(bad);
        }
        Ok(TraitScores::new(self.0.into_iter().filter_map(
            |(name, score)| u8::try_from(score).ok().map(|s| (name, s)),
        )))
    }
}

/// Everything the prompt assembler needs for one generation.
/// `original_copy` present means revision mode.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub copy_type: CopyType,
    pub country: Country,
    pub length: LengthBucket,
    pub traits: TraitScores,
    pub brief: CampaignBrief,
    pub original_copy: Option<String>,
}

impl GenerationRequest {
    pub fn is_revision(&self) -> bool {
        self.original_copy.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bucket_bounds() {
        assert_eq!(LengthBucket::Short.bounds(), (100, Some(220)));
        assert_eq!(LengthBucket::ScrollingMonster.bounds(), (3000, None));
        for bucket in LengthBucket::ALL {
            let (min, max) = bucket.bounds();
            if let Some(max) = max {
                assert!(min < max, "{bucket:?} bounds out of order");
            }
        }
    }

    #[test]
    fn test_enums_use_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&CopyType::SalesPage).unwrap(), "\"sales_page\"");
        assert_eq!(
            serde_json::from_str::<Country>("\"united_kingdom\"").unwrap(),
            Country::UnitedKingdom
        );
        assert_eq!(
            serde_json::from_str::<LengthBucket>("\"extra_long\"").unwrap(),
            LengthBucket::ExtraLong
        );
    }

    #[test]
    fn test_brief_requires_hook_and_details() {
        let mut brief = CampaignBrief {
            hook: "Midnight deadline".into(),
            details: "   ".into(),
            ..Default::default()
        };
        assert!(!brief.is_ready());
        brief.details = "Silver Pass, two services".into();
        assert!(brief.is_ready());
    }

    #[test]
    fn test_brief_deserializes_with_missing_optional_fields() {
        let brief: CampaignBrief =
            serde_json::from_str(r#"{"hook": "h", "details": "d"}"#).unwrap();
        assert!(brief.is_ready());
        assert!(!brief.has_offer());
        assert!(brief.reports.is_empty());
    }

    #[test]
    fn test_trait_scores_iterate_in_name_order() {
        let scores = TraitScores::new([("Urgency".to_string(), 9), ("FOMO".to_string(), 3)]);
        let names: Vec<_> = scores.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["FOMO", "Urgency"]);
    }

    #[test]
    fn test_trait_input_flags_out_of_range() {
        let input: TraitInput = serde_json::from_str(
            r#"{"Urgency": 0, "FOMO": 10, "Imagery": 11, "Repetition": 300, "Social_Proof": -1}"#,
        )
        .unwrap();
        assert_eq!(
            input.into_scores().unwrap_err(),
            vec!["Imagery", "Repetition", "Social_Proof", "Urgency"]
        );
        assert_eq!(TraitScores::default_panel().len(), 8);
    }

    #[test]
    fn test_trait_input_in_range_converts() {
        let input: TraitInput = serde_json::from_str(r#"{"Urgency": 1, "FOMO": 10}"#).unwrap();
        let scores = input.into_scores().unwrap();
        assert_eq!(scores.iter().collect::<Vec<_>>(), vec![("FOMO", 10), ("Urgency", 1)]);
    }
}
