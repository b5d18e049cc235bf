//! Tone calibration shows the model what each trait sounds like at the
//! requested intensity.
//!
//! Each trait has three illustrative sentences. The guide shows 3 when the score
//! reaches the trait's high threshold, 2 within three points below it, else 1.

use crate::generation::trait_rules::TraitConfigMap;
use crate::models::campaign::TraitScores;

/// Illustrative sentences per trait, strongest first.
pub fn trait_examples(name: &str) -> &'static [&'static str] {
    match name {
        "Urgency" => &[
            "This isn't a drill — once midnight hits, your chance to secure these savings is gone forever.",
            "Time's ticking — when the clock hits zero tonight, you're out of luck.",
            "You have exactly one shot. Miss today's deadline, and it's gone forever.",
        ],
        "Data_Richness" => &[
            "Last year alone, our recommendations averaged returns 220% higher than the market average.",
            "Our analysis has identified 73% higher returns than the average ASX investor over three consecutive years.",
            "More than 85% of our recommended stocks outperformed the market last fiscal year alone.",
        ],
        "Social_Proof" => &[
            "Thousands of investors trust Motley Fool every year to transform their financial future.",
            "Australia's leading financial experts have rated us #1 three years in a row.",
            "Join over 125,000 smart investors who rely on Motley Fool's stock advice every month.",
        ],
        "Comparative_Framing" => &[
            "Think back to those who seized early opportunities in the smartphone revolution.",
            "Imagine being among the first to see Netflix's potential in 2002. That's the kind of opportunity we're talking about.",
            "Just like the early days of Tesla, these stocks could define your investing success for years.",
        ],
        "Imagery" => &[
            "When that switch flips, the next phase could accelerate even faster.",
            "Think of it as a snowball rolling downhill—small at first, but soon unstoppable.",
            "Like a rocket on the launch pad, the countdown has begun and liftoff is imminent.",
        ],
        "Conversational_Tone" => &[
            "Look — investing can feel complicated, but what if it didn't have to be?",
            "We get it—investing can seem overwhelming. But what if you had someone guiding you every step of the way?",
            "Here's the truth: investing doesn't have to be complicated. Let's simplify this together.",
        ],
        "FOMO" => &[
            "Opportunities like these pass quickly — and regret can last forever.",
            "Don't be the one who has to tell their friends, 'I missed out when I had the chance.'",
            "By tomorrow, your chance to act will be history. Don't live with that regret.",
        ],
        "Repetition" => &[
            "This offer is for today only. Today only means exactly that: today only.",
            "Act now. This offer expires tonight. Again, it expires tonight—no exceptions.",
            "This is a limited-time deal. Limited-time means exactly that: limited-time.",
        ],
        _ => &[],
    }
}

/// How many example sentences to show for a score against a high threshold.
pub fn example_count(score: u8, high_threshold: f64) -> usize {
    let score = f64::from(score);
    if score >= high_threshold {
        3
    } else if score >= high_threshold - 3.0 {
        2
    } else {
        1
    }
}

/// Numbered, human-readable guide with one line per scored trait.
pub fn trait_guide(scores: &TraitScores, config: &TraitConfigMap) -> String {
    scores
        .iter()
        .enumerate()
        .map(|(i, (name, score))| {
            let shots = example_count(score, config.high_threshold(name));
            let examples = trait_examples(name)
                .iter()
                .take(shots)
                .map(|s| format!("“{s}”"))
                .collect::<Vec<_>>()
                .join(" / ");
            let label = name.replace('_', " ");
            if examples.is_empty() {
                format!("{}. {label} ({score}/10)", i + 1)
            } else {
                format!("{}. {label} ({score}/10) — e.g. {examples}", i + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::trait_rules::tests::sample_config;

    #[test]
    fn test_every_default_trait_has_three_examples() {
        for (name, _) in TraitScores::default_panel().iter() {
            assert_eq!(trait_examples(name).len(), 3, "{name}");
        }
    }

    #[test]
    fn test_example_count_bands() {
        assert_eq!(example_count(10, 8.0), 3);
        assert_eq!(example_count(8, 8.0), 3);
        assert_eq!(example_count(7, 8.0), 2);
        assert_eq!(example_count(5, 8.0), 2);
        assert_eq!(example_count(4, 8.0), 1);
        assert_eq!(example_count(1, 8.0), 1);
    }

    #[test]
    fn test_guide_line_format() {
        let scores = TraitScores::new([("Urgency".to_string(), 9)]);
        let guide = trait_guide(&scores, &sample_config());
        assert!(guide.starts_with("1. Urgency (9/10) — e.g. “This isn't a drill"));
        assert_eq!(guide.matches(" / ").count(), 2, "three examples, two separators");
    }

    #[test]
    fn test_guide_uses_configured_threshold() {
        // FOMO's high threshold is 7 in the sample config, so 7 earns three shots
        let scores = TraitScores::new([("FOMO".to_string(), 7)]);
        let guide = trait_guide(&scores, &sample_config());
        assert_eq!(guide.matches('“').count(), 3);
    }

    #[test]
    fn test_guide_replaces_underscores_and_numbers_lines() {
        let scores = TraitScores::new([
            ("Social_Proof".to_string(), 2),
            ("Data_Richness".to_string(), 6),
        ]);
        let guide = trait_guide(&scores, &sample_config());
        let lines: Vec<_> = guide.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. Data Richness (6/10)"));
        assert!(lines[1].starts_with("2. Social Proof (2/10)"));
        assert_eq!(lines[1].matches('“').count(), 1);
    }

    #[test]
    fn test_guide_omits_examples_for_unknown_trait() {
        let scores = TraitScores::new([("Whimsy".to_string(), 9)]);
        assert_eq!(trait_guide(&scores, &sample_config()), "1. Whimsy (9/10)");
    }
}
