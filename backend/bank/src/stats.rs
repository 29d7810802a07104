//! # Stats
//!
//! Everything derived from vote counts. Nothing here is persisted, every read recomputes.
//!
//! - Aggregate: per effect totals and percentages
//! - Categories: first-seen ordered grouping
//! - Site: catalog wide totals, participants are a `votes / 3` estimate
use std::collections::HashMap;

use serde::Serialize;

use crate::effects::Effect;

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteAggregate {
    pub votes_for: u64,
    pub votes_against: u64,
    pub percent_for: f64,
    pub percent_against: f64,
    pub total: u64,
}

impl VoteAggregate {
    pub fn new(votes_for: u64, votes_against: u64) -> Self {
        let total = votes_for + votes_against;

        // no data, split evenly
        if total == 0 {
            return Self {
                votes_for,
                votes_against,
                percent_for: 50.0,
                percent_against: 50.0,
                total,
            };
        }

        Self {
            votes_for,
            votes_against,
            percent_for: round1(votes_for as f64 / total as f64),
            percent_against: round1(votes_against as f64 / total as f64),
            total,
        }
    }

    /// "For" is variant A.
    pub fn of(effect: &Effect) -> Self {
        Self::new(effect.votes_a, effect.votes_b)
    }
}

/// Ratio to a percentage with one decimal, half away from zero.
pub fn round1(ratio: f64) -> f64 {
    (ratio * 1000.0).round() / 10.0
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub emoji: String,
    pub name: String,
    pub count: usize,
}

pub fn summarize_categories(effects: &[Effect]) -> Vec<CategorySummary> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<CategorySummary> = Vec::new();

    for effect in effects {
        match positions.get(effect.category.as_str()) {
            Some(&position) => summaries[position].count += 1,
            None => {
                positions.insert(&effect.category, summaries.len());
                summaries.push(CategorySummary {
                    category: effect.category.clone(),
                    emoji: effect.category_emoji.clone(),
                    name: effect.category_name.clone(),
                    count: 1,
                });
            }
        }
    }

    summaries
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub total_effects: u64,
    pub total_votes: u64,
    pub estimated_participants: u64,
}

impl SiteStats {
    pub fn from_effects(effects: &[Effect]) -> Self {
        let total_votes = effects.iter().map(|e| e.votes_a + e.votes_b).sum();

        Self {
            total_effects: effects.len() as u64,
            total_votes,
            estimated_participants: total_votes / 3,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub(crate) fn effect(id: u32, category: &str, votes_a: u64, votes_b: u64) -> Effect {
        Effect {
            id,
            category: category.to_string(),
            category_emoji: format!("{category}-emoji"),
            category_name: category.to_uppercase(),
            title: format!("Effect {id}"),
            question: "Which one?".to_string(),
            variant_a: "first".to_string(),
            variant_b: "second".to_string(),
            votes_a,
            votes_b,
            current_state: "second".to_string(),
            source_link: String::new(),
            date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_aggregate_percentages() {
        let agg = VoteAggregate::new(3, 7);
        assert_eq!((agg.percent_for, agg.percent_against), (30.0, 70.0));
        assert_eq!(agg.total, 10);

        let agg = VoteAggregate::new(1, 1);
        assert_eq!((agg.percent_for, agg.percent_against), (50.0, 50.0));

        let agg = VoteAggregate::new(0, 0);
        assert_eq!((agg.percent_for, agg.percent_against), (50.0, 50.0));
        assert_eq!(agg.total, 0);
    }

    #[test]
    fn test_aggregate_rounds_each_side() {
        let agg = VoteAggregate::new(1, 2);
        assert_eq!(agg.percent_for, 33.3);
        assert_eq!(agg.percent_against, 66.7);

        // 62.5 rounds away from zero
        assert_eq!(round1(0.0625), 6.3);
    }

    #[test]
    fn test_categories_first_seen_order() {
        let effects = vec![
            effect(1, "a", 0, 0),
            effect(2, "a", 0, 0),
            effect(3, "b", 0, 0),
            effect(4, "a", 0, 0),
            effect(5, "c", 0, 0),
        ];

        let summaries = summarize_categories(&effects);
        let order: Vec<&str> = summaries.iter().map(|s| s.category.as_str()).collect();
        let counts: Vec<usize> = summaries.iter().map(|s| s.count).collect();

        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(counts, [3, 1, 1]);
        assert_eq!(summaries[1].emoji, "b-emoji");
        assert_eq!(summaries[2].name, "C");
    }

    #[test]
    fn test_site_stats() {
        assert_eq!(
            SiteStats::from_effects(&[]),
            SiteStats {
                total_effects: 0,
                total_votes: 0,
                estimated_participants: 0,
            }
        );

        let stats = SiteStats::from_effects(&[effect(1, "a", 5, 5), effect(2, "b", 1, 0)]);
        assert_eq!(stats.total_effects, 2);
        assert_eq!(stats.total_votes, 11);
        assert_eq!(stats.estimated_participants, 3);
    }
}
