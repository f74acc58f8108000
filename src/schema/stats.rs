use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One reason a choice is locked: the stat it demands, the threshold it
/// demands, and the value the player actually has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetRequirement {
    pub stat: String,
    pub required: i64,
    pub have: i64,
}

/// The stat sheet accumulated over one playthrough.
///
/// Stats are an open-ended map from name to signed integer. A stat exists
/// from the first time a choice's consequences touch it; reads of unknown
/// stats see 0. Totals are unbounded in both directions, and the whole
/// sheet lives only as long as one run (a restart discards it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats(FxHashMap<String, i64>);

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a stat, 0 when it has never been touched.
    pub fn get(&self, name: &str) -> i64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Overwrite a stat directly. Tools and tests use this; playthroughs
    /// only ever go through `apply`.
    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.0.insert(name.into(), value);
    }

    /// Add each consequence delta to its stat, creating missing stats at 0.
    /// The sheet is only ever extended, never reset, by applying.
    pub fn apply(&mut self, consequences: &HashMap<String, i64>) {
        for (stat, delta) in consequences {
            *self.0.entry(stat.clone()).or_insert(0) += *delta;
        }
    }

    /// True when every requirement holds: `get(stat) >= threshold` for all
    /// entries, threshold inclusive. The empty map is always satisfied.
    pub fn meets(&self, requirements: &HashMap<String, i64>) -> bool {
        requirements.iter().all(|(stat, min)| self.get(stat) >= *min)
    }

    /// The requirements that do not hold, sorted by stat name so lock
    /// feedback and rejections are stable.
    pub fn unmet(&self, requirements: &HashMap<String, i64>) -> Vec<UnmetRequirement> {
        let mut failing: Vec<UnmetRequirement> = requirements
            .iter()
            .filter(|(stat, min)| self.get(stat) < **min)
            .map(|(stat, min)| UnmetRequirement {
                stat: stat.clone(),
                required: *min,
                have: self.get(stat),
            })
            .collect();
        failing.sort_by(|a, b| a.stat.cmp(&b.stat));
        failing
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate stats in arbitrary map order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Stats sorted by name, for display projections.
    pub fn sorted(&self) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> =
            self.0.iter().map(|(name, value)| (name.clone(), *value)).collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consequences(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries.iter().map(|(name, delta)| (name.to_string(), *delta)).collect()
    }

    #[test]
    fn unknown_stat_reads_zero() {
        let stats = Stats::new();
        assert_eq!(stats.get("gold"), 0);
        assert!(stats.is_empty());
    }

    #[test]
    fn apply_creates_and_accumulates() {
        let mut stats = Stats::new();
        stats.apply(&consequences(&[("gold", 5)]));
        stats.apply(&consequences(&[("gold", 3)]));
        assert_eq!(stats.get("gold"), 8);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn apply_allows_negative_totals() {
        let mut stats = Stats::new();
        stats.apply(&consequences(&[("debt", -4)]));
        stats.apply(&consequences(&[("debt", -1)]));
        assert_eq!(stats.get("debt"), -5);
    }

    #[test]
    fn meets_is_inclusive_at_the_threshold() {
        let mut stats = Stats::new();
        let needs_ten = consequences(&[("gold", 10)]);

        stats.set("gold", 9);
        assert!(!stats.meets(&needs_ten));

        stats.set("gold", 10);
        assert!(stats.meets(&needs_ten));
    }

    #[test]
    fn meets_is_a_conjunction() {
        let mut stats = Stats::new();
        stats.set("gold", 10);
        stats.set("trust", 0);
        let both = consequences(&[("gold", 5), ("trust", 1)]);
        assert!(!stats.meets(&both));

        stats.set("trust", 1);
        assert!(stats.meets(&both));
    }

    #[test]
    fn empty_requirements_always_hold() {
        let stats = Stats::new();
        assert!(stats.meets(&HashMap::new()));
        assert!(stats.unmet(&HashMap::new()).is_empty());
    }

    #[test]
    fn unmet_reports_only_failures_sorted() {
        let mut stats = Stats::new();
        stats.set("gold", 3);
        let requirements = consequences(&[("trust", 1), ("gold", 5), ("luck", 2)]);

        let unmet = stats.unmet(&requirements);
        assert_eq!(unmet.len(), 3);
        assert_eq!(unmet[0].stat, "gold");
        assert_eq!(unmet[0].required, 5);
        assert_eq!(unmet[0].have, 3);
        assert_eq!(unmet[1].stat, "luck");
        assert_eq!(unmet[2].stat, "trust");

        stats.set("gold", 5);
        stats.set("luck", 2);
        let unmet = stats.unmet(&requirements);
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0].stat, "trust");
    }

    #[test]
    fn sorted_orders_by_name() {
        let mut stats = Stats::new();
        stats.set("trust", 1);
        stats.set("gold", 8);
        assert_eq!(
            stats.sorted(),
            vec![("gold".to_string(), 8), ("trust".to_string(), 1)]
        );
    }
}
