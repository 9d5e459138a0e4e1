use std::collections::BTreeMap;

use crate::record::RuleRecord;
use crate::schema::SchemaTable;

/// Records grouped by rule type, in insertion order within each type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleAccumulator {
    buckets: BTreeMap<String, Vec<RuleRecord>>,
}

impl RuleAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator with an empty bucket for every rule type in the table.
    #[must_use]
    pub fn seeded(schemas: &SchemaTable) -> Self {
        let buckets = schemas
            .names()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self { buckets }
    }

    pub fn push(&mut self, record: RuleRecord) {
        self.buckets
            .entry(record.rule_type.clone())
            .or_default()
            .push(record);
    }

    /// Appends every bucket of `other` after the existing records.
    pub fn merge(&mut self, other: RuleAccumulator) {
        for (rule_type, records) in other.buckets {
            self.buckets.entry(rule_type).or_default().extend(records);
        }
    }

    #[must_use]
    pub fn records(&self, rule_type: &str) -> &[RuleRecord] {
        self.buckets
            .get(rule_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self, rule_type: &str) -> usize {
        self.records(rule_type).len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn contains_type(&self, rule_type: &str) -> bool {
        self.buckets.contains_key(rule_type)
    }

    pub fn rule_types(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleRecord])> {
        self.buckets
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rule_type: &str, org: &str, taxon: &str) -> RuleRecord {
        RuleRecord::new(rule_type, org, format!("{org}/rule.txt")).with_value("taxon_key", taxon)
    }

    #[test]
    fn seeded_accumulator_has_empty_buckets() {
        let acc = RuleAccumulator::seeded(&SchemaTable::builtin());
        assert!(acc.contains_type("regions"));
        assert_eq!(acc.count("regions"), 0);
        assert_eq!(acc.total(), 0);
    }

    #[test]
    fn merge_preserves_organisation_order() {
        let mut global = RuleAccumulator::new();
        let mut first = RuleAccumulator::new();
        first.push(record("ranges", "OrgA", "T1"));
        first.push(record("ranges", "OrgA", "T2"));
        let mut second = RuleAccumulator::new();
        second.push(record("ranges", "OrgB", "T3"));
        second.push(record("periods", "OrgB", "T4"));

        global.merge(first);
        global.merge(second);

        let orgs: Vec<&str> = global
            .records("ranges")
            .iter()
            .map(|r| r.organisation.as_str())
            .collect();
        assert_eq!(orgs, vec!["OrgA", "OrgA", "OrgB"]);
        assert_eq!(global.count("periods"), 1);
        assert_eq!(global.total(), 4);
    }

    #[test]
    fn unknown_type_has_no_records() {
        let acc = RuleAccumulator::new();
        assert!(acc.records("nothing").is_empty());
    }
}
