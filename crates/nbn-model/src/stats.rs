//! Rule coverage statistics per taxon.
//!
//! Rules count against the taxon key they name. A synonym's rules are also
//! credited to its preferred taxon, so `rules_total` of a preferred taxon
//! covers the whole name group. Rules naming a key that is not in the
//! species list are orphans.

use std::collections::{BTreeMap, HashMap};

use crate::accumulator::RuleAccumulator;
use crate::schema::SchemaTable;
use crate::species::SpeciesEntry;

/// Leading columns of the statistics export; one count column per rule
/// type follows.
pub const STATS_COLUMNS: [&str; 5] = [
    "taxon_key",
    "preferred_tvk",
    "rules_total",
    "rules_own",
    "rules_preferred",
];

/// Rule counts for one species list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonStats {
    /// Upper-cased taxon key.
    pub taxon_key: String,
    /// Upper-cased preferred key; empty when the list gives none.
    pub preferred_tvk: String,
    /// Rules naming this key, per rule type in schema order.
    pub by_type: Vec<usize>,
    /// Rules credited from synonyms of this taxon.
    pub rules_preferred: usize,
}

impl TaxonStats {
    #[must_use]
    pub fn rules_own(&self) -> usize {
        self.by_type.iter().sum()
    }

    #[must_use]
    pub fn rules_total(&self) -> usize {
        self.rules_own() + self.rules_preferred
    }

    /// True when the entry is its own preferred name.
    #[must_use]
    pub fn is_preferred(&self) -> bool {
        self.preferred_tvk.is_empty() || self.preferred_tvk == self.taxon_key
    }
}

/// Rule coverage of a whole export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStats {
    /// Rule types counted, in schema order.
    pub rule_types: Vec<String>,
    /// One entry per distinct species list key, in list order.
    pub taxa: Vec<TaxonStats>,
    /// Rules per rule type, orphans included.
    pub type_totals: Vec<usize>,
    /// Distinct keys named by at least one rule.
    pub taxa_with_rules: usize,
    pub preferred_with_rules: usize,
    pub synonyms_with_rules: usize,
    /// Keys named by rules but missing from the species list, sorted.
    pub orphan_taxa: Vec<String>,
    pub orphan_rules: usize,
    /// Synonyms whose preferred key is missing from the species list.
    pub unknown_preferred: Vec<String>,
}

impl RuleStats {
    /// Counts every record with a taxon column against the species list.
    ///
    /// Keys compare after trimming and upper-casing. Records of a rule type
    /// without a taxon column, or with an empty key, are not counted. A key
    /// listed twice keeps its first entry.
    #[must_use]
    pub fn compute(
        schemas: &SchemaTable,
        accumulator: &RuleAccumulator,
        species: &[SpeciesEntry],
    ) -> Self {
        let rule_types: Vec<String> = schemas.iter().map(|schema| schema.name.clone()).collect();
        let width = rule_types.len();

        let mut named: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut type_totals = vec![0; width];
        for (position, schema) in schemas.iter().enumerate() {
            let Some(column) = schema.taxon_column() else {
                continue;
            };
            for record in accumulator.records(&schema.name) {
                let key = normalise_key(&record.cell(column));
                if key.is_empty() {
                    continue;
                }
                named.entry(key).or_insert_with(|| vec![0; width])[position] += 1;
                type_totals[position] += 1;
            }
        }

        let mut index: HashMap<String, usize> = HashMap::with_capacity(species.len());
        let mut taxa: Vec<TaxonStats> = Vec::with_capacity(species.len());
        for entry in species {
            let taxon_key = normalise_key(&entry.taxon_key);
            if taxon_key.is_empty() || index.contains_key(&taxon_key) {
                continue;
            }
            index.insert(taxon_key.clone(), taxa.len());
            taxa.push(TaxonStats {
                by_type: named.get(&taxon_key).cloned().unwrap_or_else(|| vec![0; width]),
                preferred_tvk: normalise_key(&entry.preferred_tvk),
                taxon_key,
                rules_preferred: 0,
            });
        }

        let mut credits = Vec::new();
        let mut unknown_preferred = Vec::new();
        for taxon in taxa.iter().filter(|taxon| !taxon.is_preferred()) {
            match index.get(&taxon.preferred_tvk) {
                Some(&target) => credits.push((target, taxon.rules_own())),
                None => unknown_preferred.push(taxon.taxon_key.clone()),
            }
        }
        for (target, rules) in credits {
            taxa[target].rules_preferred += rules;
        }

        let mut stats = Self {
            rule_types,
            taxa_with_rules: named.len(),
            unknown_preferred,
            ..Self::default()
        };
        for (key, counts) in &named {
            match index.get(key) {
                Some(&position) if taxa[position].is_preferred() => stats.preferred_with_rules += 1,
                Some(_) => stats.synonyms_with_rules += 1,
                None => {
                    stats.orphan_taxa.push(key.clone());
                    stats.orphan_rules += counts.iter().sum::<usize>();
                }
            }
        }
        stats.taxa = taxa;
        stats.type_totals = type_totals;
        stats
    }

    /// Rules counted across all types.
    #[must_use]
    pub fn total_rules(&self) -> usize {
        self.type_totals.iter().sum()
    }

    /// Entry for a taxon key, compared ignoring case.
    #[must_use]
    pub fn taxon(&self, taxon_key: &str) -> Option<&TaxonStats> {
        let key = normalise_key(taxon_key);
        self.taxa.iter().find(|taxon| taxon.taxon_key == key)
    }

    /// Rule types paired with their totals.
    pub fn totals_by_type(&self) -> impl Iterator<Item = (&str, usize)> {
        self.rule_types
            .iter()
            .map(String::as_str)
            .zip(self.type_totals.iter().copied())
    }
}

fn normalise_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}
