use std::collections::HashMap;

use serde::Serialize;

use super::model::{Field, ReviewTable};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Key of one aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Single(String),
    Pair(String, String),
}

impl GroupKey {
    pub fn pair(primary: &str, secondary: &str) -> Self {
        GroupKey::Pair(primary.to_string(), secondary.to_string())
    }

    /// The primary-column value of this key.
    pub fn primary(&self) -> &str {
        match self {
            GroupKey::Single(p) | GroupKey::Pair(p, _) => p,
        }
    }

    /// The secondary-column value, when grouped by two columns.
    pub fn secondary(&self) -> Option<&str> {
        match self {
            GroupKey::Single(_) => None,
            GroupKey::Pair(_, s) => Some(s),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::Single(value.to_string())
    }
}

/// Counts per distinct value (or value pair) actually present in the table.
///
/// Pairs that never co-occur are absent, never materialised as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub primary: Field,
    pub secondary: Option<Field>,
    pub entries: Vec<(GroupKey, usize)>,
    /// Labels outside the field's closed vocabulary, in first-seen order.
    pub unknown_labels: Vec<String>,
}

impl AggregationResult {
    pub fn get(&self, key: &GroupKey) -> Option<usize> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    /// Sum of all counts; equals the row count of the aggregated table.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct secondary values across all entries, in result order.
    pub fn secondary_values(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            if let Some(s) = key.secondary() {
                if !out.contains(&s) {
                    out.push(s);
                }
            }
        }
        out
    }

    /// Distinct primary values, in result order.
    pub fn primary_values(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            if !out.contains(&key.primary()) {
                out.push(key.primary());
            }
        }
        out
    }
}

/// Share of one secondary label inside a primary group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// One primary group of a percentage aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentGroup {
    pub primary: String,
    pub total: usize,
    /// Only labels that occur in this group; their percentages sum to 100.
    pub shares: Vec<LabelShare>,
}

impl PercentGroup {
    pub fn percent_of(&self, label: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentResult {
    pub primary: Field,
    pub secondary: Field,
    pub groups: Vec<PercentGroup>,
    pub unknown_labels: Vec<String>,
}

impl PercentResult {
    pub fn group(&self, primary: &str) -> Option<&PercentGroup> {
        self.groups.iter().find(|g| g.primary == primary)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Count rows by one column, or by a (primary, secondary) column pair.
///
/// Single-column mode orders by descending count, ties by first appearance.
/// Two-column mode keeps primary groups in first-seen order and orders each
/// group's pairs by descending count, ties by first appearance.
pub fn count_by(
    table: &ReviewTable,
    primary: Field,
    secondary: Option<Field>,
) -> Result<AggregationResult> {
    let unknown_labels = unknown_labels(table, primary, secondary);

    let entries = match secondary {
        None => {
            let mut counts = ordered_counts(table.column(primary));
            // Stable sort keeps first-seen order among equal counts.
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            counts
                .into_iter()
                .map(|(value, count)| (GroupKey::Single(value.to_string()), count))
                .collect()
        }
        Some(secondary) => grouped_counts(table, primary, secondary)
            .into_iter()
            .flat_map(|(p, mut pairs)| {
                pairs.sort_by(|a, b| b.1.cmp(&a.1));
                pairs
                    .into_iter()
                    .map(move |(s, count)| (GroupKey::pair(p, s), count))
            })
            .collect(),
    };

    Ok(AggregationResult {
        primary,
        secondary,
        entries,
        unknown_labels,
    })
}

/// Same as [`count_by`] with columns given by name.
pub fn count_by_name(
    table: &ReviewTable,
    primary: &str,
    secondary: Option<&str>,
) -> Result<AggregationResult> {
    let primary = table.field(primary)?;
    let secondary = secondary.map(|s| table.field(s)).transpose()?;
    count_by(table, primary, secondary)
}

/// Normalise counts within each primary group so they sum to 100.
///
/// A label absent from a group is absent from its shares rather than 0%.
pub fn percent_by(table: &ReviewTable, primary: Field, secondary: Field) -> Result<PercentResult> {
    let unknown_labels = unknown_labels(table, primary, Some(secondary));

    let groups = grouped_counts(table, primary, secondary)
        .into_iter()
        .map(|(p, mut pairs)| {
            pairs.sort_by(|a, b| b.1.cmp(&a.1));
            let total: usize = pairs.iter().map(|(_, c)| c).sum();
            let shares = pairs
                .into_iter()
                .map(|(label, count)| LabelShare {
                    label: label.to_string(),
                    count,
                    percent: count as f64 * 100.0 / total as f64,
                })
                .collect();
            PercentGroup {
                primary: p.to_string(),
                total,
                shares,
            }
        })
        .collect();

    Ok(PercentResult {
        primary,
        secondary,
        groups,
        unknown_labels,
    })
}

/// Same as [`percent_by`] with columns given by name.
pub fn percent_by_name(table: &ReviewTable, primary: &str, secondary: &str) -> Result<PercentResult> {
    percent_by(table, table.field(primary)?, table.field(secondary)?)
}

// -- helpers --

/// Count values in first-seen order without depending on hash iteration.
fn ordered_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// Primary groups in first-seen order, each with its secondary counts.
fn grouped_counts<'a>(
    table: &'a ReviewTable,
    primary: Field,
    secondary: Field,
) -> Vec<(&'a str, Vec<(&'a str, usize)>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in table.records() {
        let p = record.get(primary);
        let i = *index.entry(p).or_insert_with(|| {
            groups.push((p, Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(record.get(secondary));
    }
    groups
        .into_iter()
        .map(|(p, values)| (p, ordered_counts(values.into_iter())))
        .collect()
}

/// Values of vocabulary-backed fields that fall outside the vocabulary.
fn unknown_labels(table: &ReviewTable, primary: Field, secondary: Option<Field>) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for field in std::iter::once(primary).chain(secondary) {
        let Some(vocab) = table.vocabulary(field) else {
            continue;
        };
        if vocab.is_empty() {
            continue;
        }
        for value in table.column(field) {
            if !vocab.iter().any(|l| l == value) && !unknown.iter().any(|u| u == value) {
                log::warn!("Unknown {field} label '{value}' in dataset");
                unknown.push(value.to_string());
            }
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DatasetSchema, ReviewRecord};
    use crate::error::DashboardError;

    fn table(rows: &[(&str, &str, &str)]) -> ReviewTable {
        let records = rows
            .iter()
            .map(|(hospital, hospital_type, sentiment)| {
                ReviewRecord::from_cells([
                    (Field::RawText, "x"),
                    (Field::Hospital, *hospital),
                    (Field::HospitalType, *hospital_type),
                    (Field::Sentiment, *sentiment),
                    (Field::Emotion, "yakin"),
                ])
            })
            .collect();
        ReviewTable::new(records, DatasetSchema::default()).unwrap()
    }

    fn three_rows() -> ReviewTable {
        table(&[("H1", "A", "positif"), ("H1", "A", "negatif"), ("H2", "B", "positif")])
    }

    #[test]
    fn single_column_counts() {
        let result = count_by(&three_rows(), Field::Sentiment, None).unwrap();
        assert_eq!(
            result.entries,
            vec![(GroupKey::from("positif"), 2), (GroupKey::from("negatif"), 1)]
        );
        assert_eq!(result.total(), 3);
        assert!(result.unknown_labels.is_empty());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let t = table(&[("H1", "A", "netral"), ("H1", "A", "negatif"), ("H1", "A", "positif")]);
        let result = count_by(&t, Field::Sentiment, None).unwrap();
        let labels: Vec<_> = result.entries.iter().map(|(k, _)| k.primary()).collect();
        assert_eq!(labels, vec!["netral", "negatif", "positif"]);
    }

    #[test]
    fn pair_counts_are_sparse() {
        let result = count_by(&three_rows(), Field::Hospital, Some(Field::Sentiment)).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.get(&GroupKey::pair("H1", "positif")), Some(1));
        assert_eq!(result.get(&GroupKey::pair("H1", "negatif")), Some(1));
        assert_eq!(result.get(&GroupKey::pair("H2", "positif")), Some(1));
        assert_eq!(result.get(&GroupKey::pair("H2", "negatif")), None);
        assert_eq!(result.primary_values(), vec!["H1", "H2"]);
        assert_eq!(result.secondary_values(), vec!["positif", "negatif"]);
    }

    #[test]
    fn percentages_sum_to_100_per_group() {
        let result = percent_by(&three_rows(), Field::Hospital, Field::Sentiment).unwrap();
        let h1 = result.group("H1").unwrap();
        assert_eq!(h1.percent_of("positif"), Some(50.0));
        assert_eq!(h1.percent_of("negatif"), Some(50.0));

        let h2 = result.group("H2").unwrap();
        assert_eq!(h2.percent_of("positif"), Some(100.0));
        assert_eq!(h2.percent_of("negatif"), None);

        for group in &result.groups {
            let sum: f64 = group.shares.iter().map(|s| s.percent).sum();
            assert!((sum - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn thirds_sum_within_tolerance() {
        let t = table(&[("H1", "A", "positif"), ("H1", "A", "negatif"), ("H1", "A", "netral")]);
        let result = percent_by(&t, Field::HospitalType, Field::Sentiment).unwrap();
        let sum: f64 = result.groups[0].shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_labels_are_reported_not_dropped() {
        let t = table(&[("H1", "A", "positif"), ("H1", "A", "senang"), ("H2", "B", "senang")]);
        let result = count_by(&t, Field::Sentiment, None).unwrap();
        assert_eq!(result.unknown_labels, vec!["senang"]);
        assert_eq!(result.get(&GroupKey::from("senang")), Some(2));
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn unknown_column_name_fails() {
        let t = three_rows();
        assert!(matches!(
            count_by_name(&t, "rumah_sakit", Some("rating")),
            Err(DashboardError::UnknownColumn(name)) if name == "rating"
        ));
        assert!(matches!(
            percent_by_name(&t, "kota", "sentiment"),
            Err(DashboardError::UnknownColumn(_))
        ));
        assert_eq!(count_by_name(&t, "sentiment_label_final", None).unwrap().total(), 3);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let t = three_rows();
        let a = count_by(&t, Field::Hospital, Some(Field::Sentiment)).unwrap();
        let b = count_by(&t, Field::Hospital, Some(Field::Sentiment)).unwrap();
        assert_eq!(a, b);
    }
}
