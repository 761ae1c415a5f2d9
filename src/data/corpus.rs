use std::collections::HashMap;

use super::model::{Field, ReviewTable};
use crate::error::Result;

/// Concatenate the `column` text of every review whose `label_column`
/// equals `label_value`, single-space separated, in source order.
///
/// No matches yields an empty string. The text is not trimmed, deduplicated
/// or case-folded; pick the precomputed text variant that fits the consumer.
pub fn corpus_for(table: &ReviewTable, column: Field, label_column: Field, label_value: &str) -> String {
    let parts: Vec<&str> = table
        .records()
        .iter()
        .filter(|r| r.get(label_column) == label_value)
        .map(|r| r.get(column))
        .collect();
    parts.join(" ")
}

/// Same as [`corpus_for`] with columns given by name.
pub fn corpus_for_name(
    table: &ReviewTable,
    column: &str,
    label_column: &str,
    label_value: &str,
) -> Result<String> {
    Ok(corpus_for(
        table,
        table.field(column)?,
        table.field(label_column)?,
        label_value,
    ))
}

/// The `limit` most frequent whitespace-separated terms of a corpus,
/// descending by count, ties by first occurrence.
pub fn term_frequencies(corpus: &str, limit: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for term in corpus.split_whitespace() {
        match index.get(term) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(term, counts.len());
                counts.push((term, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(t, c)| (t.to_string(), c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DatasetSchema, ReviewRecord};
    use crate::error::DashboardError;

    fn table() -> ReviewTable {
        let rows = [("H1", "a", "positif"), ("H1", "b", "negatif"), ("H2", "c", "positif")];
        let records = rows
            .iter()
            .map(|(h, text, s)| {
                ReviewRecord::from_cells([
                    (Field::RawText, *text),
                    (Field::Lemmatized, *text),
                    (Field::Hospital, *h),
                    (Field::Sentiment, *s),
                ])
            })
            .collect();
        ReviewTable::new(records, DatasetSchema::default()).unwrap()
    }

    #[test]
    fn joins_matching_rows_in_order() {
        assert_eq!(corpus_for(&table(), Field::RawText, Field::Sentiment, "positif"), "a c");
    }

    #[test]
    fn single_match_has_no_padding() {
        assert_eq!(corpus_for(&table(), Field::Lemmatized, Field::Sentiment, "negatif"), "b");
    }

    #[test]
    fn no_match_is_empty_not_error() {
        assert_eq!(corpus_for(&table(), Field::RawText, Field::Sentiment, "netral"), "");
    }

    #[test]
    fn unknown_column_name_fails() {
        assert!(matches!(
            corpus_for_name(&table(), "judul", "sentiment", "positif"),
            Err(DashboardError::UnknownColumn(name)) if name == "judul"
        ));
        assert_eq!(
            corpus_for_name(&table(), "ulasan", "rumah_sakit", "H1").unwrap(),
            "a b"
        );
    }

    #[test]
    fn term_frequencies_rank_by_count() {
        let terms = term_frequencies("dokter ramah perawat ramah dokter ramah antri", 3);
        assert_eq!(
            terms,
            vec![
                ("ramah".to_string(), 3),
                ("dokter".to_string(), 2),
                ("perawat".to_string(), 1)
            ]
        );
        assert!(term_frequencies("", 10).is_empty());
    }
}
