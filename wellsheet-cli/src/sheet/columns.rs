//! Flat column names from the three-row header
//!
//! A category spanning N columns is crossed with its sub-categories and leaf
//! labels into `category_sub_leaf` names. The span is consumed as the
//! sub-categories are walked: it shrinks by one before each sub-category's
//! labels are taken, so every sub-category sees one label fewer than the
//! previous one. For the usual `fact` block (span 4, subs
//! `Qliq, Qoil, Qliq, Qoil`, labels `data1, data2, ...`) that yields
//! `fact_Qliq_data1`, `fact_Qliq_data2`, `fact_Qoil_data1`, `fact_Qoil_data2`.

use std::collections::{BTreeSet, HashSet};

use super::header::{HeaderError, HEADER_ROWS, HeaderTokens};

/// Categories that are never crossed and always stand alone (e.g. `company`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet(HashSet<String>);

impl ExcludeSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Derive the sorted, de-duplicated column names described by a header
pub fn derive_column_names(
    header: &HeaderTokens,
    exclude: &ExcludeSet,
) -> Result<Vec<String>, HeaderError> {
    if header.rows.len() < HEADER_ROWS {
        return Err(HeaderError::MissingRows {
            expected: HEADER_ROWS,
            found: header.rows.len(),
        });
    }

    let crossed = crossed_names(header, exclude)?;

    let standalone: BTreeSet<String> = header
        .categories()
        .iter()
        .filter(|category| {
            exclude.contains(category)
                || !crossed.iter().any(|name| name.starts_with(category.as_str()))
        })
        .cloned()
        .collect();

    let columns: Vec<String> = crossed.union(&standalone).cloned().collect();
    log::info!(
        "Derived {} columns ({} crossed, {} standalone)",
        columns.len(),
        crossed.len(),
        standalone.len()
    );
    Ok(columns)
}

fn crossed_names(
    header: &HeaderTokens,
    exclude: &ExcludeSet,
) -> Result<BTreeSet<String>, HeaderError> {
    let (categories, subs, labels) = (&header.rows[0], &header.rows[1], &header.rows[2]);

    // Spans are consumed in place, so a category listed twice sees what the
    // first pass left over.
    let mut remaining = header.category_counts.clone();
    let mut crossed = BTreeSet::new();

    for category in categories {
        if exclude.contains(category) {
            continue;
        }

        let span = remaining
            .get_mut(category)
            .ok_or_else(|| HeaderError::UnknownCategory {
                category: category.clone(),
            })?;

        for sub in &subs[..(*span).min(subs.len())] {
            *span -= 1;
            for label in &labels[..(*span).min(labels.len())] {
                crossed.insert(format!("{}_{}_{}", category, sub, label));
            }
        }
    }

    Ok(crossed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn header(rows: &[&[&str]], counts: &[(&str, usize)]) -> HeaderTokens {
        HeaderTokens::new(
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
            counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_fact_forecast_layout() {
        let header = header(
            &[
                &["company", "fact", "forecast"],
                &["Qliq", "Qoil", "Qliq", "Qoil"],
                &["data1", "data2", "data1", "data2", "data1", "data2", "data1", "data2"],
            ],
            &[("company", 1), ("fact", 4), ("forecast", 4)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::new(["company"])).unwrap();

        assert_eq!(
            columns,
            names(&[
                "company",
                "fact_Qliq_data1",
                "fact_Qliq_data2",
                "fact_Qoil_data1",
                "fact_Qoil_data2",
                "forecast_Qliq_data1",
                "forecast_Qliq_data2",
                "forecast_Qoil_data1",
                "forecast_Qoil_data2",
            ])
        );
    }

    #[test]
    fn test_triangular_consumption() {
        let header = header(
            &[&["cat"], &["s0", "s1", "s2"], &["l0", "l1", "l2"]],
            &[("cat", 3)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::default()).unwrap();

        assert_eq!(columns, names(&["cat_s0_l0", "cat_s0_l1", "cat_s1_l0"]));
    }

    #[test]
    fn test_span_of_one_yields_no_crossed_name() {
        let header = header(
            &[&["company", "fact"], &["Qliq"], &["data1"]],
            &[("company", 1), ("fact", 1)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::new(["company"])).unwrap();

        assert_eq!(columns, names(&["company", "fact"]));
    }

    #[test]
    fn test_span_of_two_yields_single_crossed_name() {
        let header = header(
            &[&["company", "fact"], &["Qliq"], &["data1", "data2"]],
            &[("company", 1), ("fact", 2)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::new(["company"])).unwrap();

        assert_eq!(columns, names(&["company", "fact_Qliq_data1"]));
    }

    #[test]
    fn test_excluded_category_never_crossed() {
        let header = header(
            &[&["company", "fact"], &["Qliq", "Qoil"], &["data1", "data2"]],
            &[("company", 3), ("fact", 3)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::new(["company"])).unwrap();

        assert!(columns.contains(&"company".to_string()));
        assert!(!columns.iter().any(|c| c.starts_with("company_")));
        assert!(columns.iter().any(|c| c.starts_with("fact_")));
    }

    #[test]
    fn test_excluded_prefix_of_crossed_name_still_standalone() {
        let header = header(
            &[&["fact", "factory"], &["a", "b"], &["x", "y"]],
            &[("fact", 1), ("factory", 2)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::new(["fact"])).unwrap();

        assert_eq!(columns, names(&["fact", "factory_a_x"]));
    }

    #[test]
    fn test_short_rows_degrade_gracefully() {
        let header = header(&[&["fact"], &["Qliq"], &[]], &[("fact", 5)]);

        let columns = derive_column_names(&header, &ExcludeSet::default()).unwrap();

        assert_eq!(columns, names(&["fact"]));
    }

    #[test]
    fn test_repeated_category_sees_consumed_span() {
        // First pass takes both subs and drops the span from 3 to 1; the
        // second pass only gets s0 and an empty label window.
        let header = header(
            &[&["cat", "cat"], &["s0", "s1"], &["l0", "l1", "l2"]],
            &[("cat", 3)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::default()).unwrap();

        assert_eq!(columns, names(&["cat_s0_l0", "cat_s0_l1", "cat_s1_l0"]));
    }

    #[test]
    fn test_output_sorted_and_unique() {
        let header = header(
            &[&["b", "a", "b"], &["x", "x"], &["y", "y", "y"]],
            &[("a", 2), ("b", 4)],
        );

        let columns = derive_column_names(&header, &ExcludeSet::default()).unwrap();

        let mut expected = columns.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(columns, expected);
    }

    #[test]
    fn test_no_categories() {
        let header = header(&[&[], &["Qliq"], &["data1"]], &[]);

        let columns = derive_column_names(&header, &ExcludeSet::default()).unwrap();

        assert!(columns.is_empty());
    }

    #[test]
    fn test_missing_rows_is_malformed() {
        let header = header(&[&["fact"]], &[("fact", 2)]);

        let err = derive_column_names(&header, &ExcludeSet::default()).unwrap_err();

        assert_eq!(
            err,
            HeaderError::MissingRows {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_category_without_span_is_malformed() {
        let header = header(&[&["fact"], &["Qliq"], &["data1"]], &[]);

        let err = derive_column_names(&header, &ExcludeSet::default()).unwrap_err();

        assert_eq!(
            err,
            HeaderError::UnknownCategory {
                category: "fact".to_string()
            }
        );
    }
}
