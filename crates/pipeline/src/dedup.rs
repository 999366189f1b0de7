//! Exact-duplicate row removal.

use std::collections::HashSet;

use eyre::{Result, WrapErr};
use serde::Serialize;

/// Remove exact-duplicate rows, keeping the first occurrence of each.
///
/// Two rows are duplicates when every field is bit-for-bit equal, which for
/// floating point values means equal bit patterns rather than `==`.
pub(crate) fn unique_rows<T: Serialize>(rows: Vec<T>) -> Result<Vec<T>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut unique = Vec::with_capacity(rows.len());
    for row in rows {
        let key = bincode::serialize(&row).wrap_err("failed to encode row identity")?;
        if seen.insert(key) {
            unique.push(row);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        id: u64,
        value: Option<f64>,
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let rows = vec![
            Row { id: 2, value: Some(1.5) },
            Row { id: 1, value: None },
            Row { id: 2, value: Some(1.5) },
            Row { id: 1, value: Some(0.0) },
        ];
        let unique = unique_rows(rows).unwrap();
        assert_eq!(
            unique,
            vec![
                Row { id: 2, value: Some(1.5) },
                Row { id: 1, value: None },
                Row { id: 1, value: Some(0.0) },
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let unique = unique_rows(Vec::<Row>::new()).unwrap();
        assert!(unique.is_empty());
    }
}
