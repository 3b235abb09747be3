// Attach publication years to per-document topic proportions.
//
// The join is keyed by document id, so row order on either side does not
// matter. A gamma row whose document has no year is an error, never a
// silent mismatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::GammaRow;

/// A gamma row with its document's publication year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedGammaRow {
    pub document: String,
    pub topic: usize,
    pub gamma: f64,
    pub year: i32,
}

pub fn join_years(
    gamma: &[GammaRow],
    years: &BTreeMap<String, i32>,
) -> Result<Vec<DatedGammaRow>, PipelineError> {
    gamma
        .iter()
        .map(|row| {
            let year = years
                .get(&row.document)
                .copied()
                .ok_or_else(|| PipelineError::MetadataNotFound {
                    document: row.document.clone(),
                    reason: "no year loaded for this document".to_string(),
                })?;
            Ok(DatedGammaRow {
                document: row.document.clone(),
                topic: row.topic,
                gamma: row.gamma,
                year,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(document: &str, topic: usize, gamma: f64) -> GammaRow {
        GammaRow {
            document: document.to_string(),
            topic,
            gamma,
        }
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let years: BTreeMap<String, i32> = [("A".to_string(), 1990)].into();
        let err = join_years(&[row("A", 1, 0.5), row("Z", 1, 0.5)], &years).unwrap_err();
        assert!(matches!(err, PipelineError::MetadataNotFound { document, .. } if document == "Z"));
    }

    #[test]
    fn test_preserves_values() {
        let years: BTreeMap<String, i32> = [("A".to_string(), 1990)].into();
        let joined = join_years(&[row("A", 2, 0.25)], &years).unwrap();
        assert_eq!(
            joined,
            vec![DatedGammaRow {
                document: "A".into(),
                topic: 2,
                gamma: 0.25,
                year: 1990
            }]
        );
    }
}
