// Unit tests for the metadata join and the yearly aggregation.
//
// Tests that years attach by document id regardless of row order, that
// missing metadata is an error rather than a silent gap, and that yearly
// means and series behave on small hand-built tables.

use std::collections::BTreeMap;
use std::fs;

use topictrend::error::PipelineError;
use topictrend::metadata::{join_years, load_years, DatedGammaRow};
use topictrend::model::GammaRow;
use topictrend::temporal::{aggregate_by_year, TopicYearMean, YearSeries};

fn gamma(document: &str, topic: usize, value: f64) -> GammaRow {
    GammaRow {
        document: document.to_string(),
        topic,
        gamma: value,
    }
}

fn years() -> BTreeMap<String, i32> {
    [("A", 1990), ("B", 1991), ("C", 1992)]
        .into_iter()
        .map(|(id, y)| (id.to_string(), y))
        .collect()
}

// ============================================================
// join_years
// ============================================================

#[test]
fn join_attaches_year_by_document_id() {
    let rows = vec![
        gamma("C", 2, 0.6),
        gamma("A", 1, 0.7),
        gamma("B", 2, 0.5),
        gamma("A", 2, 0.3),
        gamma("C", 1, 0.4),
        gamma("B", 1, 0.5),
    ];
    let joined = join_years(&rows, &years()).unwrap();

    assert_eq!(joined.len(), rows.len());
    for row in joined.iter().filter(|r| r.document == "A") {
        assert_eq!(row.year, 1990);
    }
    for row in &joined {
        assert_eq!(row.year, years()[&row.document]);
    }
}

#[test]
fn join_order_does_not_change_result() {
    let rows = vec![gamma("A", 1, 0.7), gamma("B", 1, 0.5), gamma("C", 1, 0.4)];
    let mut reversed = rows.clone();
    reversed.reverse();

    let mut forward = join_years(&rows, &years()).unwrap();
    let mut backward = join_years(&reversed, &years()).unwrap();
    forward.sort_by(|a, b| a.document.cmp(&b.document));
    backward.sort_by(|a, b| a.document.cmp(&b.document));
    assert_eq!(forward, backward);
}

#[test]
fn join_without_year_fails() {
    let err = join_years(&[gamma("D", 1, 1.0)], &years()).unwrap_err();
    assert!(matches!(err, PipelineError::MetadataNotFound { ref document, .. } if document == "D"));
}

#[test]
fn load_years_from_companion_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("A.xml"),
        "<article><meta><pub><year>1990</year></pub></meta></article>",
    )
    .unwrap();
    fs::write(dir.path().join("B.xml"), "<article><title>No date</title></article>").unwrap();

    let loaded = load_years(dir.path(), &["A.txt".to_string()]).unwrap();
    assert_eq!(loaded["A.txt"], 1990);

    let err = load_years(dir.path(), &["B.txt".to_string()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MetadataNotFound { .. })
    ));
}

// ============================================================
// Aggregation and series
// ============================================================

fn dated(document: &str, topic: usize, value: f64, year: i32) -> DatedGammaRow {
    DatedGammaRow {
        document: document.to_string(),
        topic,
        gamma: value,
        year,
    }
}

#[test]
fn yearly_means_average_documents() {
    let rows = vec![
        dated("A", 1, 0.9, 2000),
        dated("A", 2, 0.1, 2000),
        dated("B", 1, 0.5, 2000),
        dated("B", 2, 0.5, 2000),
        dated("C", 1, 0.2, 2002),
        dated("C", 2, 0.8, 2002),
    ];
    let means = aggregate_by_year(&rows);
    assert_eq!(
        means.iter().map(|m| (m.year, m.topic)).collect::<Vec<_>>(),
        vec![(2000, 1), (2000, 2), (2002, 1), (2002, 2)]
    );
    assert!((means[0].gamma - 0.7).abs() < 1e-12);
    assert!((means[1].gamma - 0.3).abs() < 1e-12);

    // Each year's means still sum to one when every document is a simplex.
    for year in [2000, 2002] {
        let total: f64 = means.iter().filter(|m| m.year == year).map(|m| m.gamma).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

#[test]
fn series_spans_observed_years() {
    let means: Vec<TopicYearMean> = [(1995, 0.1), (1996, 0.3), (1999, 0.6)]
        .into_iter()
        .map(|(year, g)| TopicYearMean {
            year,
            topic: 2,
            gamma: g,
        })
        .collect();
    let series = YearSeries::from_means(&means, 2, 2).unwrap();
    assert_eq!(series.start, 1995);
    assert_eq!(series.end(), 1999);
    assert_eq!(series.len(), 5);

    let points: Vec<(i32, f64)> = series.points().collect();
    assert_eq!(points[0], (1995, 0.1));
    assert!((points[3].1 - 0.5).abs() < 1e-12);
}

#[test]
fn short_series_cannot_be_decomposed() {
    let means: Vec<TopicYearMean> = (2000..2003)
        .map(|year| TopicYearMean {
            year,
            topic: 1,
            gamma: 0.5,
        })
        .collect();
    let series = YearSeries::from_means(&means, 1, 2).unwrap();
    assert!(matches!(
        series.decompose(),
        Err(PipelineError::SeriesTooShort { len: 3, needed: 4, .. })
    ));
    assert_eq!(series.autocorrelation(2), vec![1.0, 0.0, 0.0]);
}
