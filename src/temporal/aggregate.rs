// Mean topic proportion per (year, topic).
//
// Per-year sums across topics are not enforced. They come to 1 only when every
// document of that year carries a row for all K topics, since each topic mean
// then averages over the same set of documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metadata::DatedGammaRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicYearMean {
    pub year: i32,
    pub topic: usize,
    pub gamma: f64,
}

/// Arithmetic mean of gamma grouped by (year, topic), sorted by year then
/// topic.
pub fn aggregate_by_year(rows: &[DatedGammaRow]) -> Vec<TopicYearMean> {
    let mut groups: BTreeMap<(i32, usize), (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry((row.year, row.topic)).or_insert((0.0, 0));
        entry.0 += row.gamma;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year, topic), (sum, count))| TopicYearMean {
            year,
            topic,
            gamma: sum / count as f64,
        })
        .collect()
}

/// Group means by year: year -> [(topic, mean gamma)] in topic order.
pub fn by_year(means: &[TopicYearMean]) -> BTreeMap<i32, Vec<(usize, f64)>> {
    let mut out: BTreeMap<i32, Vec<(usize, f64)>> = BTreeMap::new();
    for m in means {
        out.entry(m.year).or_default().push((m.topic, m.gamma));
    }
    for topics in out.values_mut() {
        topics.sort_by_key(|(t, _)| *t);
    }
    out
}
