// Colored terminal output for topics, sweeps and yearly trends.
//
// This module handles all terminal-specific formatting: colors, tables,
// text bars. The main.rs command handlers delegate here.

use colored::{Color, Colorize};

use super::truncate_chars;
use crate::model::TopicTerms;
use crate::temporal::{by_year, TopicYearMean, YearSeries};
use crate::tuning::{Direction, SweepTable};

const TERM_BAR_WIDTH: usize = 30;
const TREND_BAR_WIDTH: usize = 60;
const ACF_BAR_WIDTH: usize = 20;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::Blue,
    Color::Red,
    Color::BrightCyan,
    Color::BrightMagenta,
];

/// Stable color for a 1-based topic number.
pub fn topic_color(topic: usize) -> Color {
    PALETTE[topic.saturating_sub(1) % PALETTE.len()]
}

/// Display the top terms of each topic as horizontal bars, scaled to the
/// topic's most probable term.
pub fn display_top_terms(topics: &[TopicTerms]) {
    if topics.is_empty() {
        println!("No topics to display.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Top Terms ({} topics) ===", topics.len()).bold()
    );

    for topic in topics {
        let color = topic_color(topic.topic);
        println!();
        println!(
            "  {}",
            format!("Topic {}: {}", topic.topic, topic.label())
                .color(color)
                .bold()
        );

        let max = topic.terms.iter().map(|(_, p)| *p).fold(0.0, f64::max);
        for (term, p) in &topic.terms {
            let width = if max > 0.0 {
                ((p / max) * TERM_BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            println!(
                "    {:<22} {:<30} {:.4}",
                truncate_chars(term, 19),
                "█".repeat(width).color(color),
                p
            );
        }
    }
    println!();
}

/// Display the sweep table: raw scores per candidate, the best candidate of
/// each metric marked, and the per-metric hints.
pub fn display_sweep(table: &SweepTable) {
    println!(
        "\n{}",
        format!(
            "=== Topic-Count Sweep ({} candidates) ===",
            table.candidates().len()
        )
        .bold()
    );
    println!();

    let mut header = format!("  {:>6}", "Topics".dimmed());
    for metric in table.metrics() {
        header.push_str(&format!("  {:>16}", metric.to_string().dimmed()));
    }
    println!("{header}");
    println!(
        "  {}",
        "-".repeat(6 + 18 * table.metrics().len()).dimmed()
    );

    for &k in table.candidates() {
        let mut line = format!("  {k:>6}");
        for &metric in table.metrics() {
            let cell = match table.score(metric, k) {
                Some(score) => format!("{score:>16.4}"),
                None => format!("{:>16}", "-"),
            };
            if table.hint(metric) == Some(k) {
                line.push_str(&format!("  {}", cell.green().bold()));
            } else {
                line.push_str(&format!("  {cell}"));
            }
        }
        println!("{line}");
    }

    println!();
    for &metric in table.metrics() {
        let direction = match metric.direction() {
            Direction::Maximize => "maximize",
            Direction::Minimize => "minimize",
        };
        match table.hint(metric) {
            Some(k) => println!("  {metric:<14} ({direction}): best at K = {}", k.to_string().bold()),
            None => println!("  {metric:<14} ({direction}): no score"),
        }
    }
    println!(
        "\n{}",
        "Hints are advisory. Choose K, then run `topictrend topics --topics K`.".dimmed()
    );
}

/// Split `width` columns among non-negative values in proportion to their
/// share of the total. Rounds cumulatively, so the widths always sum to
/// `width` unless every value is zero.
pub fn stacked_widths(values: &[f64], width: usize) -> Vec<usize> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 {
        return vec![0; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut cumulative = 0.0;
    let mut drawn = 0;
    for v in values {
        cumulative += v.max(0.0);
        let end = ((cumulative / total) * width as f64).round() as usize;
        out.push(end.saturating_sub(drawn));
        drawn = drawn.max(end);
    }
    out
}

/// Stream-style view of topic prevalence: one stacked bar per year, each
/// topic's segment proportional to its mean gamma in that year.
pub fn display_yearly_trends(means: &[TopicYearMean], topics: &[TopicTerms]) {
    let years = by_year(means);
    if years.is_empty() {
        println!("No yearly means to display.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topic Prevalence by Year ({} years) ===", years.len()).bold()
    );
    println!();

    for topic in topics {
        println!("  {}", legend_entry(topic));
    }
    println!();

    for (year, values) in &years {
        let gammas: Vec<f64> = values.iter().map(|(_, g)| *g).collect();
        let widths = stacked_widths(&gammas, TREND_BAR_WIDTH);

        let mut bar = String::new();
        for ((topic, _), w) in values.iter().zip(&widths) {
            bar.push_str(&"█".repeat(*w).color(topic_color(*topic)).to_string());
        }

        let dominant = values.iter().max_by(|a, b| a.1.total_cmp(&b.1));
        let suffix = dominant
            .map(|(t, g)| format!("top: {t} ({g:.2})"))
            .unwrap_or_default();
        println!("  {year}  {bar}  {}", suffix.dimmed());
    }
    println!();
}

/// Autocorrelation bars and, when the series is long enough, the classical
/// decomposition table for one topic's yearly series.
pub fn display_series_diagnostics(series: &YearSeries, max_lag: usize) {
    println!(
        "\n{}",
        format!(
            "=== Topic {} series {}-{} ({} points) ===",
            series.topic,
            series.start,
            series.end(),
            series.len()
        )
        .bold()
    );

    // Approximate 95% bound for white noise.
    let bound = 1.96 / (series.len() as f64).sqrt();
    println!("\n  Autocorrelation (|r| > {bound:.2} marked):");
    for (lag, r) in series.autocorrelation(max_lag).iter().enumerate().skip(1) {
        let width = (r.abs() * ACF_BAR_WIDTH as f64).round() as usize;
        let bar = "█".repeat(width);
        let bar = if *r >= 0.0 { bar.green() } else { bar.red() };
        let mark = if r.abs() > bound { "*" } else { " " };
        println!("    lag {lag:>2}  {r:>6.2} {mark} {bar}");
    }

    match series.decompose() {
        Ok(d) => {
            println!(
                "\n  {:>6}  {:>8}  {:>8}  {:>8}  {:>9}",
                "Year".dimmed(),
                "Value".dimmed(),
                "Trend".dimmed(),
                "Seasonal".dimmed(),
                "Remainder".dimmed()
            );
            for (i, (year, value)) in series.points().enumerate() {
                println!(
                    "  {year:>6}  {value:>8.4}  {:>8}  {:>8.4}  {:>9}",
                    fmt_optional(d.trend[i]),
                    d.seasonal[i],
                    fmt_optional(d.remainder[i])
                );
            }
        }
        Err(e) => println!("\n  {}", format!("Decomposition skipped: {e}").dimmed()),
    }
}

/// Documents removed because no term survived sparsity reduction.
pub fn display_dropped_documents(dropped: &[String]) {
    if dropped.is_empty() {
        return;
    }
    println!(
        "  {} {} documents had no terms left and were dropped:",
        "!".yellow(),
        dropped.len()
    );
    for id in dropped {
        println!("    {}", id.dimmed());
    }
}

/// Colored swatch and topic number, followed by the label when the topic
/// has terms.
fn legend_entry(topic: &TopicTerms) -> String {
    let swatch = "■".color(topic_color(topic.topic));
    if topic.terms.is_empty() {
        return format!("{swatch} Topic {}", topic.topic);
    }
    format!(
        "{swatch} Topic {:<3} {}",
        topic.topic,
        truncate_chars(&topic.label(), 48).dimmed()
    )
}

fn fmt_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacked_widths_fill_the_bar() {
        let widths = stacked_widths(&[0.2, 0.3, 0.1], 60);
        assert_eq!(widths.iter().sum::<usize>(), 60);
        assert_eq!(widths, vec![20, 30, 10]);

        let uneven = stacked_widths(&[1.0, 1.0, 1.0], 10);
        assert_eq!(uneven.iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_stacked_widths_all_zero() {
        assert_eq!(stacked_widths(&[0.0, 0.0], 10), vec![0, 0]);
    }

    #[test]
    fn test_topic_colors_cycle() {
        assert_eq!(topic_color(1), topic_color(1 + PALETTE.len()));
        assert_ne!(topic_color(1), topic_color(2));
    }

    #[test]
    fn test_legend_without_terms_has_no_label() {
        colored::control::set_override(false);
        let bare = TopicTerms {
            topic: 4,
            terms: Vec::new(),
        };
        assert_eq!(legend_entry(&bare), "■ Topic 4");

        let labelled = TopicTerms {
            topic: 4,
            terms: vec![("grain".into(), 0.4), ("harbour".into(), 0.3)],
        };
        assert_eq!(legend_entry(&labelled), "■ Topic 4   grain / harbour");
    }
}
