// Text renderings of comparison and sweep results.

use std::fmt::Display;

use serde::Serialize;

use crate::bench::{Comparison, SweepPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Human-readable lines
    #[default]
    Table,
    /// Tagged CSV lines, one metric per line
    Csv,
    /// Pretty-printed JSON document
    Json,
}

pub fn render_comparison<A: Display + Serialize>(
    cmp: &Comparison<A>,
    format: Format,
) -> Result<String, serde_json::Error> {
    let lines = match format {
        Format::Table => {
            let speedup = match cmp.speedup {
                Some(speedup) => format!("Speedup: {:.2}x", speedup),
                None => "Speedup: n/a".to_string(),
            };
            vec![
                format!(
                    "Sequential Sum: {}, Time: {:.4} seconds",
                    cmp.sequential.total,
                    cmp.sequential.elapsed_secs()
                ),
                format!(
                    "Parallel Sum with {} threads: {}, Time: {:.4} seconds",
                    cmp.threads,
                    cmp.parallel.total,
                    cmp.parallel.elapsed_secs()
                ),
                speedup,
            ]
        }
        Format::Csv => {
            let tag = format!(
                "vsum,compare,N={},T={},strategy={}",
                cmp.size, cmp.threads, cmp.strategy
            );
            vec![
                format!("{},sequential_time,{:.6},sec", tag, cmp.sequential.elapsed_secs()),
                format!("{},parallel_time,{:.6},sec", tag, cmp.parallel.elapsed_secs()),
                format!("{},sum,{},value", tag, cmp.parallel.total),
                // compare() only returns matching totals
                format!("{},correct,1,boolean", tag),
            ]
        }
        Format::Json => vec![serde_json::to_string_pretty(cmp)?],
    };
    Ok(join_lines(lines))
}

/// Sweep results. The table form has one row per size and one column per
/// thread count.
pub fn render_sweep(points: &[SweepPoint], format: Format) -> Result<String, serde_json::Error> {
    let lines = match format {
        Format::Table => sweep_table(points),
        Format::Csv => points
            .iter()
            .map(|p| {
                format!(
                    "vsum,sweep,N={},T={},strategy={},time,{:.6},sec",
                    p.size, p.threads, p.strategy, p.elapsed_secs
                )
            })
            .collect(),
        Format::Json => vec![serde_json::to_string_pretty(points)?],
    };
    Ok(join_lines(lines))
}

fn sweep_table(points: &[SweepPoint]) -> Vec<String> {
    let sizes = unique_in_order(points.iter().map(|p| p.size));
    let threads = unique_in_order(points.iter().map(|p| p.threads));

    let mut header = format!("{:>10}", "N \\ T");
    for t in &threads {
        header.push_str(&format!(" {:>10}", t));
    }

    let mut lines = vec![
        "Execution Time vs Number of Threads (seconds)".to_string(),
        header,
        "-".repeat(10 + 11 * threads.len()),
    ];

    for &n in &sizes {
        let mut row = format!("{:>10}", n);
        for &t in &threads {
            match points.iter().find(|p| p.size == n && p.threads == t) {
                Some(p) => row.push_str(&format!(" {:>10.6}", p.elapsed_secs)),
                None => row.push_str(&format!(" {:>10}", "-")),
            }
        }
        lines.push(row);
    }
    lines
}

fn join_lines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

fn unique_in_order(values: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}
