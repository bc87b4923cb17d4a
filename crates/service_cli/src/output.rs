//! Rendering command results as a box-drawn table, JSON or CSV.
//!
//! Commands collect flat record structs and hand them to [`emit`].

use std::io::Write;

use serde::Serialize;

use crate::config::OutputFormat;
use crate::Result;

/// A flat record that can be shown as a table row.
pub trait Tabular {
    /// Column headers, in display order.
    fn headers() -> &'static [&'static str];
    /// Cell text for this record, one per header.
    fn cells(&self) -> Vec<String>;
}

/// Format an optional float with two decimals, or `-`.
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Write `records` to `out` in `format`.
pub fn write_records<T, W>(out: &mut W, records: &[T], format: OutputFormat) -> Result<()>
where
    T: Tabular + Serialize,
    W: Write,
{
    match format {
        OutputFormat::Table => write_table(out, records)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut *out);
            if records.is_empty() {
                writer.write_record(T::headers())?;
            }
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

/// Write `records` to stdout.
pub fn emit<T: Tabular + Serialize>(records: &[T], format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    write_records(&mut lock, records, format)
}

fn write_table<T: Tabular, W: Write>(out: &mut W, records: &[T]) -> std::io::Result<()> {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = records.iter().map(Tabular::cells).collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {:<width$} ", cell, width = w)
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    writeln!(out, "{}", rule("┌", "┬", "┐"))?;
    writeln!(out, "{}", line(header_cells.as_slice()))?;
    writeln!(out, "{}", rule("├", "┼", "┤"))?;
    if rows.is_empty() {
        writeln!(out, "{}", line(&["(no data)".to_string()][..]))?;
    }
    for row in &rows {
        writeln!(out, "{}", line(row.as_slice()))?;
    }
    writeln!(out, "{}", rule("└", "┴", "┘"))?;
    Ok(())
}
