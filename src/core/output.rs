//! Output rendering shared by every subcommand
//!
//! Humans get aligned tables on stdout; `--output json` and `--output csv`
//! serialize the same data structures, so the three renderings cannot drift.

use std::io;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// A titled list of label/value pairs - the shape most inspection
/// commands produce.
pub struct Report {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn add(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((label.into(), value.into()));
        self
    }

    /// Print as an aligned two-column table.
    pub fn print(&self) {
        println!("{}", self.title);
        let width = self
            .fields
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);
        for (label, value) in &self.fields {
            println!("  {:<width$}  {}", label, value, width = width);
        }
    }

    /// Print as `field,value` CSV rows.
    pub fn print_csv(&self) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        wtr.write_record(["field", "value"])?;
        for (label, value) in &self.fields {
            wtr.write_record([label, value])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Pretty-print any serializable value as JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write serializable rows as CSV to stdout, header included.
pub fn print_csv_rows<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Print a columnar table with a header row, columns sized to content.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let line = |cells: &[String]| {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("{:<width$}", cell, width = widths[i]));
        }
        println!("{}", out.trim_end());
    };

    line(&headers.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    line(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>());
    for row in rows {
        line(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_builds_in_order() {
        let report = Report::new("Pool")
            .add("address", "0xabc")
            .add("fee", "3000");
        assert_eq!(report.fields.len(), 2);
        assert_eq!(report.fields[0].0, "address");
        assert_eq!(report.fields[1].1, "3000");
    }
}
