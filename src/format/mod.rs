//! Output formatting for comparison reports and catalog listings
//! (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::pricing::{ComparisonRecord, SOURCE_REGION, TARGET_REGION};
use crate::steam::CatalogEntry;
use anyhow::{Context, Result};
use std::path::Path;

/// Formats records and entries for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats ranked comparison records.
    pub fn format_records(&self, records: &[ComparisonRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header(),
                _ => "No games with prices in both regions.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => Self::csv_records(records),
        }
    }

    /// Formats a catalog listing.
    pub fn format_entries(&self, entries: &[CatalogEntry]) -> String {
        if entries.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => "id,name".to_string(),
                _ => "No catalog entries found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => {
                let mut lines = Vec::new();
                lines.push(format!("{:<10}  {}", "App ID", "Name"));
                lines.push(format!("{:-<10}  {:-<50}", "", ""));
                for entry in entries {
                    lines.push(format!("{:<10}  {}", entry.id, entry.name));
                }
                lines.push(String::new());
                lines.push(format!("Total: {} entries", entries.len()));
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = Vec::new();
                lines.push("| App ID | Name |".to_string());
                lines.push("|--------|------|".to_string());
                for entry in entries {
                    lines.push(format!("| {} | {} |", entry.id, entry.name.replace('|', "\\|")));
                }
                lines.join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec!["id,name".to_string()];
                for entry in entries {
                    lines.push(format!("{},{}", entry.id, Self::csv_escape(&entry.name)));
                }
                lines.join("\n")
            }
        }
    }

    // Table formatting

    fn table_records(&self, records: &[ComparisonRecord]) -> String {
        let name_width = 40;
        let amount_width = 16;

        let source_header = format!("{} ({})", SOURCE_REGION.label(), SOURCE_REGION.symbol());
        let converted_header = format!("{} ({})", SOURCE_REGION.label(), TARGET_REGION.symbol());
        let target_header = format!("{} ({})", TARGET_REGION.label(), TARGET_REGION.symbol());
        let savings_header = format!("Savings ({})", TARGET_REGION.symbol());

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<name_width$}  {:>amount_width$}  {:>amount_width$}  {:>amount_width$}  {:>amount_width$}  {:>8}",
            "Name", source_header, converted_header, target_header, savings_header, "%"
        ));
        lines.push(format!(
            "{:-<name_width$}  {:-<amount_width$}  {:-<amount_width$}  {:-<amount_width$}  {:-<amount_width$}  {:-<8}",
            "", "", "", "", "", ""
        ));

        for record in records {
            lines.push(format!(
                "{:<name_width$}  {:>amount_width$}  {:>amount_width$}  {:>amount_width$}  {:>amount_width$}  {:>7.2}%",
                truncate(&record.name, name_width),
                format_amount(record.source_price.final_price),
                format_amount(record.source_converted),
                format_amount(record.target_price.final_price),
                format_amount(record.difference),
                record.difference_percent
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} games, sorted by savings", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[ComparisonRecord]) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "| Name | {ua} ({ua_sym}) | {ua} ({id_sym}) | {id} ({id_sym}) | Savings ({id_sym}) | % |",
            ua = SOURCE_REGION.label(),
            ua_sym = SOURCE_REGION.symbol(),
            id = TARGET_REGION.label(),
            id_sym = TARGET_REGION.symbol()
        ));
        lines.push("|------|------|------|------|------|---|".to_string());

        for record in records {
            lines.push(format!(
                "| [{}](https://store.steampowered.com/app/{}) | {} | {} | {} | {} | {:.2}% |",
                record.name.replace('|', "\\|"),
                record.app_id,
                format_amount(record.source_price.final_price),
                format_amount(record.source_converted),
                format_amount(record.target_price.final_price),
                format_amount(record.difference),
                record.difference_percent
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} games compared*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header() -> String {
        format!(
            "Name,{ua} Price ({ua_cur}),{ua} Price ({id_cur}),{id} Price ({id_cur}),Savings ({id_cur}),Savings %",
            ua = SOURCE_REGION.label(),
            ua_cur = SOURCE_REGION.currency(),
            id = TARGET_REGION.label(),
            id_cur = TARGET_REGION.currency()
        )
    }

    fn csv_records(records: &[ComparisonRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(Self::csv_header());

        for record in records {
            let fields = [
                Self::csv_escape(&record.name),
                Self::csv_escape(&format_amount(record.source_price.final_price)),
                Self::csv_escape(&format_amount(record.source_converted)),
                Self::csv_escape(&format_amount(record.target_price.final_price)),
                Self::csv_escape(&format_amount(record.difference)),
                Self::csv_escape(&format_amount(record.difference_percent)),
            ];
            lines.push(fields.join(","));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Writes the CSV report to `path`.
pub fn write_csv(path: &Path, records: &[ComparisonRecord]) -> Result<()> {
    let mut csv = Formatter::new(OutputFormat::Csv).format_records(records);
    csv.push('\n');
    std::fs::write(path, csv)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Formats an amount with thousands separators and two decimals, e.g. `1,234.50`.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Shortens `s` to at most `width` characters, ending in `...` when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
