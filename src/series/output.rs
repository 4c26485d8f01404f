use crate::cli::CommonArgs;
use crate::model::{Series, SeriesOutput, SCHEMA_VERSION};
use crate::timeline::SeriesOptions;
use crate::util::format_day;
use anyhow::Result;
use chrono::Utc;
use console::style;
use serde_json::{Map, Value};

const BAR_WIDTH: u64 = 40;

pub fn output_json(
    series: &Series,
    common: &CommonArgs,
    options: SeriesOptions,
) -> Result<()> {
    let output = SeriesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repositories: series.repositories.clone(),
        by_language: options.by_language,
        include_comments: options.include_comments,
        sparse: options.sparse,
        since: common.since.clone(),
        until: common.until.clone(),
        columns: series.columns.clone(),
        rows: series.rows.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One object per row, keyed by column name.
pub fn ndjson_lines(series: &Series) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(series.rows.len());
    for row in &series.rows {
        let mut object = Map::new();
        object.insert("timestamp".to_string(), Value::from(row.timestamp));
        object.insert("date".to_string(), Value::from(format_day(row.timestamp)));
        for (column, value) in series.columns.iter().zip(&row.values) {
            object.insert(column.clone(), Value::from(*value));
        }
        lines.push(serde_json::to_string(&Value::Object(object))?);
    }
    Ok(lines)
}

pub fn output_ndjson(series: &Series) -> Result<()> {
    for line in ndjson_lines(series)? {
        println!("{line}");
    }
    Ok(())
}

pub fn csv_lines(series: &Series) -> Vec<String> {
    let mut header = vec!["timestamp".to_string(), "date".to_string()];
    header.extend(series.columns.iter().map(|c| csv_field(c)));

    let mut lines = vec![header.join(",")];
    for row in &series.rows {
        let mut fields = vec![row.timestamp.to_string(), format_day(row.timestamp)];
        fields.extend(row.values.iter().map(u64::to_string));
        lines.push(fields.join(","));
    }
    lines
}

pub fn output_csv(series: &Series) -> Result<()> {
    for line in csv_lines(series) {
        println!("{line}");
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn output_table(series: &Series) -> Result<()> {
    if series.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    println!(
        "{} {}",
        style("Lines of code over time").bold(),
        style(format!("({})", series.repositories.join(", "))).dim()
    );

    let widths: Vec<usize> = series.columns.iter().map(|c| c.len().max(10)).collect();
    let mut header = format!("{:<10}", style("Date").bold());
    for (column, width) in series.columns.iter().zip(&widths) {
        header.push_str(&format!(" {:>width$}", style(column).bold(), width = *width));
    }
    println!("{header}");
    println!("{}", "─".repeat(11 + widths.iter().map(|w| w + 1).sum::<usize>() + BAR_WIDTH as usize));

    let max = series
        .rows
        .iter()
        .filter_map(|r| r.values.last())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);

    for row in &series.rows {
        let mut line = format!("{:<10}", format_day(row.timestamp));
        for (value, width) in row.values.iter().zip(&widths) {
            line.push_str(&format!(" {:>width$}", value, width = *width));
        }
        let last = row.values.last().copied().unwrap_or(0);
        let bar = "█".repeat((last * BAR_WIDTH / max) as usize);
        println!("{line} {}", style(bar).green());
    }

    println!("\n{} points", style(series.rows.len()).cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeriesRow;
    use pretty_assertions::assert_eq;

    fn series() -> Series {
        Series {
            repositories: vec!["widget".to_string()],
            columns: vec!["Code".to_string(), "Comments".to_string()],
            rows: vec![
                SeriesRow { timestamp: 86_400, values: vec![10, 12] },
                SeriesRow { timestamp: 172_800, values: vec![15, 17] },
            ],
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        assert_eq!(
            csv_lines(&series()),
            vec![
                "timestamp,date,Code,Comments".to_string(),
                "86400,1970-01-02,10,12".to_string(),
                "172800,1970-01-03,15,17".to_string(),
            ]
        );
    }

    #[test]
    fn csv_quotes_awkward_column_names() {
        assert_eq!(csv_field("C, sharp"), "\"C, sharp\"");
        assert_eq!(csv_field("Rust"), "Rust");
    }

    #[test]
    fn ndjson_rows_are_keyed_by_column() {
        let lines = ndjson_lines(&series()).unwrap();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["timestamp"], 86_400);
        assert_eq!(first["date"], "1970-01-02");
        assert_eq!(first["Code"], 10);
        assert_eq!(first["Comments"], 12);
    }
}
