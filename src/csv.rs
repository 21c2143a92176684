// src/csv.rs
//
// Snapshot file codec. The column set and order below are the contract
// downstream aggregators consume; change nothing here lightly.

use std::io::{self, Write};
use std::mem::take;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{MetricRecord, Snapshot};

pub const SNAPSHOT_COLUMNS: [&str; 8] = [
    "jurisdiction",
    "date",
    "vaccine",
    "source_url",
    "total_vaccinations",
    "people_vaccinated",
    "people_fully_vaccinated",
    "total_boosters",
];

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant). Vaccine lists contain
/// commas, so quote handling is not optional here.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !row.is_empty() && !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/* ---------------- Record codec ---------------- */

pub fn encode_snapshot(snapshot: &Snapshot) -> String {
    let mut buf: Vec<u8> = Vec::new();

    let header: Vec<String> = SNAPSHOT_COLUMNS.iter().map(|c| s!(*c)).collect();
    let _ = write_row(&mut buf, &header);

    for r in &snapshot.records {
        let row = vec![
            r.jurisdiction.clone(),
            r.date.format("%Y-%m-%d").to_string(),
            r.vaccine.clone(),
            r.source_url.clone(),
            r.total_vaccinations.to_string(),
            opt_cell(r.people_vaccinated),
            opt_cell(r.people_fully_vaccinated),
            opt_cell(r.total_boosters),
        ];
        let _ = write_row(&mut buf, &row);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

pub fn decode_snapshot(text: &str) -> Result<Vec<MetricRecord>> {
    let mut rows = parse_rows(text).into_iter();

    let header = rows
        .next()
        .ok_or_else(|| Error::Parse(s!("snapshot file is empty")))?;
    if header != SNAPSHOT_COLUMNS {
        return Err(Error::Parse(format!(
            "snapshot header mismatch: {}",
            header.join(",")
        )));
    }

    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.len() != SNAPSHOT_COLUMNS.len() {
            return Err(Error::Parse(format!(
                "snapshot row {} has {} cells",
                i + 2,
                row.len()
            )));
        }
        out.push(MetricRecord {
            jurisdiction: row[0].clone(),
            date: parse_date_cell(&row[1])?,
            vaccine: row[2].clone(),
            source_url: row[3].clone(),
            total_vaccinations: parse_u64_cell(&row[4], "total_vaccinations")?
                .ok_or_else(|| Error::Parse(format!("row {}: empty total_vaccinations", i + 2)))?,
            people_vaccinated: parse_u64_cell(&row[5], "people_vaccinated")?,
            people_fully_vaccinated: parse_u64_cell(&row[6], "people_fully_vaccinated")?,
            total_boosters: parse_u64_cell(&row[7], "total_boosters")?,
        });
    }
    Ok(out)
}

fn opt_cell(v: Option<u64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn parse_date_cell(cell: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .map_err(|_| Error::Parse(format!("bad snapshot date: {cell:?}")))
}

/// Empty cell = absent, which is not the same thing as zero.
fn parse_u64_cell(cell: &str, column: &str) -> Result<Option<u64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<u64>()
        .map(Some)
        .map_err(|_| Error::Parse(format!("bad {column} cell: {cell:?}")))
}
