use anyhow::{anyhow, Context};
use csv::StringRecord;
use domain::models::{ReviewRow, RewrittenRow};
use shared::types::Result;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const OUTPUT_HEADERS: [&str; 6] = [
    "dateUpdated",
    "reviews.rating",
    "reviews.title",
    "reviews.text",
    "what-to-run",
    "result",
];

pub fn read_reviews(path: &Path) -> Result<Vec<ReviewRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_reviews_from(file).with_context(|| format!("reading reviews from {}", path.display()))
}

/// Accepted header names per field, preferred first.
const DATE_COLUMNS: [&str; 1] = ["dateUpdated"];
const RATING_COLUMNS: [&str; 2] = ["reviews.rating", "rating"];
const TITLE_COLUMNS: [&str; 2] = ["reviews.title", "title"];
const TEXT_COLUMNS: [&str; 2] = ["reviews.text", "text"];

/// Positions of the review fields in a CSV header.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReviewColumns {
    date_updated: usize,
    rating: usize,
    title: usize,
    text: usize,
}

impl ReviewColumns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            date_updated: find_column(headers, &DATE_COLUMNS)?,
            rating: find_column(headers, &RATING_COLUMNS)?,
            title: find_column(headers, &TITLE_COLUMNS)?,
            text: find_column(headers, &TEXT_COLUMNS)?,
        })
    }

    fn row(&self, record: &StringRecord) -> ReviewRow {
        let field = |index: usize| record.get(index).unwrap_or("").to_string();
        ReviewRow {
            date_updated: field(self.date_updated),
            rating: field(self.rating),
            title: field(self.title),
            text: field(self.text),
        }
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Result<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|header| header.trim() == *name))
        .ok_or_else(|| anyhow!("missing column {}", names.join(" or ")))
}

/// Reads review rows by header name. `reviews.*` columns win over their
/// short names; other columns are ignored.
pub fn read_reviews_from<R: Read>(reader: R) -> Result<Vec<ReviewRow>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ReviewColumns::resolve(rdr.headers()?)?;
    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("bad review row {}", line + 1))?;
        rows.push(columns.row(&record));
    }
    Ok(rows)
}

pub fn write_rewritten(path: &Path, rows: &[RewrittenRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_rewritten_to(file, rows)
}

/// Writes the header even for an empty batch.
pub fn write_rewritten_to<W: Write>(writer: W, rows: &[RewrittenRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(OUTPUT_HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
