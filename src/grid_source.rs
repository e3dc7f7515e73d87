//! Loading schedule sheets as text grids for the scanner.
//!
//! A source is either an `http(s)://` URL (typically a sheet published as
//! CSV) or a local file path. Rows may have different lengths; there is no
//! header row, every record is data.

use anyhow::{bail, Context, Result};
use std::path::Path;

pub type Grid = Vec<Vec<String>>;

pub async fn load_grid(source: &str) -> Result<Grid> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_csv(source).await?
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read grid file: {}", source))?
    };
    parse_csv(&text)
}

async fn fetch_csv(url: &str) -> Result<String> {
    tracing::debug!(url, "fetching grid");
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch CSV: {}", url))?;
    let status = response.status();
    if !status.is_success() {
        bail!("Failed to fetch CSV: {} returned {}", url, status);
    }
    Ok(response.text().await?)
}

pub fn parse_csv(text: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at record {}", i + 1))?;
        grid.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(grid)
}
