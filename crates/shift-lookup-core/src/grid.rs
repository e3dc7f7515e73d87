//! Grid scanner over rectangular tables of text cells.
//!
//! Given a schedule sheet as rows of strings, [`search_in_grid`] finds every
//! cell containing the search term and rebuilds a shift line from cells at
//! fixed offsets around the match.
//!
//! # Component Offsets
//!
//! | Field | Source cell | Meaning |
//! |-------|-------------|---------|
//! | A | `(r, c)` | The matched cell itself |
//! | B | `(primary_header_row, c)` | Column header |
//! | C | `(secondary_header_row, c)` | Column sub-header |
//! | D | `(r + 1, c)` | Cell below the match |
//! | E | `(r, c + 1)` | Cell right of the match |
//! | F | `(r + 2, c)` | Shift start |
//! | G | `(r + 2, c + 1)` | Shift end |
//! | H | `(r + 3, c)` | Trailing note |
//! | I | `title_cell` | Sheet-wide title |
//! | J | `subtitle_cell` | Sheet-wide subtitle |
//!
//! Offsets that fall outside the table resolve to `""`; they are never an
//! error. Rows may have different lengths.
//!
//! The formatted line is `I - J - D - B (C) - E - Ca từ F đến G - H`.

use serde::Serialize;

/// Fixed positions of header and sheet-wide cells in a schedule sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// `(row, col)` of the sheet title (I).
    pub title_cell: (usize, usize),
    /// `(row, col)` of the sheet subtitle (J).
    pub subtitle_cell: (usize, usize),
    /// Row holding the column header (B).
    pub primary_header_row: usize,
    /// Row holding the column sub-header (C).
    pub secondary_header_row: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            title_cell: (0, 1),
            subtitle_cell: (2, 1),
            primary_header_row: 5,
            secondary_header_row: 4,
        }
    }
}

/// The ten named cells extracted around a match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct MatchComponents {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub e: String,
    pub f: String,
    pub g: String,
    pub h: String,
    pub i: String,
    pub j: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    pub row: usize,
    pub col: usize,
}

/// A single matching cell and the shift line built around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub raw: String,
    pub formatted: String,
    pub components: MatchComponents,
    pub coordinates: Coordinates,
}

/// Bounds-checked cell access. Missing rows and columns read as `""`.
pub fn cell<S: AsRef<str>>(grid: &[Vec<S>], row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map(|s| s.as_ref())
        .unwrap_or("")
}

/// Resolve a header that may sit in a merged cell.
///
/// Scans `row` leftwards from `col` down to column 0 and returns the first
/// non-blank cell, trimmed. Returns `""` if the row does not exist or every
/// candidate is blank.
pub fn find_header_value<S: AsRef<str>>(grid: &[Vec<S>], row: usize, col: usize) -> String {
    let Some(cells) = grid.get(row) else {
        return String::new();
    };
    (0..=col)
        .rev()
        .filter_map(|c| cells.get(c))
        .map(|v| v.as_ref().trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Scan `grid` with the default [`GridLayout`].
pub fn search_in_grid<S: AsRef<str>>(grid: &[Vec<S>], term: &str) -> Vec<MatchResult> {
    search_in_grid_with(grid, term, &GridLayout::default())
}

/// Find every cell containing `term` (case-insensitive) in row-major order.
///
/// The term is trimmed first; an empty or whitespace-only term yields no
/// matches. Identical text in different cells is reported once per cell.
pub fn search_in_grid_with<S: AsRef<str>>(
    grid: &[Vec<S>],
    term: &str,
    layout: &GridLayout,
) -> Vec<MatchResult> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let i = cell(grid, layout.title_cell.0, layout.title_cell.1);
    let j = cell(grid, layout.subtitle_cell.0, layout.subtitle_cell.1);

    let mut results = Vec::new();
    for (r, row) in grid.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let raw = value.as_ref();
            if !raw.to_lowercase().contains(&needle) {
                continue;
            }

            let components = MatchComponents {
                a: raw.to_string(),
                b: cell(grid, layout.primary_header_row, c).to_string(),
                c: cell(grid, layout.secondary_header_row, c).to_string(),
                d: cell(grid, r + 1, c).to_string(),
                e: cell(grid, r, c + 1).to_string(),
                f: cell(grid, r + 2, c).to_string(),
                g: cell(grid, r + 2, c + 1).to_string(),
                h: cell(grid, r + 3, c).to_string(),
                i: i.to_string(),
                j: j.to_string(),
            };

            results.push(MatchResult {
                raw: raw.to_string(),
                formatted: format_shift(&components),
                components,
                coordinates: Coordinates { row: r, col: c },
            });
        }
    }
    results
}

fn format_shift(p: &MatchComponents) -> String {
    format!(
        "{} - {} - {} - {} ({}) - {} - Ca từ {} đến {} - {}",
        p.i, p.j, p.d, p.b, p.c, p.e, p.f, p.g, p.h
    )
}
