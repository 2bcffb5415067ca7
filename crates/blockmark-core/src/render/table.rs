// SPDX-License-Identifier: AGPL-3.0-or-later
//! Table layout and bordered pipe-table output
//!
//! The first row is the header. Merged cells are not modelled; every cell
//! position is laid out on its own.

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Body cells matching this are right-aligned; percentages are not
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d{1,3}(?:,\d{3})*|\d+)(?:\.\d+)?$").expect("valid decimal pattern")
});

/// Group row-major cells into rows of `column_count`
///
/// Cell `i` lands in row `i / column_count`; a short final row is kept short.
pub fn layout_rows(cells: Vec<String>, column_count: usize) -> Vec<Vec<String>> {
    if column_count == 0 {
        return Vec::new();
    }
    cells
        .chunks(column_count)
        .map(<[String]>::to_vec)
        .collect()
}

/// Render rows as a pipe table with a header separator line
pub fn render_table(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut output = String::new();
    push_row(&mut output, header, &widths, |cell, width| {
        pad_center(cell, width)
    });

    output.push('|');
    for width in &widths {
        output.push_str(&"-".repeat(width + 2));
        output.push('|');
    }
    output.push('\n');

    for row in body {
        push_row(&mut output, row, &widths, |cell, width| {
            if is_numeric(cell) {
                pad_left(cell, width)
            } else {
                pad_right(cell, width)
            }
        });
    }

    output
}

fn push_row(
    output: &mut String,
    row: &[String],
    widths: &[usize],
    align: impl Fn(&str, usize) -> String,
) {
    output.push('|');
    for (i, width) in widths.iter().enumerate() {
        let cell = row.get(i).map(String::as_str).unwrap_or_default();
        output.push(' ');
        output.push_str(&align(cell, *width));
        output.push_str(" |");
    }
    output.push('\n');
}

/// Terminal columns taken by `s`: wide (CJK) graphemes count two
fn display_width(s: &str) -> usize {
    s.graphemes(true).map(UnicodeWidthStr::width).sum()
}

fn is_numeric(cell: &str) -> bool {
    DECIMAL.is_match(cell.trim())
}

fn pad_center(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    let left = gap / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(gap - left))
}

fn pad_left(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    format!("{}{}", " ".repeat(gap), s)
}

fn pad_right(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(gap))
}
