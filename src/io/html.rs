/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! HTML rendering of result tables

use super::errors::Result;
use crate::mapping::table::CELL_FIELDS;
use crate::mapping::{BestMatchTable, ResultTable};
use std::fmt::Write;

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a result table with one column group per parent
pub fn result_table_to_html(table: &ResultTable) -> Result<String> {
    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n      <th></th>\n");
    for label in table.column_labels() {
        writeln!(
            html,
            "      <th colspan=\"{}\" halign=\"left\">{}</th>",
            CELL_FIELDS.len(),
            escape(label)
        )?;
    }
    html.push_str("    </tr>\n    <tr>\n      <th></th>\n");
    for _ in table.column_labels() {
        for field in CELL_FIELDS {
            writeln!(html, "      <th>{}</th>", field)?;
        }
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for (label, cells) in table.rows() {
        html.push_str("    <tr>\n");
        writeln!(html, "      <th>{}</th>", escape(label))?;
        for cell in cells {
            writeln!(html, "      <td>{}</td>", cell.atomic_cost)?;
            writeln!(html, "      <td>{}</td>", cell.lattice_cost)?;
            writeln!(html, "      <td>{}</td>", cell.total_cost)?;
            writeln!(html, "      <td>{}</td>", escape(&cell.record.to_string()))?;
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    Ok(html)
}

/// Render the best parent of every child
pub fn best_match_table_to_html(table: &BestMatchTable) -> Result<String> {
    let mut html = String::new();
    html.push_str("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n      <th></th>\n");
    for header in ["Best parent map name", "Best parent mapping object", "Conflicting maps"] {
        writeln!(html, "      <th>{}</th>", header)?;
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for (label, entry) in table.rows() {
        html.push_str("    <tr>\n");
        writeln!(html, "      <th>{}</th>", escape(label))?;
        writeln!(html, "      <td>{}</td>", escape(&entry.best_parent_id))?;
        writeln!(html, "      <td>{}</td>", escape(&entry.best_record.to_string()))?;
        let conflicts = if entry.tied_records.is_empty() {
            "None".to_string()
        } else {
            entry
                .tied_records
                .iter()
                .map(|record| format!("{} ({})", record.parent_id(), record))
                .collect::<Vec<_>>()
                .join("; ")
        };
        writeln!(html, "      <td>{}</td>", escape(&conflicts))?;
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    Ok(html)
}
