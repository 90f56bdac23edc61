// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encode or decode a permission model as a roles × resources matrix in CSV format.
//!
//! The first row holds the literal `Role` followed by one resource URI per column. Every
//! following row starts with a role name, each cell lists the access labels granted to that
//! role on the column's resource, separated by `|`. A filtered grant appends a suffix to its
//! cell:
//!
//! ```text
//! Role,configuration/entityTypes/Organization
//! ADMIN,Read|Update [Filtered: "equals(attributes.Country, ""US"")"]
//! ```
//!
//! Header cells are written as-is, a resource URI containing a comma can not be recovered by
//! the decoder.
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::access::{AccessCatalog, AccessKind};
use crate::model::{Grant, PermissionModel, normalize_filter};

/// File name used when exporting a permission matrix.
pub const EXPORT_FILE_NAME: &str = "permission_matrix.csv";

const ROLE_HEADER: &str = "Role";

const FILTER_MARKER: &str = "[Filtered:";

/// Error types for decoding a CSV permission matrix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// Document does not contain a single non-blank line.
    #[error("document is empty, expected a header row")]
    MissingHeader,

    /// First header cell is not `Role`.
    #[error("first column must be \"Role\", found \"{0}\"")]
    MalformedHeader(String),

    /// A row could not be split into cells.
    #[error("line {line}: {reason}")]
    ParseFailure { line: usize, reason: String },
}

/// Encodes a model as a CSV permission matrix.
///
/// Rows follow the sorted role index, columns follow the resource order of the model.
pub fn encode(model: &PermissionModel) -> String {
    let catalog = AccessCatalog::standard();

    let mut header = vec![ROLE_HEADER];
    header.extend(model.resources().iter().map(|resource| resource.uri()));

    let mut rows = vec![header.join(",")];
    for role in model.roles().iter() {
        let mut row = vec![role.to_owned()];
        for resource in model.resources() {
            row.push(encode_cell(resource.grant(role), catalog));
        }
        rows.push(row.join(","));
    }

    rows.join("\n")
}

fn encode_cell(grant: Option<&Grant>, catalog: &AccessCatalog) -> String {
    let Some(grant) = grant else {
        return String::new();
    };

    let labels = grant
        .access()
        .iter()
        .map(|kind| catalog.label(kind))
        .collect::<Vec<_>>()
        .join("|");

    match grant.filter() {
        Some(filter) => format!(
            "{} {} \"{}\"]",
            labels,
            FILTER_MARKER,
            filter.replace('"', "\"\"")
        ),
        None => labels,
    }
}

/// Decodes a CSV permission matrix into a new model.
///
/// Resources are created for every header column in column order, also when no role has a
/// grant on them. Empty cells do not create grants.
pub fn decode(text: &str) -> Result<PermissionModel, CsvError> {
    let catalog = AccessCatalog::standard();

    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(CsvError::MissingHeader)?;
    let columns: Vec<&str> = header
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(str::trim)
        .collect();

    // `split` always yields at least one item.
    if columns[0] != ROLE_HEADER {
        return Err(CsvError::MalformedHeader(columns[0].to_owned()));
    }

    let mut model = PermissionModel::new();
    for uri in columns.iter().skip(1).filter(|uri| !uri.is_empty()) {
        model.resource_or_insert(uri);
    }

    for (index, line) in lines {
        let cells = split_row(line).ok_or_else(|| CsvError::ParseFailure {
            line: index + 1,
            reason: "unterminated quoted field".to_owned(),
        })?;

        let role = strip_quotes(&cells[0]);
        if role.is_empty() {
            trace!(line = index + 1, "skip row without role");
            continue;
        }

        for (column, uri) in columns.iter().enumerate().skip(1) {
            if uri.is_empty() {
                continue;
            }

            let cell = cells.get(column).map(String::as_str).unwrap_or_default();
            if strip_quotes(cell).is_empty() {
                continue;
            }

            let (access, filter) = decode_cell(cell, catalog);
            let mut grant = Grant::new(role.as_str(), access);
            grant.set_filter(filter);
            model.resource_or_insert(uri).upsert_grant(grant);
        }
    }

    debug!(
        resources = model.resources().len(),
        roles = model.roles().len(),
        "decoded csv permission matrix"
    );

    Ok(model)
}

/// Split a row at commas which are not inside double quotes.
///
/// Quote characters are kept in the cell, the filter suffix needs them to be unescaped later.
/// Returns `None` if a quote is left open at the end of the row.
fn split_row(line: &str) -> Option<Vec<String>> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                cells.push(current.trim().to_owned());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return None;
    }

    cells.push(current.trim().to_owned());
    Some(cells)
}

/// Remove all double quotes from a role or access list cell.
fn strip_quotes(cell: &str) -> String {
    cell.replace('"', "").trim().to_owned()
}

fn decode_cell(cell: &str, catalog: &AccessCatalog) -> (Vec<AccessKind>, Option<String>) {
    let (labels, filter) = match cell.split_once(FILTER_MARKER) {
        Some((labels, filter)) => (labels, unquote_filter(filter)),
        None => (cell, None),
    };

    // Repeated labels collapse in `Grant::new`.
    let access = strip_quotes(labels)
        .split('|')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| {
            let kind = catalog.from_label(label);
            if !kind.is_known() {
                warn!(%kind, "unknown access kind in csv cell");
            }
            kind
        })
        .collect();

    (access, filter)
}

/// Strip the closing bracket and the surrounding quotes of a filter suffix and collapse doubled
/// quotes.
fn unquote_filter(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.strip_suffix(']').unwrap_or(raw).trim();
    let raw = raw.strip_prefix('"').unwrap_or(raw);
    let raw = raw.strip_suffix('"').unwrap_or(raw);
    normalize_filter(Some(raw.replace("\"\"", "\"")))
}
