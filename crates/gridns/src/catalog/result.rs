// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::Column;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Rows answered by the catalog for one query
///
/// Every row has one text cell per select, in select order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    /// More rows exist past this page
    pub has_more: bool,
    /// Total matching rows, when the query asked for it and the catalog knows
    pub total_records: Option<u64>,
}

impl ResultSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// First cell of the first row parsed as an unsigned number
    ///
    /// Aggregate queries answer with a single row, or none when nothing
    /// matched.
    pub fn scalar(&self) -> Result<u64> {
        match self.row(0) {
            Some(row) => match row.columns.first() {
                Some(column) => row.unsigned(*column),
                None => Ok(0),
            },
            None => Ok(0),
        }
    }
}

/// Borrowed view of one result row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [Column],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn new(columns: &'a [Column], cells: &'a [String]) -> Self {
        Self { columns, cells }
    }

    /// Text of a selected column
    pub fn text(&self, column: Column) -> Result<&'a str> {
        let idx = self
            .columns
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| Error::malformed_row(column, "column missing from result"))?;
        self.cells
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| Error::malformed_row(column, "row is shorter than its columns"))
    }

    /// Text of a column the query may not have selected
    pub fn selected_text(&self, column: Column) -> Result<Option<&'a str>> {
        if self.columns.contains(&column) {
            self.text(column).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Unsigned number; an empty cell reads as zero
    pub fn unsigned(&self, column: Column) -> Result<u64> {
        let text = self.text(column)?.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse::<u64>()
            .map_err(|e| Error::malformed_row(column, format!("'{text}' is not a number: {e}")))
    }

    /// Epoch seconds; an empty cell reads as unknown
    pub fn timestamp(&self, column: Column) -> Result<Option<DateTime<Utc>>> {
        let text = self.text(column)?.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let secs = text
            .parse::<i64>()
            .map_err(|e| Error::malformed_row(column, format!("'{text}' is not a timestamp: {e}")))?;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| Error::malformed_row(column, format!("timestamp {secs} out of range")))
    }
}
