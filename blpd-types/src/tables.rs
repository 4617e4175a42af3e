//! Result tables returned by every request.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{BlpError, ErrorInfo, Value};

/// Row or column label of a [`DataTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// A security or a field name.
    Text(String),
    /// An observation date of a historical series.
    Date(NaiveDate),
    /// A (security, field) column of a historical series.
    Pair {
        /// Canonical security string.
        security: String,
        /// Field mnemonic.
        field: String,
    },
}

impl Label {
    /// Build a (security, field) label.
    pub fn pair(security: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Pair {
            security: security.into(),
            field: field.into(),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDate> for Label {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<(&str, &str)> for Label {
    fn from((security, field): (&str, &str)) -> Self {
        Self::pair(security, field)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Pair { security, field } => write!(f, "{security}|{field}"),
        }
    }
}

/// Rectangular table of optional values indexed by row and column labels.
///
/// Reference requests produce one row per security and one column per field.
/// Historical requests produce one row per date and one column per
/// (security, field) pair. Missing cells are `None`, never zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataTable")]
pub struct DataTable {
    index: Vec<Label>,
    columns: Vec<Label>,
    cells: Vec<Vec<Option<Value>>>,
}

#[derive(Deserialize)]
struct RawDataTable {
    index: Vec<Label>,
    columns: Vec<Label>,
    cells: Vec<Vec<Option<Value>>>,
}

impl TryFrom<RawDataTable> for DataTable {
    type Error = BlpError;

    fn try_from(raw: RawDataTable) -> Result<Self, Self::Error> {
        Self::from_parts(raw.index, raw.columns, raw.cells)
    }
}

impl DataTable {
    /// Build a table by asking `cell(row, column)` for every position.
    pub fn from_fn(
        index: Vec<Label>,
        columns: Vec<Label>,
        mut cell: impl FnMut(usize, usize) -> Option<Value>,
    ) -> Self {
        let cells = (0..index.len())
            .map(|r| (0..columns.len()).map(|c| cell(r, c)).collect())
            .collect();
        Self {
            index,
            columns,
            cells,
        }
    }

    /// Assemble a table from row-major cells.
    ///
    /// # Errors
    /// Returns `InvalidArg` unless `cells` is `index.len()` rows of
    /// `columns.len()` cells each.
    pub fn from_parts(
        index: Vec<Label>,
        columns: Vec<Label>,
        cells: Vec<Vec<Option<Value>>>,
    ) -> Result<Self, BlpError> {
        if cells.len() != index.len() {
            return Err(BlpError::InvalidArg(format!(
                "{} rows of cells for {} row labels",
                cells.len(),
                index.len()
            )));
        }
        if let Some(r) = cells.iter().position(|row| row.len() != columns.len()) {
            return Err(BlpError::InvalidArg(format!(
                "row {r} has {} cells for {} columns",
                cells[r].len(),
                columns.len()
            )));
        }
        Ok(Self {
            index,
            columns,
            cells,
        })
    }

    /// Row labels in order.
    #[must_use]
    pub fn index(&self) -> &[Label] {
        &self.index
    }

    /// Column labels in order.
    #[must_use]
    pub fn columns(&self) -> &[Label] {
        &self.columns
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    /// True when the table has no rows or no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    /// Look up one cell by labels.
    pub fn get(&self, row: impl Into<Label>, column: impl Into<Label>) -> Option<&Value> {
        let (row, column) = (row.into(), column.into());
        let r = self.index.iter().position(|l| *l == row)?;
        let c = self.columns.iter().position(|l| *l == column)?;
        self.cells[r][c].as_ref()
    }

    /// True if `row` is one of the row labels.
    pub fn has_row(&self, row: impl Into<Label>) -> bool {
        let row = row.into();
        self.index.contains(&row)
    }

    /// True if `column` is one of the column labels.
    pub fn has_column(&self, column: impl Into<Label>) -> bool {
        let column = column.into();
        self.columns.contains(&column)
    }

    /// All cells of one row, aligned with [`Self::columns`].
    pub fn row(&self, row: impl Into<Label>) -> Option<&[Option<Value>]> {
        let row = row.into();
        let r = self.index.iter().position(|l| *l == row)?;
        Some(&self.cells[r])
    }

    /// All cells of one column, aligned with [`Self::index`].
    pub fn column(&self, column: impl Into<Label>) -> Option<Vec<Option<&Value>>> {
        let column = column.into();
        let c = self.columns.iter().position(|l| *l == column)?;
        Some(self.cells.iter().map(|row| row[c].as_ref()).collect())
    }

    /// Swap the axes: rows become columns and columns become rows.
    #[must_use]
    pub fn transpose(self) -> Self {
        let Self {
            index,
            columns,
            cells,
        } = self;
        let mut transposed: Vec<Vec<Option<Value>>> = (0..columns.len())
            .map(|_| Vec::with_capacity(index.len()))
            .collect();
        for row in cells {
            for (c, cell) in row.into_iter().enumerate() {
                transposed[c].push(cell);
            }
        }
        Self {
            index: columns,
            columns: index,
            cells: transposed,
        }
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Empty table\n");
        }
        let header: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        let labels: Vec<String> = self.index.iter().map(ToString::to_string).collect();
        let body: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_ref().map_or_else(|| "-".to_string(), ToString::to_string))
                    .collect()
            })
            .collect();

        let label_w = labels.iter().map(String::len).max().unwrap_or(0);
        let widths: Vec<usize> = header
            .iter()
            .enumerate()
            .map(|(c, h)| body.iter().map(|r| r[c].len()).max().unwrap_or(0).max(h.len()))
            .collect();

        write!(f, "{:label_w$}", "")?;
        for (h, w) in header.iter().zip(&widths) {
            write!(f, "  {h:>w$}")?;
        }
        writeln!(f)?;
        for (label, row) in labels.iter().zip(&body) {
            write!(f, "{label:label_w$}")?;
            for (cell, w) in row.iter().zip(&widths) {
                write!(f, "  {cell:>w$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One provider-reported failure for a security, or for one field of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExceptionRow {
    /// Canonical security string.
    pub security: String,
    /// Failing field; `None` for security-level errors.
    pub field: Option<String>,
    /// Error category, e.g. `BAD_FLD`.
    pub category: String,
    /// Error subcategory, e.g. `INVALID_FIELD`.
    pub subcategory: String,
    /// Provider message.
    pub message: String,
}

impl ExceptionRow {
    /// Build a row from a security, optional field, and the reported error block.
    pub fn new(security: impl Into<String>, field: Option<String>, info: ErrorInfo) -> Self {
        Self {
            security: security.into(),
            field,
            category: info.category,
            subcategory: info.subcategory,
            message: info.message,
        }
    }

    /// The error block of this row.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo::new(&self.category, &self.subcategory, &self.message)
    }
}

/// Table of provider-reported failures with columns
/// `Field`, `Category`, `Subcategory`, `Message`, indexed by security.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionTable {
    rows: Vec<ExceptionRow>,
}

impl ExceptionTable {
    /// Column names, in order.
    pub const COLUMNS: [&'static str; 4] = ["Field", "Category", "Subcategory", "Message"];

    /// Wrap a list of rows.
    #[must_use]
    pub const fn from_rows(rows: Vec<ExceptionRow>) -> Self {
        Self { rows }
    }

    /// All rows in order.
    #[must_use]
    pub fn rows(&self) -> &[ExceptionRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no failure was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows reported for one security.
    pub fn for_security<'a>(&'a self, security: &'a str) -> impl Iterator<Item = &'a ExceptionRow> {
        self.rows.iter().filter(move |r| r.security == security)
    }

    /// The row for a (security, field) pair; `field = None` selects the security-level error.
    #[must_use]
    pub fn get(&self, security: &str, field: Option<&str>) -> Option<&ExceptionRow> {
        self.rows
            .iter()
            .find(|r| r.security == security && r.field.as_deref() == field)
    }

    /// Distinct securities with at least one row, in row order.
    #[must_use]
    pub fn securities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.rows {
            if !out.contains(&r.security.as_str()) {
                out.push(&r.security);
            }
        }
        out
    }
}

impl fmt::Display for ExceptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str("No exceptions\n");
        }
        writeln!(f, "Security  {}", Self::COLUMNS.join("  "))?;
        for r in &self.rows {
            writeln!(
                f,
                "{}  {}  {}  {}  {}",
                r.security,
                r.field.as_deref().unwrap_or("-"),
                r.category,
                r.subcategory,
                r.message
            )?;
        }
        Ok(())
    }
}

/// The data table and the exception table produced by one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    /// Values that were reported.
    pub data: DataTable,
    /// Failures that were reported.
    pub exceptions: ExceptionTable,
}

impl Tables {
    /// Split into `(data, exceptions)`.
    #[must_use]
    pub fn into_parts(self) -> (DataTable, ExceptionTable) {
        (self.data, self.exceptions)
    }

    /// Transpose the data table, leaving exceptions untouched.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            data: self.data.transpose(),
            exceptions: self.exceptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::from_parts(
            vec!["AAA".into(), "BBB".into()],
            vec!["NAME".into(), "CPN".into()],
            vec![
                vec![Some(Value::from("ACME")), None],
                vec![Some(Value::from("BETA")), Some(Value::Float(6.125))],
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_by_labels() {
        let t = sample();
        assert_eq!(t.get("BBB", "CPN"), Some(&Value::Float(6.125)));
        assert_eq!(t.get("AAA", "CPN"), None);
        assert!(t.has_row("AAA"));
        assert!(!t.has_column("PX_LAST"));
    }

    #[test]
    fn ragged_cells_are_rejected() {
        let short_row = DataTable::from_parts(
            vec!["AAA".into(), "BBB".into()],
            vec!["NAME".into(), "CPN".into()],
            vec![vec![None, None], vec![None]],
        );
        assert!(matches!(short_row, Err(BlpError::InvalidArg(_))));

        let missing_row =
            DataTable::from_parts(vec!["AAA".into()], vec!["NAME".into()], Vec::new());
        assert!(matches!(missing_row, Err(BlpError::InvalidArg(_))));
    }

    #[test]
    fn from_fn_fills_every_position() {
        let t = DataTable::from_fn(
            vec!["AAA".into(), "BBB".into()],
            vec!["N".into(), "M".into(), "O".into()],
            |r, c| (r == c).then(|| Value::from(i64::try_from(r).unwrap())),
        );
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.get("BBB", "M"), Some(&Value::Int(1)));
        assert_eq!(t.get("BBB", "O"), None);
        assert_eq!(
            t.column("N"),
            Some(vec![Some(&Value::Int(0)), None])
        );
        assert_eq!(t.column("X"), None);
    }

    #[test]
    fn transpose_swaps_axes_and_is_involutive() {
        let t = sample();
        let tt = t.clone().transpose();
        assert_eq!(tt.shape(), (2, 2));
        assert_eq!(tt.index(), t.columns());
        assert_eq!(tt.get("CPN", "BBB"), Some(&Value::Float(6.125)));
        assert_eq!(tt.transpose(), t);
    }

    #[test]
    fn exception_lookup_distinguishes_security_level_rows() {
        let ex = ExceptionTable::from_rows(vec![
            ExceptionRow::new("BBB", None, ErrorInfo::new("BAD_SEC", "INVALID_SECURITY", "x")),
            ExceptionRow::new(
                "BBB",
                Some("CPN".into()),
                ErrorInfo::new("BAD_FLD", "NOT_APPLICABLE_TO_REF_DATA", "y"),
            ),
        ]);
        assert_eq!(ex.get("BBB", None).unwrap().category, "BAD_SEC");
        assert_eq!(ex.get("BBB", Some("CPN")).unwrap().message, "y");
        assert_eq!(ex.securities(), vec!["BBB"]);
        assert_eq!(ex.for_security("BBB").count(), 2);

        let rendered = ex.to_string();
        let mut lines = rendered.lines();
        assert_eq!(
            lines.next(),
            Some("Security  Field  Category  Subcategory  Message")
        );
        assert_eq!(lines.next(), Some("BBB  -  BAD_SEC  INVALID_SECURITY  x"));
        assert_eq!(lines.count(), 1);
    }
}
