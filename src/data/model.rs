use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell as read from the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a score sheet usually holds.
/// Identifier and categorical columns keep these untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so CellValue can key a BTreeMap when grouping --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Coerce the cell to a number. Anything that is not a finite number
    /// becomes missing rather than an error.
    pub fn coerce_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Float(v) => *v,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file as loaded, before any classification
// ---------------------------------------------------------------------------

/// Header plus row-major cells. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        RawTable { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy out one column; short rows read as `Null`.
    pub fn column_cells(&self, idx: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(CellValue::Null))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ScoreTable – the classified, column-major table
// ---------------------------------------------------------------------------

/// What a column is used for once the table has been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Encodes row identity (roll number, name, …); never used numerically.
    Identifier,
    /// Numeric score column.
    Subject,
    /// Kept for display and grouping only.
    Categorical,
    /// Derived per-row summary (`total score`, `average score`).
    Aggregate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Untouched source cells.
    Raw(Vec<CellValue>),
    /// Coerced numbers; `None` is a missing value.
    Numeric(Vec<Option<f64>>),
}

impl ColumnValues {
    /// Render one cell for the dashboard tables.
    pub fn display(&self, row: usize) -> String {
        match self {
            ColumnValues::Raw(v) => v.get(row).map(|c| c.to_string()).unwrap_or_default(),
            ColumnValues::Numeric(v) => match v.get(row).copied().flatten() {
                Some(x) => format_number(x),
                None => String::new(),
            },
        }
    }

    /// Grouping key for a cell, whatever the column kind.
    pub fn key(&self, row: usize) -> CellValue {
        match self {
            ColumnValues::Raw(v) => v.get(row).cloned().unwrap_or(CellValue::Null),
            ColumnValues::Numeric(v) => match v.get(row).copied().flatten() {
                Some(x) => CellValue::Float(x),
                None => CellValue::Null,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Raw(_) => None,
        }
    }
}

/// The three disjoint column partitions, each in original column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub identifier: Vec<String>,
    pub subject: Vec<String>,
    pub categorical: Vec<String>,
}

/// A classified dataset. Column names are normalized and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    pub columns: Vec<Column>,
    pub n_rows: usize,
}

impl ScoreTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric values of a subject or aggregate column.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::numeric)
    }

    /// Names of the columns holding `role`, in table order.
    pub fn names_with_role(&self, role: ColumnRole) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn classification(&self) -> Classification {
        Classification {
            identifier: self.names_with_role(ColumnRole::Identifier),
            subject: self.names_with_role(ColumnRole::Subject),
            categorical: self.names_with_role(ColumnRole::Categorical),
        }
    }

    /// Distinct values per column, used to populate grouping selectors.
    pub fn distinct_counts(&self) -> BTreeMap<String, usize> {
        self.columns
            .iter()
            .map(|c| {
                let mut keys: Vec<CellValue> = (0..self.n_rows).map(|r| c.values.key(r)).collect();
                keys.sort();
                keys.dedup();
                (c.name.clone(), keys.len())
            })
            .collect()
    }

    /// Back to a row-major table; numeric columns become `Float` / `Null`.
    pub fn to_raw(&self) -> RawTable {
        let columns = self.columns.iter().map(|c| c.name.clone()).collect();
        let rows = (0..self.n_rows)
            .map(|r| self.columns.iter().map(|c| c.values.key(r)).collect())
            .collect();
        RawTable::new(columns, rows)
    }
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x:.2}")
    }
}
