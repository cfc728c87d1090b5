// src/table.rs - In-memory record table threaded through the cleaning stages
use crate::error::CleaningError;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn text(content: impl Into<String>) -> Self {
        Value::Text(content.into())
    }

    /// NaN floats count as missing, same as an empty cell.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// Integer code for categorical lookups; integral floats qualify.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw field as integer, then float, falling back to text.
    pub fn parse(field: &str) -> Value {
        let trimmed = field.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            Value::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Text(field.to_string())
        }
    }

    /// Numeric coercion: text that does not parse becomes missing.
    pub fn to_numeric(&self) -> Value {
        match self {
            Value::Text(s) => match Value::parse(s) {
                Value::Text(_) => Value::Missing,
                numeric => numeric,
            },
            Value::Float(f) if f.is_nan() => Value::Missing,
            other => other.clone(),
        }
    }

    fn rank(&self) -> u8 {
        if self.is_missing() {
            return 0;
        }
        match self {
            Value::Int(_) | Value::Float(_) => 1,
            _ => 2,
        }
    }

    /// Total order: missing < numbers < text. Int and Float compare numerically.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => Ok(()),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Semantic type of a series, inferred from its present values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Every value is missing
    Null,
    Integer,
    Float,
    Text,
}

impl DataType {
    pub fn infer(values: &[Value]) -> DataType {
        let mut dtype = DataType::Null;
        for value in values.iter().filter(|v| !v.is_missing()) {
            match value {
                Value::Text(_) => return DataType::Text,
                Value::Float(_) => dtype = DataType::Float,
                Value::Int(_) if dtype == DataType::Null => dtype = DataType::Integer,
                _ => {}
            }
        }
        dtype
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Null => "null",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Text => "text",
        };
        f.write_str(name)
    }
}

/// One column of values with its inferred type
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<Value>,
    dtype: DataType,
}

impl Series {
    pub fn new(values: Vec<Value>) -> Self {
        let dtype = DataType::infer(&values);
        Series { values, dtype }
    }

    /// Build from raw text fields: integer if every present field parses as
    /// one, float if every present field is numeric, text otherwise.
    pub fn from_fields(fields: Vec<Option<String>>) -> Self {
        let parsed: Vec<Value> = fields
            .iter()
            .map(|f| f.as_deref().map(Value::parse).unwrap_or(Value::Missing))
            .collect();
        if DataType::infer(&parsed).is_numeric() {
            return Series::new(parsed);
        }
        let values = fields
            .into_iter()
            .map(|f| f.map(Value::Text).unwrap_or(Value::Missing))
            .collect();
        Series::new(values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype.is_numeric()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Value::is_missing)
    }

    /// Median of the present numeric values
    pub fn median(&self) -> Option<f64> {
        let mut numbers: Vec<f64> = self.values.iter().filter_map(Value::as_f64).collect();
        if numbers.is_empty() {
            return None;
        }
        numbers.sort_by(|a, b| a.total_cmp(b));
        let mid = numbers.len() / 2;
        if numbers.len() % 2 == 0 {
            Some((numbers[mid - 1] + numbers[mid]) / 2.0)
        } else {
            Some(numbers[mid])
        }
    }

    /// Most frequent present value; ties go to the smallest value.
    pub fn mode(&self) -> Option<Value> {
        let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
        for value in self.values.iter().filter(|v| !v.is_missing()) {
            *counts.entry(value).or_insert(0) += 1;
        }
        let mut best: Option<(&Value, usize)> = None;
        for (value, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value.clone())
    }

    /// Replace missing cells with `fill`, returning the new series and the count replaced.
    pub fn fill_missing(&self, fill: &Value) -> (Series, usize) {
        let mut replaced = 0;
        let values = self
            .values
            .iter()
            .map(|v| {
                if v.is_missing() {
                    replaced += 1;
                    fill.clone()
                } else {
                    v.clone()
                }
            })
            .collect();
        (Series::new(values), replaced)
    }

    pub fn map<F: Fn(&Value) -> Value>(&self, f: F) -> Series {
        Series::new(self.values.iter().map(f).collect())
    }

    pub fn to_numeric(&self) -> Series {
        self.map(Value::to_numeric)
    }

    pub fn take(&self, indices: &[usize]) -> Series {
        Series::new(indices.iter().map(|&i| self.values[i].clone()).collect())
    }

    /// Literal numeric value matching this column's type (Float stays Float).
    pub fn numeric_literal(&self, x: f64) -> Value {
        if self.dtype == DataType::Float || x.fract() != 0.0 {
            Value::Float(x)
        } else {
            Value::Int(x as i64)
        }
    }
}

/// Ordered collection of equally long, named series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Series>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, S>(columns: I) -> Result<Self, CleaningError>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            table.insert_column(name, Series::new(values))?;
        }
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// No rows or no columns
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a column, replacing an existing one in place.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        series: Series,
    ) -> Result<(), CleaningError> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && series.len() != self.rows {
            return Err(CleaningError::RaggedColumn {
                column: name,
                expected: self.rows,
                found: series.len(),
            });
        }
        self.rows = series.len();
        self.columns.insert(name, series);
        Ok(())
    }

    /// Remove a column, keeping the order of the rest.
    pub fn remove_column(&mut self, name: &str) -> Option<Series> {
        let removed = self.columns.shift_remove(name);
        if self.columns.is_empty() {
            self.rows = 0;
        }
        removed
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, series)| (name.clone(), series.take(indices)))
                .collect(),
            rows: if self.columns.is_empty() { 0 } else { indices.len() },
        }
    }

    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.values().map(|s| &s.values[index]).collect())
    }
}
