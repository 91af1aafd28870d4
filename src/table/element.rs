use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::foundation::core::Timestamp;

/// One raw cell as supplied by the host's data binding.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value.
    #[default]
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell. Date columns carry epoch milliseconds here.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl CellValue {
    /// Interpret the cell as a point in time.
    ///
    /// Numbers are epoch milliseconds. Text accepts RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`,
    /// `YYYY-MM`, a bare four-digit year, or a number of milliseconds.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Number(v) => millis(*v),
            Self::Text(s) => parse_timestamp_text(s),
            Self::Null | Self::Bool(_) => None,
        }
    }

    /// Interpret the cell as a category label. `None` for null cells.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(v) => Some(v.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }

    /// Interpret the cell as a measure. Anything non-numeric (or non-finite) reads as `0`.
    pub fn as_measure(&self) -> f64 {
        let v = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Self::Null | Self::Bool(_) => 0.0,
        };
        if v.is_finite() { v } else { 0.0 }
    }
}

fn millis(v: f64) -> Option<Timestamp> {
    v.is_finite().then(|| Timestamp(v.round() as i64))
}

fn midnight(d: NaiveDate) -> Option<Timestamp> {
    Some(Timestamp::from_datetime(d.and_hms_opt(0, 0, 0)?.and_utc()))
}

fn parse_timestamp_text(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Timestamp::from_datetime(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Timestamp::from_datetime(ndt.and_utc()));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return midnight(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return midnight(d);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s.parse::<i32>().ok()?;
        return midnight(NaiveDate::from_ymd_opt(year, 1, 1)?);
    }

    s.parse::<f64>().ok().and_then(millis)
}

/// Display metadata for one bound column.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnMeta {
    /// Human-readable column name (e.g. `"Month of Order Date"`).
    pub name: String,
}

/// Columnar snapshot of the bound element: metadata and cell arrays keyed by column id.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementData {
    /// Column metadata keyed by column id.
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnMeta>,
    /// Cell arrays keyed by column id.
    #[serde(default)]
    pub data: BTreeMap<String, Vec<CellValue>>,
}

impl ElementData {
    /// Cells for a selected column. Unselected or unknown columns read as empty.
    pub fn column(&self, id: Option<&str>) -> &[CellValue] {
        id.and_then(|id| self.data.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display name for a selected column, if the host supplied one.
    pub fn column_name(&self, id: Option<&str>) -> Option<&str> {
        id.and_then(|id| self.columns.get(id)).map(|m| m.name.as_str())
    }
}
