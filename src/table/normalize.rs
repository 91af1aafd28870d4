use std::sync::Arc;

use crate::{foundation::core::Timestamp, table::element::CellValue};

/// One typed `(timestamp, name, value)` row.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Record {
    /// When the measurement applies.
    pub timestamp: Timestamp,
    /// Category label.
    pub name: Arc<str>,
    /// Measure value (always finite).
    pub value: f64,
}

/// Zip three parallel columns into typed records.
///
/// Only positions valid in all three columns are used: the output is bounded by the shortest
/// column, and positions whose timestamp or category cannot be read are skipped. Unreadable
/// measures become `0`. Nothing here fails; degraded input is logged.
pub fn normalize(dates: &[CellValue], names: &[CellValue], values: &[CellValue]) -> Vec<Record> {
    let len = dates.len().min(names.len()).min(values.len());
    if dates.len() != names.len() || names.len() != values.len() {
        tracing::warn!(
            dates = dates.len(),
            names = names.len(),
            values = values.len(),
            used = len,
            "column lengths differ; truncating to the shortest column"
        );
    }

    let mut out = Vec::with_capacity(len);
    let mut skipped = 0usize;
    for ((date, name), value) in dates.iter().zip(names).zip(values).take(len) {
        let (Some(timestamp), Some(name)) = (date.as_timestamp(), name.as_label()) else {
            skipped += 1;
            continue;
        };
        out.push(Record {
            timestamp,
            name: Arc::from(name),
            value: value.as_measure(),
        });
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped rows without a readable timestamp or category");
    }
    tracing::debug!(records = out.len(), "normalized rows");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_owned())
    }

    #[test]
    fn zips_index_by_index() {
        let recs = normalize(
            &[num(1.0), num(2.0)],
            &[text("A"), text("B")],
            &[num(10.0), num(5.0)],
        );
        assert_eq!(
            recs,
            vec![
                Record {
                    timestamp: Timestamp(1),
                    name: Arc::from("A"),
                    value: 10.0
                },
                Record {
                    timestamp: Timestamp(2),
                    name: Arc::from("B"),
                    value: 5.0
                },
            ]
        );
    }

    #[test]
    fn truncates_to_shortest_column() {
        let recs = normalize(
            &[num(1.0), num(2.0), num(3.0)],
            &[text("A"), text("B")],
            &[num(1.0), num(2.0), num(3.0), num(4.0)],
        );
        assert_eq!(recs.len(), 2);
        assert!(normalize(&[], &[text("A")], &[num(1.0)]).is_empty());
    }

    #[test]
    fn skips_unreadable_positions_and_zeroes_bad_measures() {
        let recs = normalize(
            &[num(1.0), CellValue::Null, num(3.0), text("garbage")],
            &[text("A"), text("B"), CellValue::Null, text("D")],
            &[text("x"), num(2.0), num(3.0), num(4.0)],
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(&*recs[0].name, "A");
        assert_eq!(recs[0].value, 0.0);
    }
}
