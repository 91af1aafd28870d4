use racebar::{
    CellValue, Chart, ChartConfig, ChartInput, DateGranularity, ElementData, EntryId, LayoutOpts,
    RankParam,
};
use serde_json::json;

fn example_input(rank: serde_json::Value) -> ChartInput {
    serde_json::from_value(json!({
        "config": { "date": "date", "category": "name", "value": "value", "rank": rank },
        "element": {
            "columns": {
                "date": { "name": "Date" },
                "name": { "name": "Name" },
                "value": { "name": "Value" }
            },
            "data": {
                "date": [1, 1, 2, 2],
                "name": ["A", "B", "A", "B"],
                "value": [10, 5, 3, 12]
            }
        }
    }))
    .unwrap()
}

fn ranked(chart: &Chart, k: usize) -> Vec<(String, f64, usize)> {
    chart.keyframes()[k]
        .entries
        .iter()
        .map(|e| (e.name.to_string(), e.value, e.rank))
        .collect()
}

#[test]
fn example_timeline_and_links() {
    let chart = example_input(json!("2")).chart();
    assert_eq!(chart.n(), 2);
    assert_eq!(chart.len(), 2);
    assert_eq!(chart.keyframes()[0].timestamp.as_millis(), 1);
    assert_eq!(chart.keyframes()[1].timestamp.as_millis(), 2);
    assert_eq!(
        ranked(&chart, 0),
        vec![("A".into(), 10.0, 0), ("B".into(), 5.0, 1)]
    );
    assert_eq!(
        ranked(&chart, 1),
        vec![("B".into(), 12.0, 0), ("A".into(), 3.0, 1)]
    );

    let adj = chart.adjacency();
    let a_t1 = EntryId::new(0, 0);
    let a_t2 = EntryId::new(1, 1);
    let b_t1 = EntryId::new(0, 1);
    let b_t2 = EntryId::new(1, 0);
    assert_eq!(adj.next(a_t1), a_t2);
    assert_eq!(adj.prev(b_t2), b_t1);
    assert_eq!(adj.prev(a_t1), a_t1);
    assert_eq!(adj.next(b_t2), b_t2);
}

#[test]
fn pipeline_is_idempotent() {
    let input = example_input(json!(2));
    let a = input.chart();
    let b = input.chart();
    assert_eq!(a.keyframes(), b.keyframes());
    assert_eq!(a.adjacency(), b.adjacency());
    assert_eq!(a.summary(), b.summary());
}

#[test]
fn cutoff_clamps_ranks_but_keeps_entries() {
    let element = ElementData {
        data: [
            (
                "d".to_string(),
                vec![CellValue::Number(0.0); 4],
            ),
            (
                "c".to_string(),
                ["w", "x", "y", "z"]
                    .into_iter()
                    .map(|s| CellValue::Text(s.to_string()))
                    .collect(),
            ),
            (
                "v".to_string(),
                [4.0, 3.0, 2.0, 1.0].into_iter().map(CellValue::Number).collect(),
            ),
        ]
        .into_iter()
        .collect(),
        ..ElementData::default()
    };
    let config = ChartConfig {
        date: Some("d".into()),
        category: Some("c".into()),
        value: Some("v".into()),
        rank: Some(RankParam::Text("2".into())),
    };
    let chart = Chart::transform(&config, &element, LayoutOpts::default());
    assert_eq!(chart.n(), 2);
    let ranks: Vec<usize> = chart.keyframes()[0].entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2, 2]);
    assert_eq!(chart.layout().height(), 30.0 + 60.0 + 10.0);
}

#[test]
fn malformed_columns_degrade_instead_of_failing() {
    let input: ChartInput = serde_json::from_value(json!({
        "config": { "date": "d", "category": "c", "value": "v", "rank": "lots" },
        "element": {
            "data": {
                "d": ["2020-01-01", "not a date", "2020-01-02", "2020-01-02", "2020-01-03"],
                "c": ["A", "B", null, "A"],
                "v": ["7", 2, 9, "n/a", 1]
            }
        }
    }))
    .unwrap();
    let chart = input.chart();
    // Rows 1 (bad date) and 2 (null category) are skipped; row 4 is past the shortest column.
    assert_eq!(chart.names().len(), 1);
    assert_eq!(chart.n(), 1);
    assert_eq!(chart.len(), 2);
    let values: Vec<f64> = chart.keyframes().iter().map(|k| k.entries[0].value).collect();
    assert_eq!(values, vec![7.0, 0.0]);
}

#[test]
fn unselected_columns_produce_an_empty_timeline() {
    let chart = ChartInput::default().chart();
    assert!(chart.is_empty());
    assert!(chart.names().is_empty());
    assert!(chart.summary().keyframes.is_empty());
}

#[test]
fn date_strings_and_granularity() {
    let input: ChartInput = serde_json::from_value(json!({
        "config": { "date": "d", "category": "c", "value": "v" },
        "element": {
            "columns": { "d": { "name": "Month of Order Date" } },
            "data": {
                "d": ["2021-03", "2021-01", "2021-02"],
                "c": ["A", "A", "A"],
                "v": [3, 1, 2]
            }
        }
    }))
    .unwrap();
    let chart = input.chart();
    assert_eq!(chart.granularity(), DateGranularity::Month);
    let captions: Vec<String> = (0..chart.len()).filter_map(|i| chart.caption(i)).collect();
    assert_eq!(captions, vec!["2021-01", "2021-02", "2021-03"]);
}

#[test]
fn summary_json_shape() {
    let summary = serde_json::to_value(example_input(json!(null)).chart().summary()).unwrap();
    assert_eq!(summary["n"], 2);
    assert_eq!(summary["keyframes"][0]["caption"], "1970-01-01");
    assert_eq!(
        summary["keyframes"][0]["entries"][0],
        json!({ "name": "A", "value": 10.0, "rank": 0 })
    );
    assert_eq!(
        summary["links"][3],
        json!({
            "entry": { "keyframe": 1, "slot": 1 },
            "prev": { "keyframe": 0, "slot": 0 },
            "next": { "keyframe": 1, "slot": 1 }
        })
    );
}
