use aquifer_chart::controller::DisplayState;
use aquifer_chart::export::{self, ExportKind, Table};
use aquifer_chart::models::{ChartKind, DataPoint, Series};
use aquifer_chart::render::{ModelOptions, RenderModel, build_render_model};
use aquifer_chart::style::StyleTokens;
use chrono::NaiveDate;

fn model(series: &[Series], state: &DisplayState) -> RenderModel {
    build_render_model(series, &[], state, &StyleTokens::default(), &ModelOptions::default())
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

#[test]
fn union_rows_keep_blanks() {
    let series = vec![
        Series::new("a", "A", vec![DataPoint::new(1, 1.0), DataPoint::new(2, 2.0)]),
        Series::new("b", "B", vec![DataPoint::new(2, 20.0), DataPoint::new(3, 30.0)]),
    ];
    let state = DisplayState::initial(&series, ChartKind::Line);
    let table = Table::from_model(&model(&series, &state));

    let xs: Vec<i64> = table.rows.iter().map(|(x, _)| *x).collect();
    assert_eq!(xs, vec![1, 2, 3]);
    assert_eq!(table.rows[2].1[0], None, "A blank at x=3");
    assert_eq!(table.rows[0].1[1], None, "B blank at x=1");
    assert_eq!(table.rows[1].1, vec![Some(2.0), Some(20.0)]);
}

#[test]
fn only_visible_series_are_exported() {
    let series = vec![
        Series::new("waterLevel", "Water Level", vec![DataPoint::new(0, 12.0)]),
        Series::new("battery", "Battery", vec![DataPoint::new(0, 90.0)]).hidden(true),
    ];
    let mut state = DisplayState::initial(&series, ChartKind::Line);
    state.trendline_enabled = true;
    let payload = export::export_table(&model(&series, &state), "Station GW-7", date()).unwrap();

    assert_eq!(payload.kind, ExportKind::Csv);
    assert_eq!(payload.filename, "Station GW-7-2024-05-01.csv");
    let text = String::from_utf8(payload.bytes).unwrap();
    assert_eq!(text.lines().next(), Some("Date,Water Level"));
    assert!(!text.contains("Battery"));
    assert!(!text.contains("Trend"));
}

#[test]
fn nothing_visible_is_silent_none() {
    let series = vec![Series::new("a", "A", vec![DataPoint::new(1, 1.0)])];
    let mut state = DisplayState::initial(&series, ChartKind::Line);
    state.visible_series_ids.clear();
    assert!(export::export_table(&model(&series, &state), "chart", date()).is_none());
}
