//! Export engine: image snapshot and CSV table of what is currently visible.
//!
//! Both exports read the current [`RenderModel`], never the unfiltered input.
//! A failure to produce a payload (no data, capture error) yields `None`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat};
use serde::Serialize;

use crate::models::Timestamp;
use crate::render::RenderModel;
use crate::surface::RenderSurface;

pub const PNG_MIME: &str = "image/png";
pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Image,
    Csv,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Image => "png",
            ExportKind::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportKind::Image => PNG_MIME,
            ExportKind::Csv => CSV_MIME,
        }
    }
}

/// A finished export, ready to be saved or handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub kind: ExportKind,
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    fn new(kind: ExportKind, name: &str, date: NaiveDate, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            filename: export_filename(name, date, kind.extension()),
            mime_type: kind.mime_type(),
            bytes,
        }
    }
}

/// `"{name}-{YYYY-MM-DD}.{ext}"`
pub fn export_filename(name: &str, date: NaiveDate, ext: &str) -> String {
    format!("{name}-{}.{ext}", date.format("%Y-%m-%d"))
}

/// Union-of-x table of the visible series datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    /// One row per distinct x, ascending; `None` = blank cell.
    pub rows: Vec<(Timestamp, Vec<Option<f64>>)>,
}

impl Table {
    pub fn from_model(model: &RenderModel) -> Self {
        let columns: Vec<_> = model.series_datasets().collect();
        let mut rows: BTreeMap<Timestamp, Vec<Option<f64>>> = BTreeMap::new();
        for (col, d) in columns.iter().enumerate() {
            for p in &d.points {
                let row = rows
                    .entry(p.x)
                    .or_insert_with(|| vec![None; columns.len()]);
                // First value wins on duplicate x within one series.
                if row[col].is_none() {
                    row[col] = p.y;
                }
            }
        }
        let mut headers = Vec::with_capacity(columns.len() + 1);
        headers.push("Date".to_string());
        headers.extend(columns.iter().map(|d| d.label.clone()));
        Self {
            headers,
            rows: rows.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(self.headers.iter().map(|h| sanitize_cell(h)))?;
        for (x, values) in &self.rows {
            let mut record = Vec::with_capacity(values.len() + 1);
            record.push(format_x(*x));
            record.extend(values.iter().map(|v| v.map(|y| y.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

/// RFC 3339 for epoch-millisecond x values; raw number when out of range.
fn format_x(x: Timestamp) -> String {
    DateTime::from_timestamp_millis(x)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_else(|| x.to_string())
}

/// Neutralize spreadsheet formula injection in labels.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

pub fn export_table(model: &RenderModel, name: &str, date: NaiveDate) -> Option<ExportPayload> {
    let table = Table::from_model(model);
    if table.is_empty() || model.is_empty() {
        log::debug!("table export skipped: no visible data");
        return None;
    }
    match table.to_csv() {
        Ok(bytes) => Some(ExportPayload::new(ExportKind::Csv, name, date, bytes)),
        Err(e) => {
            log::warn!("table export failed: {e}");
            None
        }
    }
}

pub fn export_snapshot(
    surface: &mut dyn RenderSurface,
    model: &RenderModel,
    name: &str,
    date: NaiveDate,
) -> Option<ExportPayload> {
    if model.is_empty() {
        log::debug!("snapshot export skipped: no visible data");
        return None;
    }
    match surface.capture_image() {
        Ok(bytes) if !bytes.is_empty() => {
            Some(ExportPayload::new(ExportKind::Image, name, date, bytes))
        }
        Ok(_) => {
            log::warn!("snapshot export produced no bytes");
            None
        }
        Err(e) => {
            log::warn!("snapshot export failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DisplayState;
    use crate::models::{ChartKind, DataPoint, Series};
    use crate::render::{ModelOptions, build_render_model};
    use crate::style::StyleTokens;

    fn model(series: &[Series], trend: bool) -> RenderModel {
        let mut state = DisplayState::initial(series, ChartKind::Line);
        state.trendline_enabled = trend;
        build_render_model(series, &[], &state, &StyleTokens::default(), &ModelOptions::default())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn union_of_x_with_blanks() {
        let series = vec![
            Series::new("a", "A", vec![DataPoint::new(1, 10.0), DataPoint::new(2, 20.0)]),
            Series::new("b", "B", vec![DataPoint::new(2, 2.0), DataPoint::new(3, 3.0)]),
        ];
        let t = Table::from_model(&model(&series, true));
        assert_eq!(t.headers, vec!["Date", "A", "B"]);
        assert_eq!(
            t.rows,
            vec![
                (1, vec![Some(10.0), None]),
                (2, vec![Some(20.0), Some(2.0)]),
                (3, vec![None, Some(3.0)]),
            ]
        );
    }

    #[test]
    fn csv_has_iso_dates_and_empty_cells() {
        let series = vec![
            Series::new(
                "a",
                "Water Level",
                vec![
                    DataPoint::new(1_709_769_600_000, 12.5),
                    DataPoint::new(1_709_856_000_000, f64::NAN),
                ],
            ),
            Series::new("b", "=Rain", vec![DataPoint::new(1_709_769_600_000, 0.4)]),
        ];
        let p = export_table(&model(&series, false), "Well 12", date()).unwrap();
        assert_eq!(p.filename, "Well 12-2024-03-07.csv");
        assert_eq!(p.mime_type, CSV_MIME);
        let text = String::from_utf8(p.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Water Level,'=Rain");
        assert_eq!(lines[1], "2024-03-07T00:00:00Z,12.5,0.4");
        assert_eq!(lines[2], "2024-03-08T00:00:00Z,,");
    }

    #[test]
    fn no_data_is_none() {
        assert!(export_table(&model(&[], false), "chart", date()).is_none());
        let empty = vec![Series::new("a", "A", vec![])];
        assert!(export_table(&model(&empty, false), "chart", date()).is_none());
    }

    #[test]
    fn filename_pattern() {
        assert_eq!(export_filename("chart", date(), "png"), "chart-2024-03-07.png");
    }
}
