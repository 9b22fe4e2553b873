use aquifer_chart::controller::DisplayState;
use aquifer_chart::models::{Axis, ChartKind, DataPoint, Series, Threshold, VisualKind, XRange};
use aquifer_chart::render::{ModelOptions, build_render_model};
use aquifer_chart::scale::AxisLabels;
use aquifer_chart::style::StyleTokens;
use aquifer_chart::surface::{PlottersSurface, RenderSurface, SurfaceCapabilities, SurfaceError};

const DAY: i64 = 86_400_000;

fn mixed_series() -> Vec<Series> {
    let pts = |f: fn(i64) -> f64| {
        (0..12)
            .map(|i| DataPoint::new(i * DAY, f(i)))
            .collect::<Vec<_>>()
    };
    vec![
        Series::new("level", "Level", pts(|i| 10.0 + i as f64 * 0.3)).filled(true),
        Series::new("rain", "Rain", pts(|i| (i % 3) as f64))
            .with_kind(VisualKind::Bar)
            .on_axis(Axis::Secondary),
        Series::new("temp", "Temp", pts(|i| if i == 5 { f64::NAN } else { 15.0 }))
            .with_kind(VisualKind::Scatter),
    ]
}

fn painted_surface() -> PlottersSurface {
    let series = mixed_series();
    let mut state = DisplayState::initial(&series, ChartKind::Line);
    state.trendline_enabled = true;
    let options = ModelOptions {
        axes: AxisLabels {
            y_label: "Level".into(),
            secondary_label: "Rain".into(),
            ..Default::default()
        },
        title: Some("Mixed".into()),
        description: Some("Level, rain and temperature".into()),
        show_legend: true,
        ..Default::default()
    };
    let model = build_render_model(
        &series,
        &[Threshold::new(12.0, "Critical", "error")],
        &state,
        &StyleTokens::default(),
        &options,
    );
    let mut surface = PlottersSurface::new(400, 240, SurfaceCapabilities::minimal());
    surface.paint(&model).unwrap();
    surface
}

#[test]
fn capture_before_paint_fails() {
    let mut surface = PlottersSurface::new(100, 100, SurfaceCapabilities::minimal());
    assert!(matches!(surface.capture_image(), Err(SurfaceError::NothingPainted)));
    assert_eq!(surface.visible_range(), None);
}

#[test]
fn renders_png_without_fonts() {
    let mut surface = painted_surface();
    let png = surface.capture_image().unwrap();
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let rgb = surface.render_rgb().unwrap();
    assert_eq!(rgb.len(), 400 * 240 * 3);
    assert!(rgb.iter().any(|&b| b != 255), "something besides background was drawn");
}

#[test]
fn zoom_window_follows_surface_calls() {
    let mut surface = painted_surface();
    let full = XRange::new(0, 11 * DAY);
    assert_eq!(surface.visible_range(), Some(full));

    surface.zoom_by(2.0);
    let z = surface.visible_range().unwrap();
    assert_eq!(z.span(), full.span() / 2);
    surface.pan_by(DAY);
    assert_eq!(surface.visible_range().unwrap().min, z.min + DAY);
    assert!(surface.capture_image().is_ok());

    surface.reset_zoom();
    assert_eq!(surface.visible_range(), Some(full));
}

#[test]
fn svg_output_is_a_document() {
    let surface = painted_surface();
    let svg = surface.render_svg().unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
}
