use anyhow::{Context, Result, bail};
use aquifer_chart::surface::draw_model;
use aquifer_chart::{
    Axis, ChartCallbacks, ChartConfig, ChartController, ChartKind, ChartView, Metric,
    PlottersSurface, Reading, Series, StyleTokens, SurfaceCapabilities, Threshold,
};
use clap::{Parser, ValueEnum};
use plotters::prelude::IntoDrawingArea;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "aquifer-chart",
    version,
    about = "Chart groundwater station readings: trends, thresholds, PNG/SVG and CSV export"
)]
struct Cli {
    /// JSON array of readings: [{"timestamp": "...", "value": 1.2, "rainfall": 0.3}, ...]
    #[arg(short, long)]
    readings: PathBuf,
    /// Chart options as JSON (title, axis labels, feature flags, ...).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Metric to plot on the primary axis, as NAME or NAME=LABEL (repeatable; default: value).
    #[arg(short, long = "metric")]
    metrics: Vec<String>,
    /// Metric to plot on the secondary axis, as NAME or NAME=LABEL (repeatable).
    #[arg(short, long = "secondary")]
    secondary: Vec<String>,
    /// Threshold line as VALUE:LABEL[:COLOR] (repeatable).
    #[arg(short, long = "threshold")]
    thresholds: Vec<String>,
    /// Chart kind for series without their own kind.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    /// Overlay a least-squares trend line on every visible series.
    #[arg(long, default_value_t = false)]
    trend: bool,
    /// Series id to hide (repeatable).
    #[arg(long)]
    hide: Vec<String>,
    /// Zoom in this many steps around the center before rendering.
    #[arg(long, default_value_t = 0)]
    zoom: u32,
    /// TrueType/OpenType font used for captions, ticks and legend.
    /// Without it the chart is drawn without text.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Write the chart image to this path (.png or .svg).
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Write the visible data as CSV to this path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Line,
    Bar,
}

impl From<KindArg> for ChartKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Line => ChartKind::Line,
            KindArg::Bar => ChartKind::Bar,
        }
    }
}

/// `NAME` or `NAME=LABEL`; the label defaults to the name.
fn parse_metric_arg(s: &str) -> (String, String) {
    match s.split_once('=') {
        Some((name, label)) if !label.trim().is_empty() => {
            (name.trim().to_string(), label.trim().to_string())
        }
        Some((name, _)) => (name.trim().to_string(), name.trim().to_string()),
        None => (s.trim().to_string(), s.trim().to_string()),
    }
}

/// `VALUE:LABEL[:COLOR]`; the color defaults to the `error` token.
fn parse_threshold(s: &str) -> Result<Threshold> {
    let mut parts = s.splitn(3, ':');
    let value = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid threshold value in {s:?}"))?;
    let label = parts.next().unwrap_or_default().trim();
    let color = parts.next().map(str::trim).filter(|c| !c.is_empty()).unwrap_or("error");
    Ok(Threshold::new(value, label, color))
}

fn load_readings(path: &Path) -> Result<Vec<Reading>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid readings in {}", path.display()))
}

fn build_series(cli: &Cli, readings: &[Reading]) -> Vec<Series> {
    let primary: Vec<String> = if cli.metrics.is_empty() {
        vec!["value=Water Level".to_string()]
    } else {
        cli.metrics.clone()
    };
    let tagged = primary
        .iter()
        .map(|m| (m, Axis::Primary))
        .chain(cli.secondary.iter().map(|m| (m, Axis::Secondary)));

    tagged
        .enumerate()
        .map(|(i, (arg, axis))| {
            let (name, label) = parse_metric_arg(arg);
            let token = StyleTokens::default().palette_color(i).to_hex();
            Series::from_readings(name.clone(), label, readings, &Metric::parse(&name))
                .with_color(token)
                .on_axis(axis)
                .hidden(cli.hide.contains(&name))
        })
        .collect()
}

fn capabilities(font: Option<&Path>) -> Result<SurfaceCapabilities> {
    let Some(path) = font else {
        return Ok(SurfaceCapabilities::minimal());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read font {}", path.display()))?;
    // Registered fonts must outlive every surface; the process is short-lived.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    Ok(SurfaceCapabilities::with_font(bytes)?)
}

fn write_svg(ctl: &ChartController, caps: SurfaceCapabilities, path: &Path) -> Result<()> {
    let cfg = ctl.config();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (cfg.width, cfg.height)).into_drawing_area();
        draw_model(root, ctl.render_model(), ctl.state().zoomed_range, caps)?;
    }
    std::fs::write(path, svg).with_context(|| format!("cannot write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match cli.config.as_ref() {
        Some(p) => ChartConfig::from_json_file(p)?,
        None => ChartConfig::default(),
    };
    if let Some(kind) = cli.kind {
        config.default_chart_kind = kind.into();
    }

    let readings = load_readings(&cli.readings)?;
    let series = build_series(&cli, &readings);
    let thresholds = cli
        .thresholds
        .iter()
        .map(|t| parse_threshold(t.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let caps = capabilities(cli.font.as_deref())?;
    let surface = PlottersSurface::new(config.width, config.height, caps);
    let callbacks = ChartCallbacks::default()
        .on_range_change(|r| log::info!("visible range: {:?} .. {:?}", r.start, r.end))
        .on_export(|kind, p| {
            log::info!("exported {kind:?}: {} ({} bytes)", p.filename, p.bytes.len())
        });
    let mut ctl = ChartController::new(
        config,
        series,
        thresholds,
        StyleTokens::default(),
        Box::new(surface),
        callbacks,
    )?;

    if cli.trend {
        ctl.toggle_trendline();
    }
    for _ in 0..cli.zoom {
        ctl.zoom_in();
    }

    match ctl.view() {
        ChartView::Loading => bail!("chart is still loading"),
        ChartView::Error(msg) => bail!("chart error: {msg}"),
        ChartView::Empty => {
            eprintln!("No data to chart");
            return Ok(());
        }
        ChartView::Chart(model) => {
            eprintln!("Charting {} dataset(s)", model.datasets.len());
        }
    }

    if let Some(path) = cli.out.as_ref() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();
        match ext.as_str() {
            "svg" => write_svg(&ctl, caps, path)?,
            "png" => {
                let Some(snapshot) = ctl.export_snapshot() else {
                    bail!("nothing to export (export disabled or no visible data)");
                };
                std::fs::write(path, &snapshot.bytes)
                    .with_context(|| format!("cannot write {}", path.display()))?;
            }
            other => bail!("unsupported image format: {other}"),
        }
        eprintln!("Wrote chart to {}", path.display());
    }

    if let Some(path) = cli.csv.as_ref() {
        let Some(table) = ctl.export_table() else {
            bail!("nothing to export (export disabled or no visible data)");
        };
        std::fs::write(path, &table.bytes)
            .with_context(|| format!("cannot write {}", path.display()))?;
        eprintln!("Saved table to {}", path.display());
    }

    Ok(())
}
