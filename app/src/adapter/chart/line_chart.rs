use std::collections::BTreeMap;
use std::io::Cursor;

use anyhow::Context as _;
use plotters::prelude::*;
use plotters::style::FontStyle;

use super::ChartSettings;
use crate::core::time::{DateTime, DateTimeRange};
use crate::port::ChartRenderer;

const FONT_FAMILY: &str = "sans-serif";
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const FILL_OPACITY: f64 = 0.18;
const MAX_SIDE: u32 = 8192;

#[derive(Debug, Clone)]
pub struct PlottersLineChart {
    width: u32,
    height: u32,
    buffer_len: usize,
    with_text: bool,
}

impl PlottersLineChart {
    pub fn new(settings: &ChartSettings) -> anyhow::Result<Self> {
        let buffer_len = rgb_buffer_len(settings.width, settings.height)
            .with_context(|| format!("Invalid chart size {}x{}", settings.width, settings.height))?;

        let with_text = match &settings.font_path {
            Some(path) => {
                let bytes = std::fs::read(path).with_context(|| format!("Error reading chart font {path}"))?;
                //plotters keeps registered fonts for the lifetime of the process
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
                    .map_err(|_| anyhow::anyhow!("Invalid chart font {path}"))?;
                tracing::info!("Registered chart font {}", path);
                true
            }
            None => {
                tracing::warn!("No chart font configured, charts are rendered without labels");
                false
            }
        };

        Ok(Self {
            width: settings.width,
            height: settings.height,
            buffer_len,
            with_text,
        })
    }

    fn draw(
        &self,
        buffer: &mut [u8],
        title: &str,
        range: &DateTimeRange,
        series: &BTreeMap<DateTime, f64>,
    ) -> anyhow::Result<()> {
        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let (y_min, y_max) = value_bounds(series);
        let x_start = range.start().into_db();
        let x_end = range.end().into_db().max(x_start + chrono::Duration::minutes(1));

        let mut builder = ChartBuilder::on(&root);
        builder.margin(12);
        if self.with_text {
            builder
                .caption(title, (FONT_FAMILY, 22))
                .x_label_area_size(32)
                .y_label_area_size(48);
        }

        let mut chart = builder
            .build_cartesian_2d(x_start..x_end, y_min..y_max)
            .map_err(draw_error)?;

        if self.with_text {
            chart
                .configure_mesh()
                .x_labels(8)
                .y_labels(6)
                .x_label_formatter(&|dt: &chrono::DateTime<chrono::Local>| dt.format("%H:%M").to_string())
                .y_label_formatter(&|v: &f64| format!("{v:.1}"))
                .draw()
                .map_err(draw_error)?;
        }

        let points: Vec<_> = series.iter().map(|(dt, value)| (dt.into_db(), *value)).collect();

        chart
            .draw_series(AreaSeries::new(points.iter().cloned(), y_min, LINE_COLOR.mix(FILL_OPACITY)))
            .map_err(draw_error)?;
        chart
            .draw_series(LineSeries::new(points, LINE_COLOR.stroke_width(2)))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;

        Ok(())
    }
}

impl ChartRenderer for PlottersLineChart {
    fn content_type(&self) -> mime::Mime {
        mime::IMAGE_PNG
    }

    fn render(&self, title: &str, range: &DateTimeRange, series: &BTreeMap<DateTime, f64>) -> anyhow::Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.buffer_len];
        self.draw(&mut buffer, title, range, series)?;

        let image = image::RgbImage::from_raw(self.width, self.height, buffer)
            .context("Chart buffer does not match chart size")?;

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .context("Error encoding chart as PNG")?;

        Ok(png.into_inner())
    }
}

/// Size of the RGB backing buffer, `None` for empty or oversized charts.
fn rgb_buffer_len(width: u32, height: u32) -> Option<usize> {
    if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
        return None;
    }

    (width as usize).checked_mul(height as usize)?.checked_mul(3)
}

fn draw_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> anyhow::Error {
    anyhow::anyhow!("Error drawing chart: {e}")
}

/// Value axis bounds with some headroom. Flat or empty series get a fixed span around the value.
fn value_bounds(series: &BTreeMap<DateTime, f64>) -> (f64, f64) {
    let min = series.values().cloned().fold(f64::INFINITY, f64::min);
    let max = series.values().cloned().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let padding = ((max - min) * 0.1).max(0.5);
    (min - padding, max + padding)
}
