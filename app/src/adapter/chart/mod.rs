mod line_chart;

use serde::Deserialize;

pub use line_chart::PlottersLineChart;

#[derive(Debug, Clone, Deserialize)]
pub struct ChartSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// TrueType font for title and axis labels. Without it charts are rendered without any text.
    pub font_path: Option<String>,
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_path: None,
        }
    }
}

impl ChartSettings {
    pub fn new_renderer(&self) -> anyhow::Result<PlottersLineChart> {
        PlottersLineChart::new(self)
    }
}
