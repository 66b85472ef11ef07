//! Plotting tools: histogram and boxplot rendered to PNG artifacts.
//!
//! Plots carry no text labels; the numbers behind each plot are returned
//! in the preview.

use std::path::Path;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use serde_json::{json, Value};

use dataplan_core::stats::{present, quantile};
use dataplan_core::tool_trait::{str_arg, str_list_arg, usize_arg};
use dataplan_core::{AnalysisContext, AnalysisTool, ArgMap, CoreError, CoreResult, ToolOutput};

use super::{artifact_path, sorted_groups, values_at};

pub(crate) const DEFAULT_HISTOGRAM_BINS: usize = 20;
const MAX_HISTOGRAM_BINS: usize = 1000;

const PANEL_WIDTH: u32 = 480;
const PANEL_HEIGHT: u32 = 360;
const MARGIN: u32 = 32;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const FILL: Rgb<u8> = Rgb([76, 114, 176]);
const MEDIAN: Rgb<u8> = Rgb([221, 132, 82]);

// ── Canvas ─────────────────────────────────────────────────────────────

/// One plotting panel inside a larger image.
struct Panel {
    left: u32,
    top: u32,
}

impl Panel {
    fn plot_width(&self) -> u32 {
        PANEL_WIDTH - 2 * MARGIN
    }

    fn plot_height(&self) -> u32 {
        PANEL_HEIGHT - 2 * MARGIN
    }

    fn origin(&self) -> (u32, u32) {
        (self.left + MARGIN, self.top + PANEL_HEIGHT - MARGIN)
    }

    fn draw_axes(&self, img: &mut RgbImage) {
        let (x0, y0) = self.origin();
        hline(img, x0, x0 + self.plot_width(), y0, AXIS);
        vline(img, x0, y0 - self.plot_height(), y0, AXIS);
    }

    /// Pixel row for `frac` in `[0, 1]` of the plot height.
    fn y_at(&self, frac: f64) -> u32 {
        let (_, y0) = self.origin();
        let h = (frac.clamp(0.0, 1.0) * self.plot_height() as f64).round() as u32;
        y0 - h
    }
}

fn hline(img: &mut RgbImage, x_from: u32, x_to: u32, y: u32, color: Rgb<u8>) {
    for x in x_from.min(x_to)..=x_from.max(x_to) {
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

fn vline(img: &mut RgbImage, x: u32, y_from: u32, y_to: u32, color: Rgb<u8>) {
    for y in y_from.min(y_to)..=y_from.max(y_to) {
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..y.saturating_add(h) {
        for xx in x..x.saturating_add(w) {
            if xx < img.width() && yy < img.height() {
                img.put_pixel(xx, yy, color);
            }
        }
    }
}

fn save_png(img: &RgbImage, path: &Path) -> CoreResult<()> {
    img.save(path)
        .map_err(|e| CoreError::tool(format!("Failed to write plot '{}': {}", path.display(), e)))
}

/// Lay `n` panels out in a grid of at most three columns.
fn grid(n: usize) -> (RgbImage, Vec<Panel>) {
    let cols = n.clamp(1, 3) as u32;
    let rows = n.div_ceil(3).max(1) as u32;
    let img = RgbImage::from_pixel(cols * PANEL_WIDTH, rows * PANEL_HEIGHT, WHITE);
    let panels = (0..n as u32)
        .map(|i| Panel {
            left: (i % cols) * PANEL_WIDTH,
            top: (i / cols) * PANEL_HEIGHT,
        })
        .collect();
    (img, panels)
}

// ── Histogram ──────────────────────────────────────────────────────────

/// Equal-width bin counts of `values`. Returns `(edges, counts)` with
/// `edges.len() == counts.len() + 1`; the last bin is closed on the right.
pub(crate) fn histogram_bins(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    let bins = bins.max(1);
    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if values.is_empty() {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &x in values {
        let idx = (((x - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (edges, counts)
}

/// Histogram of each requested numeric column, one panel per column.
pub struct HistogramTool;

#[async_trait]
impl AnalysisTool for HistogramTool {
    fn name(&self) -> &str {
        "histogram"
    }

    fn description(&self) -> &str {
        "Histogram of each numeric column"
    }

    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput> {
        let ds = ctx.dataset();
        let columns = str_list_arg(args, "columns").unwrap_or_default();
        if columns.is_empty() {
            return Err(CoreError::tool("histogram requires at least one column"));
        }
        let bins = match args.get("bins") {
            None | Some(Value::Null) => DEFAULT_HISTOGRAM_BINS,
            Some(_) => usize_arg(args, "bins")
                .filter(|&b| (1..=MAX_HISTOGRAM_BINS).contains(&b))
                .ok_or_else(|| {
                    CoreError::tool(format!(
                        "histogram 'bins' must be an integer between 1 and {}",
                        MAX_HISTOGRAM_BINS
                    ))
                })?,
        };

        let mut binned = Vec::with_capacity(columns.len());
        for name in &columns {
            let values = present(ds.numeric(name)?);
            binned.push((name.as_str(), histogram_bins(&values, bins)));
        }

        let (mut img, panels) = grid(binned.len());
        for (panel, (_, (_, counts))) in panels.iter().zip(&binned) {
            panel.draw_axes(&mut img);
            let peak = counts.iter().copied().max().unwrap_or(0).max(1) as f64;
            let bar_w = (panel.plot_width() / counts.len() as u32).max(1);
            let (x0, y0) = panel.origin();
            for (i, &count) in counts.iter().enumerate() {
                let top = panel.y_at(count as f64 / peak);
                let x = x0 + 1 + i as u32 * bar_w;
                fill_rect(&mut img, x, top, bar_w.saturating_sub(1), y0 - top, FILL);
            }
        }

        let path = artifact_path(ctx, "hist", "png")?;
        save_png(&img, &path)?;
        tracing::debug!(path = %path.display(), columns = columns.len(), "Histogram written");

        let preview: Vec<Value> = binned
            .iter()
            .map(|(name, (edges, counts))| {
                json!({ "column": name, "bin_edges": edges, "counts": counts })
            })
            .collect();
        Ok(ToolOutput::preview(Value::Array(preview)).with_artifact(path))
    }
}

// ── Boxplot ────────────────────────────────────────────────────────────

/// Five-number summary of one boxplot group.
#[derive(Debug, Clone, PartialEq)]
struct BoxStats {
    count: usize,
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
}

impl BoxStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            count: sorted.len(),
            min: *sorted.first()?,
            q1: quantile(&sorted, 0.25)?,
            median: quantile(&sorted, 0.5)?,
            q3: quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}

/// Boxplot of `y` grouped by the levels of `x`.
pub struct BoxplotTool;

#[async_trait]
impl AnalysisTool for BoxplotTool {
    fn name(&self) -> &str {
        "boxplot"
    }

    fn description(&self) -> &str {
        "Box-and-whisker plot of a numeric column grouped by a category"
    }

    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput> {
        let ds = ctx.dataset();
        let x = str_arg(args, "x").ok_or_else(|| CoreError::tool("boxplot requires 'x'"))?;
        let y = str_arg(args, "y").ok_or_else(|| CoreError::tool("boxplot requires 'y'"))?;

        let group_col = ds.require_column(x)?;
        let values = ds.numeric(y)?;

        let boxes: Vec<(String, BoxStats)> = sorted_groups(group_col, ds.num_rows())
            .into_iter()
            .filter_map(|(label, rows)| {
                BoxStats::from_values(&values_at(values, &rows)).map(|stats| (label, stats))
            })
            .collect();
        if boxes.is_empty() {
            return Err(CoreError::tool(format!(
                "boxplot found no numeric values of '{}' in any group of '{}'",
                y, x
            )));
        }

        let img = render_boxes(&boxes);
        let path = artifact_path(ctx, "box", "png")?;
        save_png(&img, &path)?;
        tracing::debug!(path = %path.display(), groups = boxes.len(), "Boxplot written");

        let preview: Vec<Value> = boxes
            .iter()
            .map(|(label, s)| {
                json!({
                    x: label,
                    "count": s.count,
                    "min": s.min,
                    "q1": s.q1,
                    "median": s.median,
                    "q3": s.q3,
                    "max": s.max,
                })
            })
            .collect();
        Ok(ToolOutput::preview(Value::Array(preview)).with_artifact(path))
    }
}

fn render_boxes(boxes: &[(String, BoxStats)]) -> RgbImage {
    let (mut img, panels) = grid(1);
    let panel = &panels[0];
    panel.draw_axes(&mut img);

    let lo = boxes.iter().map(|(_, s)| s.min).fold(f64::INFINITY, f64::min);
    let hi = boxes.iter().map(|(_, s)| s.max).fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let scale = |v: f64| panel.y_at(0.05 + 0.9 * (v - lo) / span);

    let (x0, _) = panel.origin();
    let slot = panel.plot_width() / boxes.len() as u32;
    let box_w = (slot / 2).max(2);
    for (i, (_, s)) in boxes.iter().enumerate() {
        let center = x0 + slot * i as u32 + slot / 2;
        let left = center - box_w / 2;
        let (top, bottom) = (scale(s.q3), scale(s.q1));

        vline(&mut img, center, scale(s.max), top, AXIS);
        vline(&mut img, center, bottom, scale(s.min), AXIS);
        hline(&mut img, left + box_w / 4, left + 3 * box_w / 4, scale(s.max), AXIS);
        hline(&mut img, left + box_w / 4, left + 3 * box_w / 4, scale(s.min), AXIS);

        fill_rect(&mut img, left, top, box_w, bottom - top + 1, FILL);
        hline(&mut img, left, left + box_w, scale(s.median), MEDIAN);
    }
    img
}
