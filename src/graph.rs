use crate::chart::{ChartConfig, ChartKind};
use crate::palette::Rgb;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

/// Width reserved for the pie legend, in pixels
const PIE_LEGEND_WIDTH: u32 = 160;

/// Largest accepted canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// How values are drawn on an axis chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisMark {
    Bars,
    Line,
}

/// Render a chart configuration to PNG or SVG bytes
pub fn render_chart(config: &ChartConfig, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Canvas size must be non-zero (width: {}, height: {})",
            options.width,
            options.height
        );
    }
    if options.width > MAX_CANVAS_SIDE || options.height > MAX_CANVAS_SIDE {
        anyhow::bail!(
            "Canvas size {}x{} exceeds the {}px limit per side",
            options.width,
            options.height,
            MAX_CANVAS_SIDE
        );
    }
    if config.values().is_empty() {
        anyhow::bail!("Cannot draw a chart with no data");
    }
    // Plotters cannot build a coordinate range around inf or NaN
    if let Some((label, value)) = config
        .labels()
        .iter()
        .zip(config.values())
        .find(|(_, v)| !v.is_finite())
    {
        anyhow::bail!("Cannot draw non-finite value {} for '{}'", value, label);
    }

    match options.format {
        OutputFormat::Png => render_png(config, options.width, options.height),
        OutputFormat::Svg => render_svg(config, options.width, options.height),
    }
}

fn render_png(config: &ChartConfig, width: u32, height: u32) -> Result<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| anyhow::anyhow!("Canvas size {}x{} is too large", width, height))?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, config)?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn render_svg(config: &ChartConfig, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, config)?;
    }
    Ok(svg.into_bytes())
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, config: &ChartConfig) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    match config.kind {
        ChartKind::Bar => draw_axis_chart(root, config, AxisMark::Bars)?,
        ChartKind::Line => draw_axis_chart(root, config, AxisMark::Line)?,
        ChartKind::Pie => draw_pie(root, config)?,
    }

    root.present().context("Failed to present drawing")?;
    Ok(())
}

/// Bars or a filled line over one segment per category
fn draw_axis_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    config: &ChartConfig,
    mark: AxisMark,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels = config.labels();
    let values = config.values();
    let dataset = &config.data.datasets[0];
    let (x_title, y_title) = config
        .options
        .scales
        .as_ref()
        .map(|s| (s.x_title.clone(), s.y_title.clone()))
        .unwrap_or_default();

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(config.title(), ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..labels.len() as i32).into_segmented(), value_range(values))
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(idx) => labels
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(x_title)
        .y_desc(y_title)
        .draw()
        .context("Failed to draw mesh")?;

    let fills = parse_colors(&dataset.background_color)?;
    let borders = parse_colors(&dataset.border_color)?;

    match mark {
        AxisMark::Bars => {
            for (idx, &value) in values.iter().enumerate() {
                let fill = color_at(&fills, idx);
                let border = color_at(&borders, idx);
                let corners = [
                    (SegmentValue::Exact(idx as i32), 0.0),
                    (SegmentValue::Exact(idx as i32 + 1), value),
                ];

                let mut bar = Rectangle::new(corners.clone(), fill.filled());
                bar.set_margin(0, 0, 8, 8);
                let mut outline = Rectangle::new(corners, border.stroke_width(dataset.border_width));
                outline.set_margin(0, 0, 8, 8);

                chart
                    .draw_series([bar, outline])
                    .context("Failed to draw bar")?;
            }
        }
        AxisMark::Line => {
            let color = color_at(&fills, 0);
            let border = color_at(&borders, 0);
            let markers = parse_colors(&dataset.point_background_color)?;
            let points: Vec<(SegmentValue<i32>, f64)> = values
                .iter()
                .enumerate()
                .map(|(idx, &v)| (SegmentValue::CenterOf(idx as i32), v))
                .collect();

            if dataset.fill {
                chart
                    .draw_series(
                        AreaSeries::new(points.clone(), 0.0, color.mix(0.3))
                            .border_style(border.stroke_width(2)),
                    )
                    .context("Failed to draw area series")?;
            } else {
                chart
                    .draw_series(LineSeries::new(points.clone(), border.stroke_width(2)))
                    .context("Failed to draw line series")?;
            }

            chart
                .draw_series(
                    points
                        .into_iter()
                        .enumerate()
                        .map(|(idx, point)| {
                            let fill = if markers.is_empty() {
                                border
                            } else {
                                color_at(&markers, idx)
                            };
                            Circle::new(point, 4, fill.filled())
                        }),
                )
                .context("Failed to draw points")?;
        }
    }

    Ok(())
}

/// Pie wedges on the left, legend on the right
fn draw_pie<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, config: &ChartConfig) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root
        .titled(config.title(), ("sans-serif", 20))
        .context("Failed to draw title")?;
    let (width, height) = area.dim_in_pixel();
    let legend_width = PIE_LEGEND_WIDTH.min(width / 3);

    let dataset = &config.data.datasets[0];
    let fills = parse_colors(&dataset.background_color)?;
    let borders = parse_colors(&dataset.border_color)?;

    let center = (
        ((width - legend_width) / 2) as f64,
        (height / 2) as f64,
    );
    let radius = center.0.min(center.1) * 0.85;

    // Negative slices cannot be drawn; they are left out of the circle
    let values = config.values();
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();

    if total > 0.0 {
        let mut start = -PI / 2.0;
        for (idx, value) in values.iter().enumerate() {
            let sweep = value.max(0.0) / total * 2.0 * PI;
            if sweep <= 0.0 {
                continue;
            }
            let wedge = wedge_points(center, radius, start, sweep);
            start += sweep;

            area.draw(&Polygon::new(wedge.clone(), color_at(&fills, idx).filled()))
                .context("Failed to draw pie slice")?;
            let mut outline = wedge;
            outline.push(outline[0]);
            area.draw(&PathElement::new(
                outline,
                color_at(&borders, idx).stroke_width(dataset.border_width),
            ))
            .context("Failed to draw pie slice border")?;
        }
    }

    let legend_x = (width - legend_width) as i32 + 10;
    for (idx, label) in config.labels().iter().enumerate() {
        let y = 20 + idx as i32 * 20;
        area.draw(&Rectangle::new(
            [(legend_x, y), (legend_x + 12, y + 12)],
            color_at(&fills, idx).filled(),
        ))
        .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(
            label.clone(),
            (legend_x + 18, y),
            ("sans-serif", 14).into_font(),
        ))
        .context("Failed to draw legend label")?;
    }

    Ok(())
}

/// Pixel outline of a wedge: the center followed by points along the arc
fn wedge_points(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.to_degrees()).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        points.push((
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        ));
    }
    points
}

/// Y range that always includes zero, padded 5% above the data
fn value_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().cloned().fold(0.0, f64::min);
    let max = values.iter().cloned().fold(0.0, f64::max);

    if min == max {
        return min..(max + 1.0);
    }
    let padding = (max - min) * 0.05;
    let low = if min < 0.0 { min - padding } else { min };
    low..(max + padding)
}

fn parse_colors(hex: &[String]) -> Result<Vec<RGBColor>> {
    hex.iter()
        .map(|h| -> Result<RGBColor> {
            let Rgb { r, g, b } = Rgb::from_hex(h)?;
            Ok(RGBColor(r, g, b))
        })
        .collect()
}

fn color_at(colors: &[RGBColor], idx: usize) -> RGBColor {
    if colors.is_empty() {
        BLUE
    } else {
        colors[idx % colors.len()]
    }
}
