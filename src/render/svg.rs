//! Inline SVG drawing of the two report panels.

use crate::render::Marker;
use color_eyre::eyre::{Report, Result};
use std::fmt::Write;

/// Fill colour of the significance bars.
pub const BAR_COLOR: &str = "indianred";
/// Marker radius in pixels (diameter 10).
pub const MARKER_RADIUS: f64 = 5.0;

/// Viridis colour scale stops, low to high.
const VIRIDIS: &[(u8, u8, u8)] = &[
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

/// Plot area of one panel, in pixels of the enclosing SVG.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Map a data value in `[min, max]` onto the horizontal extent.
    pub fn x(&self, v: f64, min: f64, max: f64) -> f64 {
        self.left + (v - min) / (max - min).max(1e-9) * self.width
    }

    /// Map a data value in `[min, max]` onto the vertical extent, upwards.
    pub fn y(&self, v: f64, min: f64, max: f64) -> f64 {
        self.bottom() - (v - min) / (max - min).max(1e-9) * self.height
    }
}

/// Draw the bar panel: one bar per `(category, count)`.
pub fn bar_panel(out: &mut String, frame: &Frame, bars: &[(String, usize)]) -> Result<(), Report> {
    writeln!(out, "<g class=\"panel bars\">")?;
    background(out, frame)?;

    let max_count = bars.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1) as f64;
    // counts are whole numbers, so ticks never step below one
    let (_, step, _) = nice_ticks(0.0, max_count, 5);
    let step = step.max(1.0);
    let count = (max_count / step).ceil() as usize + 1;
    let y_max = step * (count - 1) as f64;

    for i in 0..count {
        let v = step * i as f64;
        let y = frame.y(v, 0.0, y_max);
        grid_line_y(out, frame, y)?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{y}\" class=\"tick\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            frame.left - 6.0,
            fmt_tick(v)
        )?;
    }

    let band = frame.width / bars.len().max(1) as f64;
    let rotate = bars.len() > 3;
    for (i, (category, count)) in bars.iter().enumerate() {
        let x = frame.left + band * i as f64 + band * 0.1;
        let y = frame.y(*count as f64, 0.0, y_max);
        let category = escape(category);
        writeln!(
            out,
            "<g class=\"bar\"><rect x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" fill=\"{BAR_COLOR}\"/><title>{category}: {count}</title></g>",
            band * 0.8,
            frame.bottom() - y
        )?;

        let label_x = frame.left + band * (i as f64 + 0.5);
        let label_y = frame.bottom() + 14.0;
        match rotate {
            true => writeln!(
                out,
                "<text x=\"{label_x}\" y=\"{label_y}\" class=\"tick\" text-anchor=\"end\" transform=\"rotate(-30 {label_x} {label_y})\">{category}</text>"
            )?,
            false => writeln!(
                out,
                "<text x=\"{label_x}\" y=\"{label_y}\" class=\"tick\" text-anchor=\"middle\">{category}</text>"
            )?,
        }
    }

    axis_title_y(out, frame, "Count")?;
    writeln!(out, "</g>")?;
    Ok(())
}

/// Draw the scatter panel: one marker per positioned variant at y = 1.
pub fn scatter_panel(out: &mut String, frame: &Frame, markers: &[Marker]) -> Result<(), Report> {
    writeln!(out, "<g class=\"panel scatter\">")?;
    background(out, frame)?;

    if markers.is_empty() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" class=\"note\" text-anchor=\"middle\">No positional data</text>",
            frame.center_x(),
            frame.top + frame.height / 2.0
        )?;
        writeln!(out, "</g>")?;
        return Ok(());
    }

    let (x_min, x_max) = x_range(markers.iter().map(|m| m.x as f64));
    let (y_min, y_max) = (0.0, 2.0);

    // vertical axis is constant, keep a few reference lines
    for v in [0.0, 0.5, 1.0, 1.5, 2.0] {
        let y = frame.y(v, y_min, y_max);
        grid_line_y(out, frame, y)?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{y}\" class=\"tick\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            frame.left - 6.0,
            fmt_tick(v)
        )?;
    }

    let (start, step, count) = nice_ticks(x_min, x_max, 5);
    for i in 0..count {
        let v = start + step * i as f64;
        if v < x_min || v > x_max {
            continue;
        }
        let x = frame.x(v, x_min, x_max);
        writeln!(
            out,
            "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" class=\"grid\"/>",
            frame.top,
            frame.bottom()
        )?;
        writeln!(
            out,
            "<text x=\"{x}\" y=\"{}\" class=\"tick\" text-anchor=\"middle\">{}</text>",
            frame.bottom() + 14.0,
            fmt_tick(v)
        )?;
    }

    let cy = frame.y(1.0, y_min, y_max);
    for marker in markers {
        let cx = frame.x(marker.x as f64, x_min, x_max);
        writeln!(
            out,
            "<circle class=\"marker\" cx=\"{cx}\" cy=\"{cy}\" r=\"{MARKER_RADIUS}\" fill=\"{}\"><title>Variant: {}&#10;Position: {}&#10;Significance: {}</title></circle>",
            marker.color,
            escape(&marker.id),
            marker.x,
            escape(&marker.significance)
        )?;
    }

    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" class=\"axis\" text-anchor=\"middle\">Position (hg19)</text>",
        frame.center_x(),
        frame.bottom() + 36.0
    )?;
    writeln!(out, "</g>")?;
    Ok(())
}

fn background(out: &mut String, frame: &Frame) -> Result<(), Report> {
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
        frame.left, frame.top, frame.width, frame.height
    )?;
    Ok(())
}

fn grid_line_y(out: &mut String, frame: &Frame, y: f64) -> Result<(), Report> {
    writeln!(
        out,
        "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" class=\"grid\"/>",
        frame.left,
        frame.left + frame.width
    )?;
    Ok(())
}

fn axis_title_y(out: &mut String, frame: &Frame, title: &str) -> Result<(), Report> {
    let x = frame.left - 40.0;
    let y = frame.top + frame.height / 2.0;
    writeln!(
        out,
        "<text x=\"{x}\" y=\"{y}\" class=\"axis\" text-anchor=\"middle\" transform=\"rotate(-90 {x} {y})\">{}</text>",
        escape(title)
    )?;
    Ok(())
}

/// Horizontal data range with 5% padding, never zero-width.
fn x_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

/// Returns `(start, step, count)` of evenly spaced round tick values covering `[min, max]`.
///
/// ```rust
/// use clinvar_study::render::svg::nice_ticks;
/// assert_eq!(nice_ticks(0.0, 10.0, 5), (0.0, 5.0, 3));
/// assert_eq!(nice_ticks(0.0, 7.0, 5), (0.0, 2.0, 5));
/// ```
pub fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks.max(2) as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

/// Format a tick value, integers without a decimal point.
pub fn fmt_tick(v: f64) -> String {
    if v.abs() < 1e-9 {
        "0".to_string()
    } else if (v - v.round()).abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        let text = format!("{v:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Escape text for use inside SVG/HTML elements and attributes.
///
/// ```rust
/// use clinvar_study::render::svg::escape;
/// assert_eq!(escape("chr1:g.100A>G"), "chr1:g.100A&gt;G");
/// assert_eq!(escape("\"a\" & 'b'"), "&quot;a&quot; &amp; &#39;b&#39;");
/// ```
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Hex colour at fraction `t` (clamped to `[0, 1]`) along the Viridis scale.
///
/// ```rust
/// use clinvar_study::render::svg::viridis;
/// assert_eq!(viridis(0.0), "#440154");
/// assert_eq!(viridis(1.0), "#fde725");
/// assert_eq!(viridis(7.0), "#fde725");
/// ```
pub fn viridis(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    format!("#{:02x}{:02x}{:02x}", lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame { left: 60.0, top: 80.0, width: 400.0, height: 300.0 }
    }

    #[test]
    fn bar_per_category() -> Result<(), Report> {
        let mut out = String::new();
        let bars = vec![("Pathogenic".to_string(), 2), ("Benign".to_string(), 1)];
        bar_panel(&mut out, &frame(), &bars)?;
        assert_eq!(out.matches("class=\"bar\"").count(), 2);
        assert!(out.contains("<title>Pathogenic: 2</title>"));
        assert!(out.contains("<title>Benign: 1</title>"));
        Ok(())
    }

    #[test]
    fn tallest_bar_fits_frame() -> Result<(), Report> {
        let f = frame();
        let mut out = String::new();
        bar_panel(&mut out, &f, &[("Pathogenic".to_string(), 7)])?;
        // y_max rounds up to a tick at or above the largest count
        assert!(!out.contains("height=\"-"));
        Ok(())
    }

    #[test]
    fn scatter_markers() -> Result<(), Report> {
        let markers = [100, 200]
            .into_iter()
            .map(|x| Marker {
                x,
                id: format!("chr1:g.{x}A>G"),
                significance: "Pathogenic".to_string(),
                color: viridis(0.5),
            })
            .collect::<Vec<_>>();
        let mut out = String::new();
        scatter_panel(&mut out, &frame(), &markers)?;
        assert_eq!(out.matches("class=\"marker\"").count(), 2);
        assert!(out.contains("Variant: chr1:g.100A&gt;G&#10;Position: 100&#10;Significance: Pathogenic"));
        Ok(())
    }

    #[test]
    fn scatter_without_markers() -> Result<(), Report> {
        let mut out = String::new();
        scatter_panel(&mut out, &frame(), &[])?;
        assert!(out.contains("No positional data"));
        assert!(!out.contains("class=\"marker\""));
        Ok(())
    }

    #[test]
    fn single_position_range() {
        let (min, max) = x_range([7577120.0].into_iter());
        assert!(min < 7577120.0 && max > 7577120.0);
    }

    #[test]
    fn tick_format() {
        assert_eq!(fmt_tick(7577120.0), "7577120");
        assert_eq!(fmt_tick(0.5), "0.5");
        assert_eq!(fmt_tick(-0.0), "0");
    }
}
