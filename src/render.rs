//! Self-contained HTML chart: one inline SVG, one line per language, hover tooltips per point.

use std::fs;
use std::path::Path;

use chrono::DateTime;
use tracing::info;

use ccount::{DataPoint, LanguageSeries, Result};

const COLOURS: [&str; 4] = ["cadetblue", "crimson", "peru", "olive"];

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;
const DAY_SECS: i64 = 86_400;

/// A point that is actually drawn, with its index in the language's series.
struct Plotted<'a> {
    index: usize,
    point: &'a DataPoint,
}

/// Maps data coordinates (unix seconds, lines) to SVG pixels.
struct Frame {
    t_min: i64,
    t_max: i64,
    y_max: u64,
}

impl Frame {
    fn fit<'a>(points: impl Iterator<Item = &'a DataPoint>) -> Option<Self> {
        let mut frame: Option<Frame> = None;
        for p in points {
            let t = p.commit.timestamp.timestamp();
            let f = frame.get_or_insert(Frame { t_min: t, t_max: t, y_max: 0 });
            f.t_min = f.t_min.min(t);
            f.t_max = f.t_max.max(t);
            f.y_max = f.y_max.max(p.code);
        }
        frame.map(|mut f| {
            if f.t_min == f.t_max {
                f.t_min -= DAY_SECS;
                f.t_max += DAY_SECS;
            }
            f.y_max = nice_ceiling(f.y_max.max(1));
            f
        })
    }

    fn x(&self, t: i64) -> f64 {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (t - self.t_min) as f64 / (self.t_max - self.t_min) as f64 * plot_w
    }

    fn y(&self, code: u64) -> f64 {
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        HEIGHT - MARGIN_BOTTOM - code as f64 / self.y_max as f64 * plot_h
    }
}

/// Smallest 1/2/5 × 10^k that is ≥ `n`.
fn nice_ceiling(n: u64) -> u64 {
    let mut magnitude = 1u64;
    loop {
        for step in [1, 2, 5] {
            let candidate = step * magnitude;
            if candidate >= n {
                return candidate;
            }
        }
        match magnitude.checked_mul(10) {
            Some(m) => magnitude = m,
            None => return n,
        }
    }
}

/// `1234567` → `1,234,567`
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn tooltip(index: usize, point: &DataPoint) -> String {
    format!(
        "Index: {}\nRef: {}\nDate: {}\nLOC: {}\nMessage: {}",
        index,
        point.commit.short_ref(),
        point.commit.timestamp.format("%Y-%m-%d %H:%M %:z"),
        thousands(point.code),
        point.commit.subject
    )
}

/// Zero-valued points mean "language not present yet" and are left out.
fn plotted(points: &[DataPoint]) -> Vec<Plotted<'_>> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.code > 0)
        .map(|(index, point)| Plotted { index, point })
        .collect()
}

fn render_axes(svg: &mut String, frame: &Frame) {
    let x0 = MARGIN_LEFT;
    let x1 = WIDTH - MARGIN_RIGHT;
    let y0 = HEIGHT - MARGIN_BOTTOM;
    let y1 = MARGIN_TOP;

    svg.push_str(&format!(
        "<line class=\"axis\" x1=\"{x0}\" y1=\"{y0}\" x2=\"{x1}\" y2=\"{y0}\"/>\n\
         <line class=\"axis\" x1=\"{x0}\" y1=\"{y0}\" x2=\"{x0}\" y2=\"{y1}\"/>\n"
    ));

    for i in 0..=TICKS {
        let code = frame.y_max * i as u64 / TICKS as u64;
        let y = frame.y(code);
        svg.push_str(&format!(
            "<line class=\"grid\" x1=\"{x0}\" y1=\"{y:.1}\" x2=\"{x1}\" y2=\"{y:.1}\"/>\n\
             <text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            x0 - 8.0,
            y + 4.0,
            thousands(code)
        ));

        let t = frame.t_min + (frame.t_max - frame.t_min) * i as i64 / TICKS as i64;
        let label = DateTime::from_timestamp(t, 0)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        svg.push_str(&format!(
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            frame.x(t),
            y0 + 20.0,
            label
        ));
    }

    svg.push_str(&format!(
        "<text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Date</text>\n\
         <text class=\"label\" transform=\"translate(20 {:.1}) rotate(-90)\" text-anchor=\"middle\">Lines of code</text>\n",
        (x0 + x1) / 2.0,
        HEIGHT - 15.0,
        (y0 + y1) / 2.0
    ));
}

fn render_language(svg: &mut String, frame: &Frame, colour: &str, points: &[Plotted<'_>]) {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1},{:.1}", frame.x(p.point.commit.timestamp.timestamp()), frame.y(p.point.code)))
        .collect();
    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/>\n",
        colour,
        coords.join(" ")
    ));
    for (p, xy) in points.iter().zip(&coords) {
        let (x, y) = xy.split_once(',').unwrap_or(("0", "0"));
        svg.push_str(&format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"{}\"><title>{}</title></circle>\n",
            x,
            y,
            colour,
            escape_html(&tooltip(p.index, p.point))
        ));
    }
}

fn render_legend(svg: &mut String, entries: &[(&str, &str)]) {
    let x = WIDTH - MARGIN_RIGHT + 20.0;
    for (i, (language, colour)) in entries.iter().enumerate() {
        let y = MARGIN_TOP + 10.0 + i as f64 * 22.0;
        svg.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"14\" height=\"14\" fill=\"{colour}\"/>\n\
             <text class=\"legend\" x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            y - 11.0,
            x + 22.0,
            y,
            escape_html(language)
        ));
    }
}

/// Full HTML document for `series`.
///
/// Lines and legend follow the order of `languages` (as requested on the command line) and
/// cycle through the colours. Languages without a series are skipped.
pub fn render_html(series: &LanguageSeries, languages: &[String], title: &str) -> String {
    let drawn: Vec<(&str, &str, Vec<Plotted<'_>>)> = languages
        .iter()
        .filter_map(|language| series.get_key_value(language))
        .enumerate()
        .map(|(i, (language, points))| (language.as_str(), COLOURS[i % COLOURS.len()], plotted(points)))
        .collect();

    let mut svg = String::new();
    let frame = Frame::fit(drawn.iter().flat_map(|(_, _, pts)| pts.iter().map(|p| p.point)));
    match &frame {
        Some(frame) => {
            render_axes(&mut svg, frame);
            for (_, colour, points) in drawn.iter().filter(|(_, _, pts)| !pts.is_empty()) {
                render_language(&mut svg, frame, colour, points);
            }
        }
        None => svg.push_str(&format!(
            "<text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">No lines of code found for the selected languages</text>\n",
            WIDTH / 2.0,
            HEIGHT / 2.0
        )),
    }
    let legend: Vec<(&str, &str)> = drawn.iter().map(|(lang, colour, _)| (*lang, *colour)).collect();
    render_legend(&mut svg, &legend);

    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; color: #222; }}
.axis {{ stroke: #444; stroke-width: 1; }}
.grid {{ stroke: #ddd; stroke-width: 1; }}
.tick {{ font-size: 11px; fill: #555; }}
.label {{ font-size: 13px; fill: #333; }}
.legend {{ font-size: 13px; }}
circle:hover {{ r: 6; }}
</style>
</head>
<body>
<h1>{title}</h1>
<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">
{svg}</svg>
</body>
</html>
"#
    )
}

pub fn write_chart(path: &Path, series: &LanguageSeries, languages: &[String], title: &str) -> Result<()> {
    let html = render_html(series, languages, title);
    fs::write(path, html.as_bytes())?;
    info!(path = %path.display(), bytes = html.len(), "Wrote chart");
    Ok(())
}
