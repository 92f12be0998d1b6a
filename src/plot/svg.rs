//! SVG rendering for [`Heatmap`].

use std::fmt::Write as _;

use super::heatmap::{Heatmap, WEEKDAYS};

const CELL_W: usize = 44;
const CELL_H: usize = 18;
const LEFT: usize = 48;
const TOP: usize = 70;

// Diverging palette: quiet hours cold, busy hours hot.
const COLD: (f64, f64, f64) = (140.0, 200.0, 240.0);
const MID: (f64, f64, f64) = (26.0, 26.0, 46.0);
const HOT: (f64, f64, f64) = (245.0, 158.0, 66.0);

/// Render `heatmap` as a standalone SVG document (hours down, weekdays across).
pub fn render_svg(heatmap: &Heatmap, title: &str, subtitle: &str) -> String {
    let width = LEFT + CELL_W * WEEKDAYS.len() + 16;
    let height = TOP + CELL_H * heatmap.hours() + 16;
    let (lo, hi) = heatmap.range();

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" font-family="sans-serif">"#
    );
    let _ = writeln!(
        out,
        r#"<rect width="{width}" height="{height}" fill="white"/>"#
    );
    let _ = writeln!(
        out,
        r#"<text x="{}" y="22" font-size="16" text-anchor="middle">{}</text>"#,
        width / 2,
        escape(title)
    );
    let _ = writeln!(
        out,
        r##"<text x="{}" y="40" font-size="10" text-anchor="middle" fill="#555">{}</text>"##,
        width / 2,
        escape(subtitle)
    );

    for (col, day) in WEEKDAYS.iter().enumerate() {
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="11" text-anchor="middle">{day}</text>"#,
            LEFT + col * CELL_W + CELL_W / 2,
            TOP - 6
        );
    }

    for hour in 0..heatmap.hours() {
        let y = TOP + hour * CELL_H;
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{hour:02}</text>"#,
            LEFT - 6,
            y + CELL_H - 5
        );
        for col in 0..WEEKDAYS.len() {
            let score = heatmap.score(hour, col);
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{y}" width="{CELL_W}" height="{CELL_H}" fill="{}"><title>{} {hour:02}:00 z={score:.2}</title></rect>"#,
                LEFT + col * CELL_W,
                color(score, lo, hi),
                WEEKDAYS[col]
            );
        }
    }

    out.push_str("</svg>\n");
    out
}

fn color(value: f64, lo: f64, hi: f64) -> String {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
    let (from, to, local) = if t < 0.5 {
        (COLD, MID, t * 2.0)
    } else {
        (MID, HOT, (t - 0.5) * 2.0)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * local).round().clamp(0.0, 255.0) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(from.0, to.0),
        mix(from.1, to.1),
        mix(from.2, to.2)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
