//! Activity heatmap built from dumped connection data.

pub mod heatmap;
pub mod svg;

pub use heatmap::{ActivityGrid, Heatmap, WEEKDAYS, load_status_times};
pub use svg::render_svg;
