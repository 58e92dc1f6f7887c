//! Visualization: render a country profile as stacked line charts to **SVG**, **PNG**
//! or an in-memory RGB buffer.
//!
//! - One panel per requested indicator, in profile order (GDP, GDP per capita, population)
//! - Values rescaled for display (GDP in billions, population in millions)
//! - Only years inside the profile's range are drawn, sorted by year
//! - Distinct panel colors (Microsoft Office palette), line plus point markers

pub mod fonts;
pub mod util;

pub use fonts::{FONT_ENV, font_available};

use crate::models::{CountryProfile, Indicator, YearRange};
use anyhow::{Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;

use util::{format_tick, office_color, value_bounds, x_label_count, year_bounds};

/// One chart panel: a single indicator, already rescaled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub indicator: Indicator,
    pub title: String,
    pub y_label: String,
    pub points: Vec<(i32, f64)>,
}

/// Build the panels for every requested indicator of `profile`.
///
/// Indicators whose fetch failed still get a panel, with no points.
pub fn profile_panels(profile: &CountryProfile, country_name: &str) -> Vec<Panel> {
    let range = profile.range;
    profile
        .requested()
        .map(|indicator| {
            let (scale, unit) = indicator.display_scale();
            let points = profile
                .get(indicator)
                .map(|s| {
                    s.points_within(range)
                        .into_iter()
                        .map(|(y, v)| (y, v / scale))
                        .collect()
                })
                .unwrap_or_default();
            Panel {
                indicator,
                title: format!(
                    "{} of {} ({}-{})",
                    indicator.label(),
                    country_name,
                    range.start,
                    range.end
                ),
                y_label: format!("{} ({})", indicator.label(), unit),
                points,
            }
        })
        .collect()
}

/// Render `profile` to `out_path`; `.svg` selects SVG output, anything else PNG.
pub fn render_profile<P: AsRef<Path>>(
    profile: &CountryProfile,
    country_name: &str,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let panels = checked_panels(profile, country_name)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_panels(root, &panels, profile.range)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_panels(root, &panels, profile.range)?;
    }
    Ok(())
}

/// Render `profile` into a `width * height * 3` RGB buffer (row-major, no padding).
pub fn render_profile_rgb(
    profile: &CountryProfile,
    country_name: &str,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    let panels = checked_panels(profile, country_name)?;
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_panels(root, &panels, profile.range)?;
    }
    Ok(buf)
}

fn checked_panels(profile: &CountryProfile, country_name: &str) -> Result<Vec<Panel>> {
    let panels = profile_panels(profile, country_name);
    if panels.is_empty() {
        bail!("no indicators to plot");
    }
    if fonts::ensure_font_registered().is_none() {
        bail!(
            "no usable font for chart text; set {} to a .ttf file",
            FONT_ENV
        );
    }
    Ok(panels)
}

/// Helper that draws stacked panels to any Plotters backend.
fn draw_panels<DB>(root: DrawingArea<DB, Shift>, panels: &[Panel], range: YearRange) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let areas = root.split_evenly((panels.len(), 1));
    for (idx, (area, panel)) in areas.iter().zip(panels).enumerate() {
        draw_panel(area, panel, range, office_color(idx))?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    range: YearRange,
    color: RGBAColor,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (min_year, max_year) = year_bounds(range.start, range.end);
    let (min_val, max_val) = value_bounds(&panel.points);

    let caption = if panel.points.is_empty() {
        format!("{} (no data)", panel.title)
    } else {
        panel.title.clone()
    };

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .caption(caption, ("sans-serif", 18))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(min_year..max_year, min_val..max_val)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |y: &i32| y.to_string();
    let y_label_fmt = |v: &f64| format_tick(*v);

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(panel.y_label.as_str())
        .x_labels(x_label_count(min_year, max_year))
        .y_labels(6)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style(("sans-serif", 12))
        .axis_desc_style(("sans-serif", 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    if panel.points.is_empty() {
        return Ok(());
    }

    let style = ShapeStyle {
        color,
        filled: false,
        stroke_width: 2,
    };
    chart
        .draw_series(LineSeries::new(panel.points.clone(), style))
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .draw_series(
            panel
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Series;
    use std::collections::BTreeMap;

    fn profile() -> CountryProfile {
        let gdp: Series = [
            ("2002".to_string(), 3.0e12),
            ("2000".to_string(), 1.0e12),
            ("1999".to_string(), 9.0e11),
        ]
        .into_iter()
        .collect();
        let mut series = BTreeMap::new();
        series.insert(Indicator::Gdp, Some(gdp));
        series.insert(Indicator::GdpPerCapita, None);
        CountryProfile {
            country_code: "USA".into(),
            range: YearRange::new(2000, 2002),
            series,
        }
    }

    #[test]
    fn panels_are_scaled_sorted_and_clipped() {
        let panels = profile_panels(&profile(), "United States");
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].indicator, Indicator::Gdp);
        assert_eq!(panels[0].points, vec![(2000, 1000.0), (2002, 3000.0)]);
        assert_eq!(panels[0].y_label, "GDP (billion US$)");
        assert!(panels[0].title.contains("United States"));
        assert_eq!(panels[1].indicator, Indicator::GdpPerCapita);
        assert!(panels[1].points.is_empty());
    }
}
