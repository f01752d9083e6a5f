use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use crate::color::generate_palette;
use crate::data::analysis::Analysis;
use crate::stats::distribution::{grouped_box_stats, histogram};
use crate::stats::regression::trendline;

use super::panels::title_case;

const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Distribution histogram
// ---------------------------------------------------------------------------

/// Histogram of one subject.
pub fn distribution_plot(ui: &mut Ui, analysis: &Analysis, subject: &str, bins: usize) {
    let Some(hist) = analysis.table.numeric(subject).and_then(|v| histogram(v, bins)) else {
        ui.label("No values to plot.");
        return;
    };

    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bars()
        .map(|(centre, count)| Bar::new(centre, count as f64).width(width))
        .collect();

    Plot::new("distribution_plot")
        .height(PLOT_HEIGHT)
        .x_axis_label(title_case(subject))
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(75, 139, 190)));
        });
}

// ---------------------------------------------------------------------------
// Box plot grouped by another column
// ---------------------------------------------------------------------------

/// One box of `subject` per distinct value of `compare`.
pub fn compare_box_plot(
    ui: &mut Ui,
    analysis: &Analysis,
    subject: &str,
    compare: &str,
    whisker: f64,
) {
    let (Some(values), Some(group_col)) = (
        analysis.table.numeric(subject),
        analysis.table.column(compare),
    ) else {
        ui.label("Column not found.");
        return;
    };

    let keys: Vec<_> = (0..analysis.table.len())
        .map(|row| group_col.values.key(row))
        .collect();
    let groups = grouped_box_stats(&keys, values, whisker);
    if groups.is_empty() {
        ui.label("No values to plot.");
        return;
    }

    let palette = generate_palette(groups.len());
    let labels: Vec<String> = groups
        .iter()
        .map(|(key, _)| {
            if key.is_null() {
                "(missing)".to_string()
            } else {
                key.to_string()
            }
        })
        .collect();

    Plot::new("compare_box_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(title_case(compare))
        .y_axis_label(title_case(subject))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, ((_, stats), label)) in groups.iter().zip(&labels).enumerate() {
                let spread = BoxSpread::new(
                    stats.lower_whisker,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.upper_whisker,
                );
                let elem = BoxElem::new(i as f64, spread).name(label).box_width(0.6);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label).color(palette[i]));

                if !stats.outliers.is_empty() {
                    let points: PlotPoints = stats.outliers.iter().map(|&v| [i as f64, v]).collect();
                    plot_ui.points(Points::new(points).color(palette[i]).radius(2.5));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter with OLS trendline
// ---------------------------------------------------------------------------

/// Scatter of `subject` against `feature` with the fitted line over it.
pub fn regression_plot(ui: &mut Ui, analysis: &Analysis, subject: &str, feature: &str) {
    let (Some(y), Some(x)) = (analysis.table.numeric(subject), analysis.table.numeric(feature))
    else {
        ui.label("Column not found.");
        return;
    };

    let points: Vec<[f64; 2]> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some([(*a)?, (*b)?]))
        .collect();
    let fit = trendline(x, y);

    match &fit {
        Some(t) => {
            let r = analysis.correlation.get(subject, feature).unwrap_or(f64::NAN);
            ui.label(format!(
                "{} = {:.3} × {} {:+.3}    R² = {:.3}  r = {r:.3}  (n = {})",
                title_case(subject),
                t.slope,
                title_case(feature),
                t.intercept,
                t.r_squared,
                t.n
            ));
        }
        None => {
            ui.label("Not enough varying points for a trendline.");
        }
    }

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    Plot::new("regression_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(title_case(feature))
        .y_axis_label(title_case(subject))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .name("students")
                    .color(Color32::LIGHT_BLUE)
                    .radius(3.0),
            );
            if let Some(t) = fit {
                let line: PlotPoints = vec![[x_min, t.at(x_min)], [x_max, t.at(x_max)]].into();
                plot_ui.line(Line::new(line).name("OLS trendline").color(Color32::RED).width(2.0));
            }
        });
}
