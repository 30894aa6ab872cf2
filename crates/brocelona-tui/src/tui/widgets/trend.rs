// Trend widget: cumulative points per team across league weeks.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition};
use ratatui::Frame;

use brocelona_core::views::TrendSeries;

use crate::tui::widgets::render_placeholder;
use crate::tui::ViewState;

const TITLE: &str = "Points Trend";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        render_placeholder(frame, area, TITLE, state);
        return;
    };
    let series = &dashboard.trend;

    let points: Vec<Vec<(f64, f64)>> = series.iter().map(chart_points).collect();
    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&points)
        .map(|(s, data)| {
            Dataset::default()
                .name(s.team.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(state.settings.team_color(&s.team)))
                .data(data)
        })
        .collect();

    let (first_week, last_week) = week_bounds(series);
    let max_points = max_points(series);

    let x_axis = Axis::default()
        .title("Week")
        .style(Style::default().fg(Color::Gray))
        .bounds([first_week as f64, last_week as f64])
        .labels([
            Span::raw(first_week.to_string()),
            Span::raw(last_week.to_string()),
        ]);
    let y_axis = Axis::default()
        .title("Pts")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, max_points as f64])
        .labels([
            Span::raw("0"),
            Span::raw((max_points / 2).to_string()),
            Span::raw(max_points.to_string()),
        ]);

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(TITLE))
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(Some(LegendPosition::TopLeft));
    frame.render_widget(chart, area);
}

fn chart_points(series: &TrendSeries) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .map(|&(week, total)| (week as f64, total as f64))
        .collect()
}

/// First and last league week; a single-week season still spans one unit.
pub fn week_bounds(series: &[TrendSeries]) -> (u32, u32) {
    let weeks = series.iter().flat_map(|s| s.points.iter().map(|&(w, _)| w));
    let first = weeks.clone().min().unwrap_or(0);
    let last = weeks.max().unwrap_or(0);
    if last > first {
        (first, last)
    } else {
        (first, first + 1)
    }
}

/// Top of the y axis: the best running total, at least 1.
pub fn max_points(series: &[TrendSeries]) -> u32 {
    series
        .iter()
        .filter_map(|s| s.points.last().map(|&(_, total)| total))
        .max()
        .unwrap_or(0)
        .max(1)
}
