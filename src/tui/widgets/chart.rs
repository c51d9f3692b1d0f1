//! Bar, line and pie charts
//!
//! Bars use ratatui's `BarChart`, lines its `Chart`, and pies are painted
//! point by point on a braille `Canvas`. Animated charts grow in with the
//! progress reported by [`LiveChart::progress`].

use std::f64::consts::TAU;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, LegendPosition, Paragraph,
        Widget,
    },
};

use super::utils::format_value;
use crate::chart::{ChartKind, ChartSpec, LiveChart};
use crate::tui::theme::{icons, BoardTheme};

/// Bar values are integers in ratatui; keep two decimals of precision
const BAR_SCALE: f64 = 100.0;
const PIE_RADIUS: f64 = 0.95;

pub struct ChartWidget<'a> {
    spec: &'a ChartSpec,
    progress: f64,
    theme: &'a BoardTheme,
}

impl<'a> ChartWidget<'a> {
    pub fn new(chart: &'a LiveChart, theme: &'a BoardTheme) -> Self {
        Self {
            spec: &chart.spec,
            progress: chart.progress(Instant::now()),
            theme,
        }
    }

    /// Pin the grow-in progress instead of reading the clock
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }

    fn legend_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, series) in self.spec.series.iter().enumerate() {
            spans.push(Span::styled(
                format!("{} ", icons::LEGEND),
                Style::default().fg(self.theme.series(i)),
            ));
            spans.push(Span::styled(
                format!("{}   ", series.label),
                self.theme.text(),
            ));
        }
        Line::from(spans)
    }

    fn render_bar(&self, area: Rect, buf: &mut Buffer) {
        let spec = self.spec;
        let mut constraints = Vec::new();
        if spec.show_legend {
            constraints.push(Constraint::Length(1));
        }
        if spec.y_axis_title.is_some() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(3));
        if spec.x_axis_title.is_some() {
            constraints.push(Constraint::Length(1));
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut row = 0;
        if spec.show_legend {
            Paragraph::new(self.legend_line())
                .alignment(Alignment::Center)
                .render(rows[row], buf);
            row += 1;
        }
        if let Some(title) = &spec.y_axis_title {
            Paragraph::new(Span::styled(title.clone(), self.theme.dimmed())).render(rows[row], buf);
            row += 1;
        }
        let plot = rows[row];
        if let Some(title) = &spec.x_axis_title {
            Paragraph::new(Span::styled(title.clone(), self.theme.dimmed()))
                .alignment(Alignment::Center)
                .render(rows[row + 1], buf);
        }

        let categories = spec.categories();
        let series_count = spec.series.len().max(1);
        let group_width = usize::from(plot.width) / categories.max(1);
        let bar_width = (group_width.saturating_sub(2) / series_count).clamp(1, 12) as u16;
        let max = (spec.max_value() * BAR_SCALE).ceil().max(1.0) as u64;

        let mut chart = BarChart::default()
            .bar_width(bar_width)
            .bar_gap(0)
            .group_gap(2)
            .max(max)
            .label_style(self.theme.dimmed());

        for i in 0..categories {
            let bars: Vec<Bar> = spec
                .series
                .iter()
                .enumerate()
                .map(|(s, series)| {
                    let value = series
                        .values
                        .get(i)
                        .copied()
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0)
                        .max(0.0);
                    let color = self.theme.series(s);
                    Bar::default()
                        .value((value * self.progress * BAR_SCALE).round() as u64)
                        .text_value(format_value(value))
                        .style(Style::default().fg(color))
                        .value_style(Style::default().fg(self.theme.deep_space).bg(color))
                })
                .collect();
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(spec.label(i)))
                    .bars(&bars),
            );
        }

        chart.render(plot, buf);
    }

    fn render_line(&self, area: Rect, buf: &mut Buffer) {
        let spec = self.spec;
        let points: Vec<Vec<(f64, f64)>> = spec
            .series
            .iter()
            .map(|s| {
                s.values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, v)| (i as f64, v * self.progress))
                    .collect()
            })
            .collect();

        let datasets: Vec<Dataset> = spec
            .series
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (series, data))| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series(i)))
                    .data(data)
            })
            .collect();

        let min_value = spec
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite())
            .fold(0.0, f64::min);
        let y_min = if spec.begin_at_zero { min_value.min(0.0) } else { min_value };
        let y_max = (spec.max_value() * 1.1).max(y_min + 1.0);
        let x_max = (spec.categories().max(2) - 1) as f64;

        let last = spec.categories().saturating_sub(1);
        let x_labels: Vec<Span> = [0, last / 2, last]
            .iter()
            .map(|&i| Span::styled(spec.label(i), self.theme.dimmed()))
            .collect();
        let y_labels: Vec<Span> = [y_min, (y_min + y_max) / 2.0, y_max]
            .iter()
            .map(|&v| Span::styled(format_value((v * 10.0).round() / 10.0), self.theme.dimmed()))
            .collect();

        let mut x_axis = Axis::default()
            .bounds([0.0, x_max])
            .labels(x_labels)
            .style(self.theme.dimmed());
        if let Some(title) = &spec.x_axis_title {
            x_axis = x_axis.title(Span::styled(title.clone(), self.theme.dimmed()));
        }
        let mut y_axis = Axis::default()
            .bounds([y_min, y_max])
            .labels(y_labels)
            .style(self.theme.dimmed());
        if let Some(title) = &spec.y_axis_title {
            y_axis = y_axis.title(Span::styled(title.clone(), self.theme.dimmed()));
        }

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(spec.show_legend.then_some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .render(area, buf);
    }

    fn render_pie(&self, area: Rect, buf: &mut Buffer) {
        let slices = self.spec.slices();
        let total: f64 = slices.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            Paragraph::new(Span::styled("No data", self.theme.dimmed()))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let (plot, legend) = if self.spec.show_legend {
            let width = slices
                .iter()
                .map(|(label, _)| {
                    u16::try_from(label.chars().count())
                        .unwrap_or(u16::MAX)
                        .saturating_add(14)
                })
                .max()
                .unwrap_or(0)
                .min(area.width / 2);
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(10), Constraint::Length(width)])
                .split(area);
            (cols[0], Some(cols[1]))
        } else {
            (area, None)
        };

        let half_width = f64::from(plot.width) / (2.0 * f64::from(plot.height.max(1)));
        let sectors = pie_points(&slices, self.progress, plot.width, plot.height, half_width);
        let colors: Vec<_> = (0..sectors.len()).map(|i| self.theme.series(i)).collect();

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-half_width, half_width])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (coords, color) in sectors.iter().zip(&colors) {
                    ctx.draw(&Points {
                        coords,
                        color: *color,
                    });
                }
            })
            .render(plot, buf);

        if let Some(legend) = legend {
            let lines: Vec<Line> = slices
                .iter()
                .enumerate()
                .map(|(i, (label, value))| {
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", icons::LEGEND),
                            Style::default().fg(self.theme.series(i)),
                        ),
                        Span::styled(label.clone(), self.theme.text()),
                        Span::styled(
                            format!(" {:.1}%", value / total * 100.0),
                            self.theme.dimmed(),
                        ),
                    ])
                })
                .collect();
            Paragraph::new(lines).render(legend, buf);
        }
    }
}

/// Sample braille dot positions inside the pie and bucket them by slice.
///
/// Angles run clockwise from twelve o'clock; only the first `progress` of
/// the full turn is filled so the pie sweeps in.
pub fn pie_points(
    slices: &[(String, f64)],
    progress: f64,
    cols: u16,
    rows: u16,
    half_width: f64,
) -> Vec<Vec<(f64, f64)>> {
    let mut sectors = vec![Vec::new(); slices.len()];
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 || cols == 0 || rows == 0 {
        return sectors;
    }

    let mut bounds = Vec::with_capacity(slices.len());
    let mut acc = 0.0;
    for (_, value) in slices {
        acc += value / total;
        bounds.push(acc * TAU);
    }
    let sweep = progress.clamp(0.0, 1.0) * TAU;

    let dots_x = usize::from(cols) * 2;
    let dots_y = usize::from(rows) * 4;
    for ix in 0..dots_x {
        let x = -half_width + (ix as f64 + 0.5) * (2.0 * half_width / dots_x as f64);
        for iy in 0..dots_y {
            let y = -1.0 + (iy as f64 + 0.5) * (2.0 / dots_y as f64);
            if x * x + y * y > PIE_RADIUS * PIE_RADIUS {
                continue;
            }
            let angle = x.atan2(y).rem_euclid(TAU);
            if angle > sweep {
                continue;
            }
            if let Some(slice) = bounds.iter().position(|&end| angle <= end) {
                sectors[slice].push((x, y));
            }
        }
    }
    sectors
}

impl Widget for ChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title_area, body) = match &self.spec.title {
            Some(_) if area.height > 4 => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(2), Constraint::Min(2)])
                    .split(area);
                (Some(rows[0]), rows[1])
            }
            _ => (None, area),
        };

        if let (Some(title_area), Some(title)) = (title_area, &self.spec.title) {
            Paragraph::new(Span::styled(
                title.clone(),
                self.theme.header().add_modifier(Modifier::UNDERLINED),
            ))
            .alignment(Alignment::Center)
            .render(title_area, buf);
        }

        match self.spec.kind {
            ChartKind::Bar => self.render_bar(body, buf),
            ChartKind::Line => self.render_line(body, buf),
            ChartKind::Pie => self.render_pie(body, buf),
        }
    }
}
