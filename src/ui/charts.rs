// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis preview charts.
//!
//! Renders the rolling count history as three plots: a current per-zone
//! bar chart, the total over time, and per-zone series over time. The
//! history is capped at a fixed window so the panel stays readable
//! during long sessions.

use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::analysis::history::TimeSeriesHistory;
use crate::models::zone::LiveCounts;

const PLOT_HEIGHT: f32 = 220.0;

/// Owns the rolling history and draws the chart panel.
pub struct ChartSet {
    history: TimeSeriesHistory,
}

impl ChartSet {
    pub fn new() -> Self {
        Self {
            history: TimeSeriesHistory::new(),
        }
    }

    /// Drop accumulated samples, for a fresh session.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Record one poll tick under the current wall-clock time.
    pub fn record(&mut self, counts: &LiveCounts) {
        let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.history.push(stamp, counts.total, &counts.zones);
    }

    pub fn history(&self) -> &TimeSeriesHistory {
        &self.history
    }

    pub fn show(&self, ui: &mut egui::Ui, latest: Option<&LiveCounts>) {
        ui.heading("Current zone counts");
        self.show_bar_chart(ui, latest);
        ui.add_space(8.0);
        ui.heading("Total count over time");
        self.show_total_line(ui);
        ui.add_space(8.0);
        ui.heading("Zone counts over time");
        self.show_zone_lines(ui);
    }

    fn show_bar_chart(&self, ui: &mut egui::Ui, latest: Option<&LiveCounts>) {
        let bars: Vec<Bar> = latest
            .map(|counts| {
                counts
                    .zones
                    .iter()
                    .enumerate()
                    .map(|(i, (label, count))| {
                        Bar::new(i as f64, *count as f64).name(label.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();
        Plot::new("zone_bars")
            .height(PLOT_HEIGHT)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).width(0.6));
            });
    }

    fn show_total_line(&self, ui: &mut egui::Ui) {
        let points: PlotPoints = self
            .history
            .totals()
            .iter()
            .enumerate()
            .map(|(i, total)| [i as f64, *total as f64])
            .collect();
        Plot::new("total_line")
            .height(PLOT_HEIGHT)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(points).name("total"));
            });
    }

    fn show_zone_lines(&self, ui: &mut egui::Ui) {
        let window = self.history.totals().len();
        Plot::new("zone_lines")
            .height(PLOT_HEIGHT)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (label, series) in self.history.per_zone() {
                    // Zones that appeared late have shorter series; align
                    // them to the right edge of the window.
                    let offset = window.saturating_sub(series.len());
                    let points: PlotPoints = series
                        .iter()
                        .enumerate()
                        .map(|(i, count)| [(offset + i) as f64, *count as f64])
                        .collect();
                    plot_ui.line(Line::new(points).name(label));
                }
            });
    }
}

impl Default for ChartSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn counts(total: u32, pairs: &[(&str, u32)]) -> LiveCounts {
        let mut zones = BTreeMap::new();
        for (label, count) in pairs {
            zones.insert((*label).to_string(), *count);
        }
        LiveCounts { total, zones }
    }

    #[test]
    fn record_accumulates_history() {
        let mut charts = ChartSet::new();
        charts.record(&counts(3, &[("gate", 3)]));
        charts.record(&counts(5, &[("gate", 5)]));
        assert_eq!(charts.history().totals(), &[3, 5]);
    }

    #[test]
    fn reset_clears_history() {
        let mut charts = ChartSet::new();
        charts.record(&counts(3, &[("gate", 3)]));
        charts.reset();
        assert!(charts.history().totals().is_empty());
    }
}
