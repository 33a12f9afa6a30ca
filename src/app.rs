// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, coordinating the feed sidebar, the zone drawing
//! surface, the live analysis pollers, and the chart panel. Network
//! work that can take long (feed creation, zone loading, video upload)
//! runs on background threads whose results are drained here once per
//! frame; quick zone mutations block the UI thread behind a short
//! request timeout.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::analysis::alerts::{self, AlertLevel};
use crate::analysis::poller::AnalysisPoller;
use crate::api::client::{AnalysisBackend, ApiClient, ZoneBackend};
use crate::api::error::ApiError;
use crate::api::stream::{open_stream, StreamEvent, StreamHandle};
use crate::models::feed::{Feed, FeedKind};
use crate::models::thresholds::Thresholds;
use crate::models::zone::Zone;
use crate::ui::canvas::{self, CanvasAction, Overlay};
use crate::ui::charts::ChartSet;
use crate::ui::sidebar::{self, FeedForm, SidebarAction};
use crate::ui::toasts::Notifier;
use crate::zones::editor::ZoneEditor;
use crate::zones::store::ZoneStore;

const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Active view for the selected feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Draw,
    Preview,
    Analysis,
    AnalysisPreview,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Draw => "Draw Zones",
            Tab::Preview => "Preview",
            Tab::Analysis => "Analysis",
            Tab::AnalysisPreview => "Analysis Preview",
        }
    }
}

/// Result of a background feed mutation.
enum FeedOp {
    Created(Result<Feed, ApiError>),
    Deleted {
        feed_id: i64,
        result: Result<(), ApiError>,
    },
}

/// Main application state.
pub struct CrowdsightApp {
    api: Arc<ApiClient>,
    notifier: Notifier,

    /// Cached feed list, refreshed from the backend.
    feeds: Vec<Feed>,
    selected_feed: Option<i64>,
    feed_form: FeedForm,
    /// Receiver for a background feed list refresh.
    feeds_loader: Option<Receiver<Result<Vec<Feed>, ApiError>>>,
    /// Channel for background feed create/delete results.
    feed_ops_tx: Sender<FeedOp>,
    feed_ops_rx: Receiver<FeedOp>,
    /// Receiver for a background zone load, tagged with the feed it
    /// was requested for so late replies for old feeds are dropped.
    zones_loader: Option<Receiver<(i64, Result<Vec<Zone>, ApiError>)>>,

    store: ZoneStore,
    editor: ZoneEditor,
    zone_label: String,
    selected_zone: Option<usize>,

    active_tab: Tab,
    thresholds: Thresholds,
    settings_open: bool,
    settings_draft: Thresholds,

    /// Poller driving the Analysis tab.
    analysis: AnalysisPoller,
    /// Independent poller driving the Analysis Preview charts.
    preview_poller: AnalysisPoller,
    preview_charts: ChartSet,
    heatmap_enabled: bool,
    tracking_enabled: bool,

    /// Live video stream of the selected feed.
    stream: Option<StreamHandle>,
    stream_texture: Option<egui::TextureHandle>,
    camera_error: Option<String>,
    /// Whether the camera preview eye toggle is on.
    camera_preview_on: bool,
}

impl CrowdsightApp {
    /// Create the application and kick off the initial feed load.
    pub fn new(cc: &eframe::CreationContext<'_>, base_url: String) -> Self {
        let api = Arc::new(ApiClient::new(base_url));
        let thresholds = Thresholds::load(cc.storage);
        let (feed_ops_tx, feed_ops_rx) = channel();

        let mut app = Self {
            analysis: AnalysisPoller::new(api.clone() as Arc<dyn AnalysisBackend>),
            preview_poller: AnalysisPoller::new(api.clone() as Arc<dyn AnalysisBackend>),
            api,
            notifier: Notifier::new(),
            feeds: Vec::new(),
            selected_feed: None,
            feed_form: FeedForm::new(),
            feeds_loader: None,
            feed_ops_tx,
            feed_ops_rx,
            zones_loader: None,
            store: ZoneStore::new(),
            editor: ZoneEditor::new(),
            zone_label: String::new(),
            selected_zone: None,
            active_tab: Tab::Draw,
            thresholds,
            settings_open: false,
            settings_draft: thresholds,
            preview_charts: ChartSet::new(),
            heatmap_enabled: false,
            tracking_enabled: false,
            stream: None,
            stream_texture: None,
            camera_error: None,
            camera_preview_on: true,
        };
        app.reload_feeds();
        app
    }

    /// Refresh the feed list on a background thread.
    fn reload_feeds(&mut self) {
        let (sender, receiver) = channel();
        self.feeds_loader = Some(receiver);
        let api = self.api.clone();
        std::thread::spawn(move || {
            let _ = sender.send(api.list_feeds());
        });
    }

    fn selected_feed(&self) -> Option<&Feed> {
        let id = self.selected_feed?;
        self.feeds.iter().find(|f| f.id == id)
    }

    /// Switch to another feed, resetting all per-feed state.
    fn select_feed(&mut self, feed_id: i64) {
        self.stream = None;
        self.stream_texture = None;
        self.camera_error = None;
        self.analysis.stop();
        self.preview_poller.stop();
        self.preview_charts.reset();
        self.store.clear();
        self.editor.cancel();
        self.zone_label.clear();
        self.selected_zone = None;
        self.tracking_enabled = false;
        self.active_tab = Tab::Draw;
        self.selected_feed = Some(feed_id);

        let (sender, receiver) = channel();
        self.zones_loader = Some(receiver);
        let api = self.api.clone();
        std::thread::spawn(move || {
            let _ = sender.send((feed_id, api.fetch_zones(feed_id)));
        });

        self.open_feed_stream();
    }

    /// Open the video stream for the selected feed, respecting the
    /// camera preview toggle.
    fn open_feed_stream(&mut self) {
        let Some(feed) = self.selected_feed() else {
            return;
        };
        match feed.kind {
            FeedKind::Video => {
                if feed.video_filename.is_some() {
                    self.stream = Some(open_stream(self.api.stream_url(feed.id)));
                } else {
                    self.notifier.error("No video uploaded for this feed.");
                }
            }
            FeedKind::Camera => {
                if self.camera_preview_on {
                    self.stream = Some(open_stream(self.api.stream_url(feed.id)));
                }
            }
        }
    }

    /// Validate the add-feed form, then create the feed (and upload its
    /// video) on a background thread.
    fn submit_new_feed(&mut self, name: String, kind: FeedKind, video_path: Option<PathBuf>) {
        let name = name.trim().to_string();
        if name.is_empty() {
            self.notifier.error("Feed name required");
            return;
        }
        if self
            .feeds
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(&name))
        {
            self.notifier.error("Feed name must be unique");
            return;
        }
        if kind == FeedKind::Video {
            let Some(path) = &video_path else {
                self.notifier.error("Please select a video file");
                return;
            };
            let valid = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if !valid {
                self.notifier.error("Please upload a valid video file.");
                return;
            }
        }

        self.feed_form.reset();
        self.notifier.info(format!("Creating feed \"{name}\"..."));
        let api = self.api.clone();
        let sender = self.feed_ops_tx.clone();
        std::thread::spawn(move || {
            let result = api.create_feed(&name, kind).and_then(|mut feed| {
                if let Some(path) = video_path {
                    feed.video_filename = Some(api.upload_video(feed.id, &path)?);
                }
                Ok(feed)
            });
            let _ = sender.send(FeedOp::Created(result));
        });
    }

    /// Confirm and delete a feed on a background thread.
    fn delete_feed(&mut self, feed_id: i64) {
        let Some(feed) = self.feeds.iter().find(|f| f.id == feed_id) else {
            return;
        };
        let confirmed = rfd::MessageDialog::new()
            .set_title("Delete feed")
            .set_description(format!("Delete feed \"{}\"?", feed.name))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes;
        if !confirmed {
            return;
        }
        let api = self.api.clone();
        let sender = self.feed_ops_tx.clone();
        std::thread::spawn(move || {
            let result = api.delete_feed(feed_id);
            let _ = sender.send(FeedOp::Deleted { feed_id, result });
        });
    }

    /// Persist the zone set, first folding an in-progress edit back
    /// into its slot under the current label.
    fn save_zones(&mut self) {
        let Some(feed_id) = self.selected_feed else {
            return;
        };
        if let Some(slot) = self.store.editing() {
            let label = self.zone_label.trim().to_string();
            if label.is_empty() {
                self.notifier.error("Zone label cannot be empty");
                return;
            }
            if let Some(zone) = self.store.zones().get(slot) {
                let coords = zone.coordinates;
                self.store.update_slot(slot, label, coords);
            }
            self.store.clear_editing();
        }
        match self.store.save_all(self.api.as_ref(), feed_id) {
            Ok(()) => {
                self.notifier.success("Zones saved!");
                self.editor.cancel();
                self.zone_label.clear();
                self.selected_zone = None;
            }
            Err(e) => self.notifier.error(format!("Failed to save zones: {e}")),
        }
    }

    fn delete_selected_zone(&mut self) {
        let Some(feed_id) = self.selected_feed else {
            return;
        };
        let Some(index) = self.selected_zone else {
            self.notifier.error("Select a zone to delete");
            return;
        };
        let Some(zone) = self.store.zones().get(index) else {
            self.selected_zone = None;
            return;
        };
        let confirmed = rfd::MessageDialog::new()
            .set_title("Delete zone")
            .set_description(format!("Delete zone \"{}\"?", zone.label))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes;
        if !confirmed {
            return;
        }
        match self.store.delete_one(self.api.as_ref(), feed_id, index) {
            Ok(_) => {
                self.selected_zone = None;
                self.notifier.success("Zone deleted successfully.");
            }
            Err(e) => self.notifier.error(format!("Failed to delete zone: {e}")),
        }
    }

    /// Put the selected zone into edit mode with a fresh server copy.
    fn modify_selected_zone(&mut self) {
        let Some(feed_id) = self.selected_feed else {
            return;
        };
        let Some(index) = self.selected_zone else {
            self.notifier.error("Select a zone to modify");
            return;
        };
        match self.store.refresh_for_edit(self.api.as_ref(), feed_id, index) {
            Ok(label) => {
                self.zone_label = label;
                self.active_tab = Tab::Draw;
                self.editor.cancel();
                self.editor.arm();
            }
            Err(e) => self.notifier.error(format!("Failed to load zone: {e}")),
        }
    }

    fn start_analysis(&mut self) {
        let Some(feed_id) = self.selected_feed else {
            return;
        };
        self.notifier.info("Starting analysis, please wait...");
        // Tracking may still be on server-side from an earlier session.
        self.tracking_enabled = false;
        if let Err(e) = self.api.set_tracking(feed_id, false) {
            log::warn!("could not reset tracking for feed {feed_id}: {e}");
        }
        self.analysis.start(feed_id);
        if self.stream.is_none() {
            self.open_feed_stream();
        }
        if self.active_tab == Tab::AnalysisPreview && !self.preview_poller.is_running() {
            self.preview_charts.reset();
            self.preview_poller.start(feed_id);
        }
    }

    fn stop_analysis(&mut self) {
        self.analysis.stop();
        self.preview_poller.stop();
        self.tracking_enabled = false;
        self.notifier.info("Analysis stopped.");
    }

    /// Toggle person tracking; the flag only flips once the backend
    /// accepts the change.
    fn toggle_tracking(&mut self) {
        let Some(feed_id) = self.selected_feed else {
            return;
        };
        let desired = !self.tracking_enabled;
        match self.api.set_tracking(feed_id, desired) {
            Ok(()) => {
                self.tracking_enabled = desired;
                let state = if desired { "enabled" } else { "disabled" };
                self.notifier.info(format!("Tracking {state}."));
            }
            Err(e) => self.notifier.error(format!("Failed to toggle tracking: {e}")),
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        self.active_tab = tab;
        if tab == Tab::AnalysisPreview {
            if let Some(feed_id) = self.selected_feed {
                if self.preview_poller.running_feed() != Some(feed_id) {
                    self.preview_charts.reset();
                    self.preview_poller.start(feed_id);
                }
            }
        }
    }

    /// Drain all background channels once per frame.
    fn drain_background(&mut self, ctx: &egui::Context) {
        if let Some(receiver) = &self.feeds_loader {
            if let Ok(result) = receiver.try_recv() {
                self.feeds_loader = None;
                match result {
                    Ok(feeds) => {
                        if let Some(id) = self.selected_feed {
                            if !feeds.iter().any(|f| f.id == id) {
                                self.selected_feed = None;
                            }
                        }
                        self.feeds = feeds;
                    }
                    Err(e) => self.notifier.error(format!("Failed to load feeds: {e}")),
                }
            }
        }

        while let Ok(op) = self.feed_ops_rx.try_recv() {
            match op {
                FeedOp::Created(Ok(feed)) => {
                    self.notifier.success(format!("Feed \"{}\" created.", feed.name));
                    self.feeds.push(feed);
                    self.reload_feeds();
                }
                FeedOp::Created(Err(e)) => {
                    self.notifier.error(format!("Failed to create feed: {e}"));
                }
                FeedOp::Deleted { feed_id, result } => match result {
                    Ok(()) => {
                        self.feeds.retain(|f| f.id != feed_id);
                        if self.selected_feed == Some(feed_id) {
                            self.selected_feed = None;
                            self.stream = None;
                            self.stream_texture = None;
                            self.analysis.stop();
                            self.preview_poller.stop();
                            self.store.clear();
                        }
                        self.notifier.success("Feed deleted.");
                    }
                    Err(e) => self.notifier.error(format!("Failed to delete feed: {e}")),
                },
            }
        }

        if let Some(receiver) = &self.zones_loader {
            if let Ok((feed_id, result)) = receiver.try_recv() {
                self.zones_loader = None;
                // A reply for a feed the user already left is stale.
                if self.selected_feed == Some(feed_id) {
                    match result {
                        Ok(zones) => self.store.replace(zones),
                        Err(e) => self.notifier.error(format!("Failed to load zones: {e}")),
                    }
                }
            }
        }

        let main = self.analysis.pump();
        if let Some(e) = main.start_error {
            self.notifier.error(format!("Failed to start analysis: {e}"));
        }
        let preview = self.preview_poller.pump();
        if let Some(e) = preview.start_error {
            self.notifier.error(format!("Failed to start analysis: {e}"));
        }
        if preview.fresh_tick {
            let counts = self.preview_poller.latest_counts().clone();
            self.preview_charts.record(&counts);
        }

        if let Some(stream) = &self.stream {
            match stream.poll() {
                StreamEvent::Frame(frame) => {
                    let image = egui::ColorImage::from_rgba_unmultiplied(frame.size, &frame.rgba);
                    match &mut self.stream_texture {
                        Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                        None => {
                            self.stream_texture = Some(ctx.load_texture(
                                "stream_frame",
                                image,
                                egui::TextureOptions::LINEAR,
                            ));
                        }
                    }
                }
                StreamEvent::Failed(e) => {
                    log::error!("Video stream failed: {e}");
                    self.camera_error = Some(format!("Stream unavailable: {e}"));
                    self.stream = None;
                    self.stream_texture = None;
                }
                StreamEvent::Pending => {}
            }
        }
    }

    fn show_draw_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Zone label:");
            ui.text_edit_singleline(&mut self.zone_label);
            let armed = self.editor.is_armed();
            if ui
                .add_enabled(!armed, egui::Button::new("Start Drawing"))
                .clicked()
            {
                self.editor.arm();
            }
            if ui.add_enabled(armed, egui::Button::new("Cancel")).clicked() {
                self.editor.cancel();
                self.store.clear_editing();
                self.zone_label.clear();
            }
            if ui.button("Save Zones").clicked() {
                self.save_zones();
            }
        });

        ui.horizontal(|ui| {
            let selected_text = self
                .selected_zone
                .and_then(|i| self.store.zones().get(i))
                .map(|z| z.label.clone())
                .unwrap_or_else(|| "Select zone".to_string());
            egui::ComboBox::from_id_source("zone_select")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (i, zone) in self.store.zones().iter().enumerate() {
                        ui.selectable_value(&mut self.selected_zone, Some(i), &zone.label);
                    }
                });
            if ui.button("Modify").clicked() {
                self.modify_selected_zone();
            }
            if ui.button("Delete").clicked() {
                self.delete_selected_zone();
            }
        });
        ui.add_space(6.0);

        let placeholder = self.canvas_placeholder();
        let action = {
            let overlay = Overlay {
                zones: self.store.zones(),
                counts: None,
                detections: &[],
                preview_rect: self.editor.preview_rect(),
                frame: self.stream_texture.as_ref(),
                placeholder: placeholder.as_deref(),
                accepts_input: self.editor.is_armed(),
                zone_color: egui::Color32::from_rgb(50, 205, 50),
                heatmap: None,
            };
            canvas::show(ui, &overlay)
        };
        self.apply_canvas_action(action);

        if self.camera_error.is_some() && ui.button("Retry").clicked() {
            self.camera_error = None;
            self.open_feed_stream();
        }
    }

    /// Placeholder text to show instead of the video surface, if any.
    fn canvas_placeholder(&self) -> Option<String> {
        if let Some(error) = &self.camera_error {
            return Some(error.clone());
        }
        let feed = self.selected_feed()?;
        if feed.kind == FeedKind::Camera && !self.camera_preview_on {
            return Some("Preview Disabled".to_string());
        }
        None
    }

    fn apply_canvas_action(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::PointerDown(p) => self.editor.pointer_down(p),
            CanvasAction::PointerMoved(p) => self.editor.pointer_move(p),
            CanvasAction::PointerUp => {
                if let Err(e) = self.editor.pointer_up(&self.zone_label, &mut self.store) {
                    self.notifier.error(e.to_string());
                }
            }
            CanvasAction::None => {}
        }
    }

    fn show_preview_tab(&mut self, ui: &mut egui::Ui) {
        // Keep repainting so the stream plays smoothly.
        ui.ctx().request_repaint();
        let placeholder = self.canvas_placeholder();
        let overlay = Overlay {
            zones: self.store.zones(),
            counts: None,
            detections: &[],
            preview_rect: None,
            frame: self.stream_texture.as_ref(),
            placeholder: placeholder.as_deref(),
            accepts_input: false,
            zone_color: egui::Color32::YELLOW,
            heatmap: None,
        };
        canvas::show(ui, &overlay);
        if self.camera_error.is_some() && ui.button("Retry").clicked() {
            self.camera_error = None;
            self.open_feed_stream();
        }
    }

    fn show_analysis_tab(&mut self, ui: &mut egui::Ui) {
        let running = self.analysis.is_running();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!running, egui::Button::new("Start Analysis"))
                .clicked()
            {
                self.start_analysis();
            }
            if ui
                .add_enabled(running, egui::Button::new("Stop Analysis"))
                .clicked()
            {
                self.stop_analysis();
            }
            if running {
                if ui
                    .selectable_label(self.heatmap_enabled, "Heatmap")
                    .clicked()
                {
                    self.heatmap_enabled = !self.heatmap_enabled;
                }
                if ui
                    .selectable_label(self.tracking_enabled, "Tracking")
                    .clicked()
                {
                    self.toggle_tracking();
                }
            }
        });

        if self.analysis.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for first detections...");
            });
        }

        let counts = self.analysis.latest_counts().clone();
        if running {
            ui.label(
                egui::RichText::new(format!("Video Count: {}", counts.total))
                    .size(18.0)
                    .strong(),
            );
            for (zone, count) in &counts.zones {
                ui.label(format!("{zone}: {count}"));
            }
            for alert in alerts::evaluate(counts.total, &counts.zones, &self.thresholds) {
                let color = match alert.level {
                    AlertLevel::Warning => egui::Color32::from_rgb(180, 120, 0),
                    AlertLevel::Danger => egui::Color32::from_rgb(170, 40, 40),
                };
                egui::Frame::none()
                    .fill(color)
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .rounding(4.0)
                    .show(ui, |ui| {
                        ui.colored_label(egui::Color32::WHITE, &alert.text);
                    });
            }
        }
        ui.add_space(6.0);

        let placeholder = self.canvas_placeholder();
        let overlay = Overlay {
            zones: self.store.zones(),
            counts: running.then_some(&counts),
            detections: self.analysis.latest_detections(),
            preview_rect: None,
            frame: self.stream_texture.as_ref(),
            placeholder: placeholder.as_deref(),
            accepts_input: false,
            zone_color: egui::Color32::from_rgb(50, 205, 50),
            heatmap: self.heatmap_enabled.then_some(&self.thresholds),
        };
        canvas::show(ui, &overlay);
    }

    fn show_analysis_preview_tab(&mut self, ui: &mut egui::Ui) {
        let counts = self.preview_poller.latest_counts().clone();
        let running = self.preview_poller.is_running();
        if self.preview_poller.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for first detections...");
            });
        }
        for alert in alerts::evaluate(counts.total, &counts.zones, &self.thresholds) {
            let color = match alert.level {
                AlertLevel::Warning => egui::Color32::from_rgb(180, 120, 0),
                AlertLevel::Danger => egui::Color32::from_rgb(170, 40, 40),
            };
            egui::Frame::none()
                .fill(color)
                .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                .rounding(4.0)
                .show(ui, |ui| {
                    ui.colored_label(egui::Color32::WHITE, &alert.text);
                });
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            self.preview_charts
                .show(ui, running.then_some(&counts));
        });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let mut open = self.settings_open;
        let mut saved = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Total count threshold:");
                    ui.add(egui::DragValue::new(&mut self.settings_draft.total).range(1..=10_000));
                });
                ui.horizontal(|ui| {
                    ui.label("Per-zone threshold:");
                    ui.add(
                        egui::DragValue::new(&mut self.settings_draft.per_zone).range(1..=10_000),
                    );
                });
                if ui.button("Save").clicked() {
                    saved = true;
                }
            });
        self.settings_open = open;
        if saved {
            self.thresholds = self.settings_draft;
            if let Some(storage) = frame.storage_mut() {
                self.thresholds.save(storage);
            }
            self.settings_open = false;
            self.notifier.success("Thresholds saved.");
        }
    }
}

impl eframe::App for CrowdsightApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.drain_background(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("CrowdSight");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{2699} Settings").clicked() {
                        self.settings_draft = self.thresholds;
                        self.settings_open = true;
                    }
                });
            });
        });

        let sidebar_action = egui::SidePanel::left("feeds")
            .default_width(220.0)
            .show(ctx, |ui| {
                sidebar::show(ui, &self.feeds, self.selected_feed, &mut self.feed_form)
            })
            .inner;
        match sidebar_action {
            SidebarAction::SelectFeed(id) => {
                if self.selected_feed != Some(id) {
                    self.select_feed(id);
                }
            }
            SidebarAction::DeleteFeed(id) => self.delete_feed(id),
            SidebarAction::SubmitNewFeed {
                name,
                kind,
                video_path,
            } => self.submit_new_feed(name, kind, video_path),
            SidebarAction::None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(feed) = self.selected_feed().cloned() else {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Select a feed to begin.")
                            .size(18.0)
                            .color(egui::Color32::from_gray(160)),
                    );
                });
                return;
            };

            ui.horizontal(|ui| {
                ui.heading(&feed.name);
                ui.label(format!("({})", feed.kind.display_name()));
                if feed.kind == FeedKind::Camera {
                    let eye = if self.camera_preview_on {
                        "\u{1F441} On"
                    } else {
                        "\u{1F441} Off"
                    };
                    if ui.button(eye).clicked() {
                        self.camera_preview_on = !self.camera_preview_on;
                        if self.camera_preview_on {
                            self.camera_error = None;
                            self.open_feed_stream();
                        } else {
                            self.stream = None;
                            self.stream_texture = None;
                        }
                    }
                }
            });

            ui.horizontal(|ui| {
                for tab in [Tab::Draw, Tab::Preview, Tab::Analysis, Tab::AnalysisPreview] {
                    if ui
                        .selectable_label(self.active_tab == tab, tab.label())
                        .clicked()
                    {
                        self.switch_tab(tab);
                    }
                }
            });
            ui.separator();

            match self.active_tab {
                Tab::Draw => self.show_draw_tab(ui),
                Tab::Preview => self.show_preview_tab(ui),
                Tab::Analysis => self.show_analysis_tab(ui),
                Tab::AnalysisPreview => self.show_analysis_preview_tab(ui),
            }
        });

        if self.settings_open {
            self.show_settings_window(ctx, frame);
        }

        self.notifier.show(ctx);

        // Background work in flight needs frames to land in.
        let busy = self.feeds_loader.is_some()
            || self.zones_loader.is_some()
            || self.analysis.is_running()
            || self.preview_poller.is_running()
            || self.stream.is_some();
        if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.thresholds.save(storage);
    }
}
