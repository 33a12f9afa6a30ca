// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Feed list sidebar and the add-feed form.

use std::path::PathBuf;

use crate::models::feed::{Feed, FeedKind};

/// What the sidebar asked the app to do this frame.
pub enum SidebarAction {
    None,
    SelectFeed(i64),
    DeleteFeed(i64),
    SubmitNewFeed {
        name: String,
        kind: FeedKind,
        video_path: Option<PathBuf>,
    },
}

/// State of the collapsible add-feed form.
pub struct FeedForm {
    pub open: bool,
    pub name: String,
    pub kind: FeedKind,
    pub video_path: Option<PathBuf>,
}

impl FeedForm {
    pub fn new() -> Self {
        Self {
            open: false,
            name: String::new(),
            kind: FeedKind::Camera,
            video_path: None,
        }
    }

    pub fn reset(&mut self) {
        self.open = false;
        self.name.clear();
        self.kind = FeedKind::Camera;
        self.video_path = None;
    }
}

impl Default for FeedForm {
    fn default() -> Self {
        Self::new()
    }
}

pub fn show(
    ui: &mut egui::Ui,
    feeds: &[Feed],
    selected: Option<i64>,
    form: &mut FeedForm,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    ui.heading("Feeds");
    ui.add_space(4.0);

    if ui.button("+ Add Feed").clicked() {
        form.open = !form.open;
    }

    if form.open {
        ui.add_space(4.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut form.name);
            egui::ComboBox::from_id_source("new_feed_kind")
                .selected_text(form.kind.display_name())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut form.kind, FeedKind::Camera, "Camera");
                    ui.selectable_value(&mut form.kind, FeedKind::Video, "Video");
                });
            if form.kind == FeedKind::Video {
                if ui.button("Choose video...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Video", &["mp4", "avi", "mov", "mkv", "webm"])
                        .pick_file()
                    {
                        form.video_path = Some(path);
                    }
                }
                if let Some(path) = &form.video_path {
                    if let Some(name) = path.file_name() {
                        ui.label(name.to_string_lossy());
                    }
                }
            }
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    action = SidebarAction::SubmitNewFeed {
                        name: form.name.clone(),
                        kind: form.kind,
                        video_path: form.video_path.clone(),
                    };
                }
                if ui.button("Cancel").clicked() {
                    form.reset();
                }
            });
        });
    }

    ui.add_space(8.0);
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for feed in feeds {
            ui.horizontal(|ui| {
                let label = format!("{} ({})", feed.name, feed.kind.display_name());
                let is_selected = selected == Some(feed.id);
                if ui.selectable_label(is_selected, label).clicked() {
                    action = SidebarAction::SelectFeed(feed.id);
                }
                if ui.small_button("Delete").clicked() {
                    action = SidebarAction::DeleteFeed(feed.id);
                }
            });
        }
        if feeds.is_empty() {
            ui.label("No feeds yet.");
        }
    });

    action
}
