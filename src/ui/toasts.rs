// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toast notifications.
//!
//! The single notification sink for the whole app: every user-triggered
//! failure or confirmation goes through here, so no component needs its
//! own fallback reporting path.

use std::time::{Duration, Instant};

const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

struct Toast {
    level: ToastLevel,
    text: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct Notifier {
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(ToastLevel::Info, text.into());
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastLevel::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ToastLevel::Error, text.into());
    }

    fn push(&mut self, level: ToastLevel, text: String) {
        match level {
            ToastLevel::Error => log::error!("{text}"),
            _ => log::info!("{text}"),
        }
        self.toasts.push(Toast {
            level,
            text,
            expires_at: Instant::now() + TOAST_LIFETIME,
        });
    }

    /// Draw active toasts in the top-right corner and drop expired ones.
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires_at > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let fill = match toast.level {
                        ToastLevel::Info => egui::Color32::from_rgb(40, 90, 140),
                        ToastLevel::Success => egui::Color32::from_rgb(40, 120, 60),
                        ToastLevel::Error => egui::Color32::from_rgb(150, 45, 45),
                    };
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(6.0)
                        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, &toast.text);
                        });
                    ui.add_space(4.0);
                }
            });

        // Keep repainting so toasts expire without user input.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
