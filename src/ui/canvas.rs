// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawable video surface with the zone overlay.
//!
//! The surface is a fixed 640x360 region matching the backend's
//! processing resolution; zone coordinates live in this pixel space.
//! Repainting is on demand: the surface clears, draws the current video
//! frame, every zone outline with its label, live counts in a second
//! styled pass layered above the outlines, and any temporary drag
//! rectangle. Pointer input is reduced to commands for the drawing
//! state machine.

use crate::models::thresholds::Thresholds;
use crate::models::zone::{Detection, LiveCounts, Point, RectCoords, Zone};

/// Logical surface size, equal to the backend processing resolution.
pub const SURFACE_SIZE: egui::Vec2 = egui::vec2(640.0, 360.0);

/// Backend detection coordinate space.
const DETECTION_SPACE: egui::Vec2 = egui::vec2(640.0, 360.0);

/// Result of surface interaction, fed to the zone editor.
pub enum CanvasAction {
    None,
    PointerDown(Point),
    PointerMoved(Point),
    PointerUp,
}

/// Everything one repaint of the surface needs.
pub struct Overlay<'a> {
    pub zones: &'a [Zone],
    /// Live counts to layer above the zone outlines, if a session is on.
    pub counts: Option<&'a LiveCounts>,
    pub detections: &'a [Detection],
    /// In-progress drag rectangle.
    pub preview_rect: Option<RectCoords>,
    /// Latest decoded video frame.
    pub frame: Option<&'a egui::TextureHandle>,
    /// When set, the surface shows only this centered message.
    pub placeholder: Option<&'a str>,
    /// Whether pointer input should be captured for drawing.
    pub accepts_input: bool,
    pub zone_color: egui::Color32,
    /// Thresholds for heatmap intensity; `None` disables the heatmap.
    pub heatmap: Option<&'a Thresholds>,
}

/// Paint the surface and report pointer activity.
pub fn show(ui: &mut egui::Ui, overlay: &Overlay) -> CanvasAction {
    let sense = if overlay.accepts_input {
        egui::Sense::click_and_drag()
    } else {
        egui::Sense::hover()
    };
    let (rect, response) = ui.allocate_exact_size(SURFACE_SIZE, sense);
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, 4.0, egui::Color32::from_gray(24));

    if let Some(message) = overlay.placeholder {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(180),
        );
        return CanvasAction::None;
    }

    if let Some(texture) = overlay.frame {
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    if let Some(thresholds) = overlay.heatmap {
        if let Some(counts) = overlay.counts {
            draw_heatmap(&painter, rect, overlay.zones, counts, thresholds);
        }
    }

    for zone in overlay.zones {
        draw_zone_outline(&painter, rect, zone, overlay.zone_color);
    }

    draw_detections(&painter, rect, overlay.detections);

    // Second pass so counts always layer above outlines and boxes.
    if let Some(counts) = overlay.counts {
        for zone in overlay.zones {
            if let Some(count) = counts.zones.get(&zone.label) {
                let anchor = to_screen(rect, zone.coordinates.topleft) + egui::vec2(0.0, -30.0);
                painter.text(
                    anchor,
                    egui::Align2::LEFT_BOTTOM,
                    count.to_string(),
                    egui::FontId::proportional(20.0),
                    egui::Color32::RED,
                );
            }
        }
    }

    if let Some(preview) = overlay.preview_rect {
        draw_rect_stroke(&painter, rect, &preview, egui::Color32::RED);
    }

    pointer_action(&response, rect)
}

fn pointer_action(response: &egui::Response, rect: egui::Rect) -> CanvasAction {
    if response.drag_stopped() {
        return CanvasAction::PointerUp;
    }
    let Some(pos) = response.interact_pointer_pos() else {
        return CanvasAction::None;
    };
    let local = Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
    if response.drag_started() {
        CanvasAction::PointerDown(local)
    } else if response.dragged() {
        CanvasAction::PointerMoved(local)
    } else {
        CanvasAction::None
    }
}

fn to_screen(rect: egui::Rect, p: Point) -> egui::Pos2 {
    egui::pos2(
        rect.min.x + p.x * rect.width() / SURFACE_SIZE.x,
        rect.min.y + p.y * rect.height() / SURFACE_SIZE.y,
    )
}

fn draw_zone_outline(
    painter: &egui::Painter,
    rect: egui::Rect,
    zone: &Zone,
    color: egui::Color32,
) {
    draw_rect_stroke(painter, rect, &zone.coordinates, color);
    let anchor = to_screen(rect, zone.coordinates.topleft) + egui::vec2(0.0, -5.0);
    painter.text(
        anchor,
        egui::Align2::LEFT_BOTTOM,
        &zone.label,
        egui::FontId::proportional(14.0),
        color,
    );
}

fn draw_rect_stroke(
    painter: &egui::Painter,
    rect: egui::Rect,
    coords: &RectCoords,
    color: egui::Color32,
) {
    let stroke = egui::Stroke::new(2.0, color);
    let corners = [
        to_screen(rect, coords.topleft),
        to_screen(rect, coords.topright),
        to_screen(rect, coords.bottomright),
        to_screen(rect, coords.bottomleft),
    ];
    for i in 0..4 {
        painter.line_segment([corners[i], corners[(i + 1) % 4]], stroke);
    }
}

fn draw_detections(painter: &egui::Painter, rect: egui::Rect, detections: &[Detection]) {
    let scale_x = rect.width() / DETECTION_SPACE.x;
    let scale_y = rect.height() / DETECTION_SPACE.y;
    for det in detections {
        let [x1, y1, x2, y2] = det.bbox;
        let min = egui::pos2(rect.min.x + x1 * scale_x, rect.min.y + y1 * scale_y);
        let max = egui::pos2(rect.min.x + x2 * scale_x, rect.min.y + y2 * scale_y);
        let bbox = egui::Rect::from_min_max(min, max);
        painter.rect_stroke(bbox, 0.0, egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE));
        painter.text(
            min + egui::vec2(0.0, -4.0),
            egui::Align2::LEFT_BOTTOM,
            &det.label,
            egui::FontId::proportional(12.0),
            egui::Color32::LIGHT_BLUE,
        );
    }
}

/// Translucent intensity discs at the center of busy zones, intensity
/// normalized against the whole-frame threshold.
fn draw_heatmap(
    painter: &egui::Painter,
    rect: egui::Rect,
    zones: &[Zone],
    counts: &LiveCounts,
    thresholds: &Thresholds,
) {
    let radius = rect.width().min(rect.height()) * 0.1;
    for zone in zones {
        let Some(count) = counts.zones.get(&zone.label) else {
            continue;
        };
        if *count == 0 {
            continue;
        }
        let intensity = (*count as f32 / thresholds.total.max(1) as f32).min(1.0);
        let center = to_screen(rect, zone.coordinates.center());
        let alpha = (intensity * 160.0) as u8;
        painter.circle_filled(
            center,
            radius,
            egui::Color32::from_rgba_unmultiplied(255, 60, 0, alpha),
        );
        painter.circle_filled(
            center,
            radius * 0.55,
            egui::Color32::from_rgba_unmultiplied(255, 160, 0, alpha),
        );
    }
}
