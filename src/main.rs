// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CrowdSight - crowd monitoring dashboard
//!
//! A cross-platform desktop client for a video analysis backend:
//! draw counting zones over camera and video feeds, watch live
//! occupancy counts and alerts, and chart count history.

mod analysis;
mod api;
mod app;
mod models;
mod ui;
mod zones;

use anyhow::Result;
use app::CrowdsightApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let base_url = std::env::var("CROWDSIGHT_BACKEND")
        .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    log::info!("Using backend {base_url}");

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([960.0, 640.0])
            .with_title("CrowdSight - Crowd Monitoring Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "CrowdSight",
        options,
        Box::new(move |cc| Ok(Box::new(CrowdsightApp::new(cc, base_url)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
