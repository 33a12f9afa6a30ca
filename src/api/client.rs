// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Typed HTTP client for the analysis backend.
//!
//! One method per backend endpoint, with defensive decoding: every
//! response body is parsed against an explicit schema and malformed
//! payloads map to [`ApiError::Decode`] instead of propagating as
//! unrelated failures.

use crate::api::error::ApiError;
use crate::models::feed::{Feed, FeedKind};
use crate::models::zone::{Detection, LiveCounts, Zone};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Zone persistence operations, split out as a trait so the zone store
/// can be unit tested against a stub backend.
pub trait ZoneBackend {
    fn fetch_zones(&self, feed_id: i64) -> Result<Vec<Zone>, ApiError>;
    fn save_zones(&self, feed_id: i64, zones: &[Zone]) -> Result<(), ApiError>;
    fn delete_zone(&self, feed_id: i64, zone_id: i64) -> Result<(), ApiError>;
}

/// Live analysis operations used by the pollers.
pub trait AnalysisBackend: Send + Sync {
    fn start_analysis(&self, feed_id: i64) -> Result<(), ApiError>;
    fn stop_analysis(&self, feed_id: i64) -> Result<(), ApiError>;
    fn set_tracking(&self, feed_id: i64, enabled: bool) -> Result<(), ApiError>;
    fn fetch_counts(&self, feed_id: i64) -> Result<LiveCounts, ApiError>;
    fn fetch_detections(&self, feed_id: i64) -> Result<Vec<Detection>, ApiError>;
}

/// Generic `{status, error?}` reply wrapper used by mutating endpoints.
#[derive(Debug, Deserialize)]
struct StatusReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl StatusReply {
    fn expect(self, expected: &str, what: &str) -> Result<(), ApiError> {
        self.expect_one_of(&[expected], what)
    }

    fn expect_one_of(self, expected: &[&str], what: &str) -> Result<(), ApiError> {
        if expected.contains(&self.status.as_str()) {
            Ok(())
        } else {
            Err(ApiError::NotFound(
                self.error.unwrap_or_else(|| format!("{what} failed")),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateFeedReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
    feed: Option<Feed>,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
    filename: Option<String>,
}

/// Blocking HTTP client for every backend endpoint the dashboard uses.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)).send()?;
        decode_body(resp)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp = self.http.post(self.url(path)).json(body).send()?;
        decode_body(resp)
    }

    fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.http.post(self.url(path)).send()?;
        decode_body(resp)
    }

    // --- feeds ---

    pub fn list_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        self.get_json("/feeds")
    }

    pub fn create_feed(&self, name: &str, kind: FeedKind) -> Result<Feed, ApiError> {
        let body = serde_json::json!({ "name": name, "type": kind });
        let reply: CreateFeedReply = self.post_json("/feeds", &body)?;
        if reply.status != "success" {
            return Err(ApiError::NotFound(
                reply.error.unwrap_or_else(|| "Failed to add feed".to_string()),
            ));
        }
        reply
            .feed
            .ok_or_else(|| ApiError::Decode("feed missing from create reply".to_string()))
    }

    pub fn delete_feed(&self, feed_id: i64) -> Result<(), ApiError> {
        let resp = self.http.delete(self.url(&format!("/feeds/{feed_id}"))).send()?;
        let reply: StatusReply = decode_body(resp)?;
        reply.expect("success", "delete feed")
    }

    /// Upload the video file for a video feed; returns the server-side
    /// filename. Multipart field name is `video`.
    pub fn upload_video(&self, feed_id: i64, path: &Path) -> Result<String, ApiError> {
        let form = reqwest::blocking::multipart::Form::new()
            .file("video", path)
            .map_err(|e| ApiError::Validation(format!("cannot read video file: {e}")))?;
        let resp = self
            .http
            .post(self.url(&format!("/feeds/{feed_id}/upload_video")))
            .multipart(form)
            .send()?;
        let reply: UploadReply = decode_body(resp)?;
        if reply.status != "success" {
            return Err(ApiError::NotFound(
                reply
                    .error
                    .unwrap_or_else(|| "Failed to upload video".to_string()),
            ));
        }
        reply
            .filename
            .ok_or_else(|| ApiError::Decode("filename missing from upload reply".to_string()))
    }

    /// URL of the continuous MJPEG stream for a feed. The stream itself
    /// is consumed by [`crate::api::stream`], not parsed here.
    pub fn stream_url(&self, feed_id: i64) -> String {
        self.url(&format!("/feeds/{feed_id}/stream"))
    }
}

impl ZoneBackend for ApiClient {
    fn fetch_zones(&self, feed_id: i64) -> Result<Vec<Zone>, ApiError> {
        self.get_json(&format!("/feeds/{feed_id}/zones"))
    }

    fn save_zones(&self, feed_id: i64, zones: &[Zone]) -> Result<(), ApiError> {
        let body = serde_json::json!({ "zones": zones });
        let reply: StatusReply = self.post_json(&format!("/feeds/{feed_id}/zones"), &body)?;
        reply.expect("success", "save zones")
    }

    fn delete_zone(&self, feed_id: i64, zone_id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/feeds/{feed_id}/zones/{zone_id}")))
            .send()?;
        // A non-JSON body here means the route fell through to an error
        // page; decode_body reports that as a Decode failure.
        let reply: StatusReply = decode_body(resp)?;
        reply.expect("success", "delete zone")
    }
}

impl AnalysisBackend for ApiClient {
    fn start_analysis(&self, feed_id: i64) -> Result<(), ApiError> {
        let reply: StatusReply = self.post_empty(&format!("/feeds/{feed_id}/start_analysis"))?;
        reply.expect("started", "start analysis")
    }

    fn stop_analysis(&self, feed_id: i64) -> Result<(), ApiError> {
        let reply: StatusReply = self.post_empty(&format!("/feeds/{feed_id}/stop_analysis"))?;
        // The stop route answers "stopped", not "success".
        reply.expect_one_of(&["stopped", "success"], "stop analysis")
    }

    fn set_tracking(&self, feed_id: i64, enabled: bool) -> Result<(), ApiError> {
        let body = serde_json::json!({ "enabled": enabled });
        let reply: StatusReply =
            self.post_json(&format!("/feeds/{feed_id}/toggle_deepsort"), &body)?;
        reply.expect("success", "toggle tracking")
    }

    fn fetch_counts(&self, feed_id: i64) -> Result<LiveCounts, ApiError> {
        self.get_json(&format!("/feeds/{feed_id}/counts"))
    }

    fn fetch_detections(&self, feed_id: i64) -> Result<Vec<Detection>, ApiError> {
        self.get_json(&format!("/feeds/{feed_id}/detections"))
    }
}

/// Read the full body and parse it against the expected schema.
fn decode_body<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, ApiError> {
    let body = resp.text()?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(120).collect();
        ApiError::Decode(format!("{e} (body: {preview:?})"))
    })
}
