// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Feed data structures.
//!
//! A feed is a named video source owned by the backend, either a live
//! camera or an uploaded video file.

use serde::{Deserialize, Serialize};

/// Kind of video source behind a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Camera,
    Video,
}

impl FeedKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            FeedKind::Camera => "Camera",
            FeedKind::Video => "Video",
        }
    }
}

/// A registered camera or video feed, cached client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FeedKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_wire_format() {
        let json = serde_json::json!({
            "id": 3,
            "name": "Lobby",
            "type": "camera"
        });
        let feed: Feed = serde_json::from_value(json).unwrap();
        assert_eq!(feed.id, 3);
        assert_eq!(feed.kind, FeedKind::Camera);
        assert!(feed.video_filename.is_none());

        let json = serde_json::json!({
            "id": 4,
            "name": "Recording",
            "type": "video",
            "video_filename": "abc.mp4"
        });
        let feed: Feed = serde_json::from_value(json).unwrap();
        assert_eq!(feed.kind, FeedKind::Video);
        assert_eq!(feed.video_filename.as_deref(), Some("abc.mp4"));
    }
}
