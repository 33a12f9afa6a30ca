// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MJPEG stream consumption.
//!
//! Reads the backend's continuous image stream on a background thread,
//! splits it into JPEG frames, decodes them with the `image` crate and
//! hands RGBA buffers to the UI thread over a channel (the same
//! channel-and-`try_recv` pattern the rest of the app uses for
//! background work).

use crate::api::error::ApiError;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const READ_CHUNK: usize = 16 * 1024;
// Drop the buffer if no frame boundary shows up within this much data.
const MAX_BUFFER: usize = 8 * 1024 * 1024;

/// One decoded video frame, ready to upload as an egui texture.
pub struct StreamFrame {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

/// Latest event pulled off a running stream.
pub enum StreamEvent {
    Frame(StreamFrame),
    /// The stream failed or ended; the reader thread has exited.
    Failed(ApiError),
    Pending,
}

/// Handle to a running stream reader. Dropping it stops the thread.
pub struct StreamHandle {
    rx: Receiver<Result<StreamFrame, ApiError>>,
    stop: Arc<AtomicBool>,
}

impl StreamHandle {
    /// Drain the channel and return the freshest frame, skipping any
    /// backlog so the display never lags behind the stream.
    pub fn poll(&self) -> StreamEvent {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(Ok(frame)) => latest = Some(frame),
                Ok(Err(e)) => return StreamEvent::Failed(e),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return match latest {
                        Some(frame) => StreamEvent::Frame(frame),
                        None => StreamEvent::Failed(ApiError::Device(
                            "video stream ended".to_string(),
                        )),
                    };
                }
            }
        }
        match latest {
            Some(frame) => StreamEvent::Frame(frame),
            None => StreamEvent::Pending,
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Connect to an MJPEG stream URL and start reading frames.
pub fn open_stream(url: String) -> StreamHandle {
    let (tx, rx) = channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    std::thread::spawn(move || {
        if let Err(e) = read_stream(&url, &flag, &tx) {
            let _ = tx.send(Err(e));
        }
    });

    StreamHandle { rx, stop }
}

fn read_stream(
    url: &str,
    stop: &AtomicBool,
    tx: &Sender<Result<StreamFrame, ApiError>>,
) -> Result<(), ApiError> {
    // Long-lived connection: connect timeout only, no overall deadline.
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()?;
    let resp = client.get(url).send()?;
    if !resp.status().is_success() {
        return Err(ApiError::Device(format!(
            "video stream unavailable (HTTP {})",
            resp.status()
        )));
    }

    let mut resp = resp;
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }
        let n = resp
            .read(&mut chunk)
            .map_err(|e| ApiError::Device(format!("video stream read failed: {e}")))?;
        if n == 0 {
            return Err(ApiError::Device("video stream ended".to_string()));
        }
        buf.extend_from_slice(&chunk[..n]);

        while let Some(jpeg) = take_next_jpeg(&mut buf) {
            match decode_jpeg(&jpeg) {
                Ok(frame) => {
                    if tx.send(Ok(frame)).is_err() {
                        return Ok(());
                    }
                }
                // A truncated frame mid-stream is not fatal.
                Err(e) => log::warn!("skipping undecodable stream frame: {e}"),
            }
        }

        if buf.len() > MAX_BUFFER {
            log::warn!("stream buffer overflow without frame boundary, resetting");
            buf.clear();
        }
    }
}

/// Extract and remove the next complete JPEG (SOI..EOI) from the buffer.
fn take_next_jpeg(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let start = find_marker(buf, &JPEG_SOI)?;
    let end = find_marker(&buf[start + 2..], &JPEG_EOI)? + start + 2 + 2;
    let jpeg = buf[start..end].to_vec();
    buf.drain(..end);
    Some(jpeg)
}

fn find_marker(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack
        .windows(2)
        .position(|w| w[0] == marker[0] && w[1] == marker[1])
}

fn decode_jpeg(data: &[u8]) -> Result<StreamFrame, ApiError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| ApiError::Decode(format!("bad JPEG frame: {e}")))?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(StreamFrame {
        size,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_next_jpeg_splits_frames() {
        // Two fake frames with multipart noise between them.
        let mut buf = Vec::new();
        buf.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
        buf.extend_from_slice(&[0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9]);
        buf.extend_from_slice(b"\r\n--frame\r\n\r\n");
        buf.extend_from_slice(&[0xFF, 0xD8, 0x03, 0xFF, 0xD9]);

        let first = take_next_jpeg(&mut buf).unwrap();
        assert_eq!(first, vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9]);

        let second = take_next_jpeg(&mut buf).unwrap();
        assert_eq!(second, vec![0xFF, 0xD8, 0x03, 0xFF, 0xD9]);

        assert!(take_next_jpeg(&mut buf).is_none());
    }

    #[test]
    fn test_take_next_jpeg_waits_for_complete_frame() {
        let mut buf = vec![0xFF, 0xD8, 0x01, 0x02];
        assert!(take_next_jpeg(&mut buf).is_none());
        // Data must be kept until the end marker arrives.
        assert_eq!(buf.len(), 4);

        buf.extend_from_slice(&[0xFF, 0xD9]);
        assert!(take_next_jpeg(&mut buf).is_some());
        assert!(buf.is_empty());
    }
}
