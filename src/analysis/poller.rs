// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live analysis polling.
//!
//! Each poller instance drives one fixed-interval tick loop on a
//! background thread: per tick it fetches current counts and detections
//! for its feed and sends the sample to the UI thread over a channel.
//! Two independent instances run in the app (main analysis view and the
//! preview panel); they never coordinate.
//!
//! Tick samples are tagged with the feed id and a monotonically
//! increasing sequence number. The consumer drops any sample from a
//! previous session, another feed, or with a sequence not newer than the
//! last one applied, so a slow stale response can never clobber fresher
//! data.

use crate::api::client::AnalysisBackend;
use crate::api::error::ApiError;
use crate::models::zone::{Detection, LiveCounts};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed tick interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// How often a sleeping tick thread re-checks its stop flag.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(10);

/// One completed fetch cycle.
#[derive(Debug, Clone)]
pub struct TickSample {
    pub feed_id: i64,
    pub seq: u64,
    pub counts: LiveCounts,
    pub detections: Vec<Detection>,
}

enum PollerEvent {
    Started { feed_id: i64 },
    StartFailed { feed_id: i64, error: ApiError },
    Tick(TickSample),
}

struct ActivePoll {
    feed_id: i64,
    stop: Arc<AtomicBool>,
    /// When set, the exiting scheduler thread also sends the backend a
    /// stop request. Left unset when the session is merely superseded.
    backend_stop: Arc<AtomicBool>,
    events: Receiver<PollerEvent>,
}

/// Result of draining a poller's pending events on the UI thread.
#[derive(Default)]
pub struct PumpResult {
    /// A fresh tick was applied; rendering surfaces should repaint.
    pub fresh_tick: bool,
    /// The backend rejected the start request; polling never began.
    pub start_error: Option<ApiError>,
}

pub struct AnalysisPoller {
    backend: Arc<dyn AnalysisBackend>,
    interval: Duration,
    active: Option<ActivePoll>,
    last_seq: u64,
    latest: LiveCounts,
    latest_detections: Vec<Detection>,
    awaiting_first_activity: bool,
}

impl AnalysisPoller {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self::with_interval(backend, TICK_INTERVAL)
    }

    fn with_interval(backend: Arc<dyn AnalysisBackend>, interval: Duration) -> Self {
        Self {
            backend,
            interval,
            active: None,
            last_seq: 0,
            latest: LiveCounts::default(),
            latest_detections: Vec::new(),
            awaiting_first_activity: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn running_feed(&self) -> Option<i64> {
        self.active.as_ref().map(|a| a.feed_id)
    }

    pub fn latest_counts(&self) -> &LiveCounts {
        &self.latest
    }

    pub fn latest_detections(&self) -> &[Detection] {
        &self.latest_detections
    }

    /// True from start until the first tick reporting any activity. Not
    /// a timeout: if the backend never reports a nonzero count this
    /// stays set for the whole session.
    pub fn is_loading(&self) -> bool {
        self.is_running() && self.awaiting_first_activity
    }

    /// Begin a polling session for `feed_id`. Any previous scheduler on
    /// this instance is cancelled first, so at most one tick loop is
    /// ever active per poller.
    pub fn start(&mut self, feed_id: i64) {
        self.halt_scheduler();
        self.latest = LiveCounts::default();
        self.latest_detections.clear();
        self.last_seq = 0;
        self.awaiting_first_activity = true;

        let (tx, rx) = channel();
        let stop = Arc::new(AtomicBool::new(false));
        let backend_stop = Arc::new(AtomicBool::new(false));
        let backend = Arc::clone(&self.backend);
        let cancel = Arc::clone(&stop);
        let notify = Arc::clone(&backend_stop);
        let interval = self.interval;
        std::thread::spawn(move || run_poll_loop(backend, feed_id, interval, cancel, notify, tx));

        self.active = Some(ActivePoll {
            feed_id,
            stop,
            backend_stop,
            events: rx,
        });
        log::info!("polling started for feed {feed_id}");
    }

    /// Cancel the tick scheduler immediately and clear live state.
    /// In-flight fetches are not awaited; their results are discarded.
    /// The backend stop request is best-effort, issued by the exiting
    /// scheduler thread, and never blocks local cleanup.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.backend_stop.store(true, Ordering::SeqCst);
            active.stop.store(true, Ordering::SeqCst);
            log::info!("polling stopped for feed {}", active.feed_id);
        }
        self.latest = LiveCounts::default();
        self.latest_detections.clear();
        self.awaiting_first_activity = false;
    }

    fn halt_scheduler(&mut self) {
        if let Some(active) = self.active.take() {
            active.stop.store(true, Ordering::Relaxed);
        }
    }

    /// Drain pending events from the tick thread. Called once per UI
    /// frame; each applied sample fully replaces the previous counts.
    pub fn pump(&mut self) -> PumpResult {
        let mut result = PumpResult::default();
        loop {
            let event = match &self.active {
                Some(active) => match active.events.try_recv() {
                    Ok(event) => event,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                },
                None => break,
            };
            match event {
                PollerEvent::Started { feed_id } => {
                    log::info!("backend confirmed analysis start for feed {feed_id}");
                }
                PollerEvent::StartFailed { feed_id, error } => {
                    log::error!("analysis start failed for feed {feed_id}: {error}");
                    self.active = None;
                    self.awaiting_first_activity = false;
                    result.start_error = Some(error);
                }
                PollerEvent::Tick(sample) => {
                    if self.accept(sample) {
                        result.fresh_tick = true;
                    }
                }
            }
        }
        result
    }

    /// Apply a tick sample unless it is stale: wrong feed, or a sequence
    /// no newer than the last applied one.
    fn accept(&mut self, sample: TickSample) -> bool {
        if self.running_feed() != Some(sample.feed_id) {
            return false;
        }
        if sample.seq <= self.last_seq {
            return false;
        }
        self.last_seq = sample.seq;
        if self.awaiting_first_activity && sample.counts.has_activity() {
            self.awaiting_first_activity = false;
        }
        self.latest = sample.counts;
        self.latest_detections = sample.detections;
        true
    }
}

fn run_poll_loop(
    backend: Arc<dyn AnalysisBackend>,
    feed_id: i64,
    interval: Duration,
    stop: Arc<AtomicBool>,
    backend_stop: Arc<AtomicBool>,
    tx: Sender<PollerEvent>,
) {
    if let Err(error) = backend.start_analysis(feed_id) {
        let _ = tx.send(PollerEvent::StartFailed { feed_id, error });
        return;
    }
    let _ = tx.send(PollerEvent::Started { feed_id });

    run_tick_loop(backend.as_ref(), feed_id, interval, &stop, &tx);

    // Sent from this thread, after the start request has completed, so
    // the stop can never overtake the start on the wire.
    if backend_stop.load(Ordering::SeqCst) {
        if let Err(e) = backend.stop_analysis(feed_id) {
            log::warn!("stop request for feed {feed_id} failed: {e}");
        }
    }
}

fn run_tick_loop(
    backend: &dyn AnalysisBackend,
    feed_id: i64,
    interval: Duration,
    stop: &AtomicBool,
    tx: &Sender<PollerEvent>,
) {
    let mut seq: u64 = 0;
    let mut next_tick = Instant::now() + interval;
    loop {
        // Fixed-interval schedule, re-checking the stop flag while idle
        // so cancellation takes effect without waiting out the interval.
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let now = Instant::now();
            if now >= next_tick {
                break;
            }
            std::thread::sleep(STOP_CHECK_SLICE.min(next_tick - now));
        }
        next_tick += interval;
        seq += 1;

        let counts = match backend.fetch_counts(feed_id) {
            Ok(counts) => counts,
            Err(e) => {
                // A single failed tick does not stop the scheduler.
                log::warn!("counts fetch failed for feed {feed_id}: {e}");
                continue;
            }
        };
        let detections = match backend.fetch_detections(feed_id) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("detections fetch failed for feed {feed_id}: {e}");
                Vec::new()
            }
        };

        if stop.load(Ordering::SeqCst) {
            return;
        }
        let sample = TickSample {
            feed_id,
            seq,
            counts,
            detections,
        };
        if tx.send(PollerEvent::Tick(sample)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubBackend {
        fetches: AtomicUsize,
        tracking_calls: AtomicUsize,
        fail_start: bool,
        total: u32,
    }

    impl AnalysisBackend for StubBackend {
        fn start_analysis(&self, _feed_id: i64) -> Result<(), ApiError> {
            if self.fail_start {
                Err(ApiError::NotFound("start analysis failed".to_string()))
            } else {
                Ok(())
            }
        }

        fn stop_analysis(&self, _feed_id: i64) -> Result<(), ApiError> {
            Ok(())
        }

        fn set_tracking(&self, _feed_id: i64, _enabled: bool) -> Result<(), ApiError> {
            self.tracking_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn fetch_counts(&self, _feed_id: i64) -> Result<LiveCounts, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(LiveCounts {
                total: self.total,
                zones: BTreeMap::new(),
            })
        }

        fn fetch_detections(&self, _feed_id: i64) -> Result<Vec<Detection>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn sample(feed_id: i64, seq: u64, total: u32) -> TickSample {
        TickSample {
            feed_id,
            seq,
            counts: LiveCounts {
                total,
                zones: BTreeMap::new(),
            },
            detections: Vec::new(),
        }
    }

    fn poller_with_fake_active(backend: Arc<StubBackend>, feed_id: i64) -> AnalysisPoller {
        let mut poller = AnalysisPoller::with_interval(backend, Duration::from_millis(10));
        let (_tx, rx) = channel();
        poller.active = Some(ActivePoll {
            feed_id,
            stop: Arc::new(AtomicBool::new(false)),
            backend_stop: Arc::new(AtomicBool::new(false)),
            events: rx,
        });
        poller.awaiting_first_activity = true;
        poller
    }

    #[test]
    fn test_accept_rejects_stale_sequence() {
        let backend = Arc::new(StubBackend::default());
        let mut poller = poller_with_fake_active(backend, 1);

        assert!(poller.accept(sample(1, 2, 5)));
        assert_eq!(poller.latest_counts().total, 5);

        // A slow earlier response arriving late must not clobber this.
        assert!(!poller.accept(sample(1, 1, 99)));
        assert_eq!(poller.latest_counts().total, 5);

        assert!(poller.accept(sample(1, 3, 7)));
        assert_eq!(poller.latest_counts().total, 7);
    }

    #[test]
    fn test_accept_rejects_other_feed() {
        let backend = Arc::new(StubBackend::default());
        let mut poller = poller_with_fake_active(backend, 1);

        assert!(!poller.accept(sample(2, 1, 42)));
        assert_eq!(poller.latest_counts().total, 0);
    }

    #[test]
    fn test_loading_cleared_by_first_activity() {
        let backend = Arc::new(StubBackend::default());
        let mut poller = poller_with_fake_active(backend, 1);
        assert!(poller.is_loading());

        // Zero-activity ticks keep the loading indicator up.
        assert!(poller.accept(sample(1, 1, 0)));
        assert!(poller.is_loading());

        assert!(poller.accept(sample(1, 2, 3)));
        assert!(!poller.is_loading());
    }

    #[test]
    fn test_start_failure_surfaces_and_clears_session() {
        let backend = Arc::new(StubBackend {
            fail_start: true,
            ..Default::default()
        });
        let mut poller =
            AnalysisPoller::with_interval(Arc::clone(&backend) as Arc<dyn AnalysisBackend>, Duration::from_millis(10));

        poller.start(1);
        std::thread::sleep(Duration::from_millis(50));
        let result = poller.pump();
        assert!(result.start_error.is_some());
        assert!(!poller.is_running());
    }

    #[test]
    fn test_double_start_leaves_single_scheduler() {
        let backend = Arc::new(StubBackend {
            total: 1,
            ..Default::default()
        });
        let mut poller = AnalysisPoller::with_interval(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Duration::from_millis(20),
        );

        poller.start(1);
        poller.start(1);
        std::thread::sleep(Duration::from_millis(130));
        poller.stop();
        // Let any in-flight tick finish.
        std::thread::sleep(Duration::from_millis(60));

        // One 20 ms scheduler over ~130 ms dispatches about 6 ticks; two
        // overlapping schedulers would roughly double that.
        let fetched = backend.fetches.load(Ordering::SeqCst);
        assert!(fetched >= 2, "scheduler never ticked (got {fetched})");
        assert!(fetched <= 9, "overlapping schedulers suspected (got {fetched})");
    }

    #[test]
    fn test_stop_cancels_future_ticks() {
        let backend = Arc::new(StubBackend {
            total: 1,
            ..Default::default()
        });
        let mut poller = AnalysisPoller::with_interval(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Duration::from_millis(10),
        );

        poller.start(1);
        std::thread::sleep(Duration::from_millis(60));
        poller.stop();
        assert_eq!(poller.latest_counts().total, 0);
        assert!(!poller.is_running());

        // Grace period for an in-flight tick, then the count must freeze.
        std::thread::sleep(Duration::from_millis(40));
        let settled = backend.fetches.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(backend.fetches.load(Ordering::SeqCst), settled);

        // No further results are delivered after stop.
        assert!(!poller.pump().fresh_tick);
    }

    #[test]
    fn test_session_never_touches_tracking() {
        let backend = Arc::new(StubBackend {
            total: 1,
            ..Default::default()
        });
        let mut poller = AnalysisPoller::with_interval(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Duration::from_millis(10),
        );

        // Tracking is managed by the main analysis flow; a polling
        // session started for the preview charts must leave the
        // backend's tracking state exactly as it found it.
        poller.start(1);
        std::thread::sleep(Duration::from_millis(50));
        poller.stop();
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(backend.tracking_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_backend_stop_ordered_after_start() {
        #[derive(Default)]
        struct SlowStartBackend {
            calls: Mutex<Vec<&'static str>>,
        }

        impl AnalysisBackend for SlowStartBackend {
            fn start_analysis(&self, _feed_id: i64) -> Result<(), ApiError> {
                std::thread::sleep(Duration::from_millis(30));
                self.calls.lock().unwrap().push("start");
                Ok(())
            }

            fn stop_analysis(&self, _feed_id: i64) -> Result<(), ApiError> {
                self.calls.lock().unwrap().push("stop");
                Ok(())
            }

            fn set_tracking(&self, _feed_id: i64, _enabled: bool) -> Result<(), ApiError> {
                Ok(())
            }

            fn fetch_counts(&self, _feed_id: i64) -> Result<LiveCounts, ApiError> {
                Ok(LiveCounts::default())
            }

            fn fetch_detections(&self, _feed_id: i64) -> Result<Vec<Detection>, ApiError> {
                Ok(Vec::new())
            }
        }

        let backend = Arc::new(SlowStartBackend::default());
        let mut poller = AnalysisPoller::with_interval(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Duration::from_millis(10),
        );

        // Stop while the slow start request is still in flight; the
        // backend stop must still arrive after it.
        poller.start(1);
        poller.stop();
        std::thread::sleep(Duration::from_millis(120));

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["start", "stop"]);
    }

    #[test]
    fn test_restart_on_new_feed_drops_old_feed_results() {
        let backend = Arc::new(StubBackend {
            total: 1,
            ..Default::default()
        });
        let mut poller = AnalysisPoller::with_interval(
            Arc::clone(&backend) as Arc<dyn AnalysisBackend>,
            Duration::from_millis(10),
        );

        poller.start(1);
        std::thread::sleep(Duration::from_millis(40));
        poller.stop();
        poller.start(2);
        std::thread::sleep(Duration::from_millis(40));
        poller.pump();

        // Everything applied after the switch is tagged with the new feed.
        assert_eq!(poller.running_feed(), Some(2));
        // Directly injected old-feed samples are rejected too.
        assert!(!poller.accept(sample(1, u64::MAX, 9)));
        poller.stop();
    }
}
