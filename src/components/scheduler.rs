//! Interval Scheduler Module
//!
//! This module implements the recording controller. A blocking worker thread
//! triggers an acquisition session at each interval boundary, compensates for
//! the time the sessions themselves take, and winds down cooperatively when
//! the cancel flag is raised.
use crate::api::controller::{RecordingApi, SensorLink};
use crate::api::model::ModelHandle;
use crate::components::acquisition::AcquisitionComponent;
use crate::components::storage::StorageComponent;
use crate::core::constants::SCHEDULER_POLL_INTERVAL;
use crate::core::events::AppEvent;
use crate::model::session::SessionConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{trace, warn};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::Sender;
use tokio::task::JoinHandle;

/// Phases of the scheduler lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// No worker is running.
    Idle,
    /// Waiting for the next trigger.
    Armed,
    /// An observation window is in flight.
    Sampling,
    /// The cancel flag was observed and the worker is winding down.
    Cancelled,
}

/// Trigger bookkeeping for the repeating acquisition cycle.
///
/// The first cycle fires immediately. Afterwards the tracker keeps a growing
/// threshold anchored at the end of the first cycle; a cycle fires once the
/// elapsed time exceeds the threshold minus the observation window, so the
/// window completes near the interval boundary instead of after it.
#[derive(Clone, Debug)]
pub struct IntervalTracker {
    anchor: Instant,
    threshold: Duration,
    window: Duration,
    first_cycle: bool,
}

impl IntervalTracker {
    /// Creates a tracker for the given interval, anchored at `now`.
    pub fn new(interval: Duration, window: Duration, now: Instant) -> Self {
        Self {
            anchor: now,
            threshold: interval,
            window,
            first_cycle: true,
        }
    }

    /// Whether a new acquisition cycle is due at `now`.
    pub fn should_fire(&self, now: Instant) -> bool {
        self.first_cycle
            || now.duration_since(self.anchor) > self.threshold.saturating_sub(self.window)
    }

    /// Records a completed cycle.
    ///
    /// The first completion re-anchors the tracker so subsequent intervals
    /// count from the end of the first window and resets the threshold to the
    /// freshly read interval; later completions extend the threshold by that
    /// interval so acquisition latency does not accumulate.
    pub fn complete_cycle(&mut self, now: Instant, interval: Duration) {
        if self.first_cycle {
            self.anchor = now;
            self.threshold = interval;
            self.first_cycle = false;
        } else {
            self.threshold += interval;
        }
    }

    /// Current trigger threshold measured from the anchor.
    #[allow(dead_code)]
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}

/// Recording controller driving the acquisition worker.
///
/// # Type Parameters
/// - `L`: Sensor link implementation the worker drives.
///
/// # Fields
/// - `event_bus`: Channel for broadcasting application events
/// - `config`: Shared session settings, re-read at every cycle boundary
/// - `storage`: Shared storage the worker records measurements into
/// - `acquisition`: Component running the individual observation windows
/// - `cancel`: Flag checked by the worker at its loop boundaries
/// - `worker`: Handle of the running worker, if any
pub struct SchedulerComponent<L: SensorLink + 'static> {
    event_bus: Sender<AppEvent>,
    config: ModelHandle<SessionConfig>,
    storage: ModelHandle<StorageComponent>,
    acquisition: AcquisitionComponent,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    link_type: PhantomData<L>,
}

impl<L: SensorLink + 'static> SchedulerComponent<L> {
    /// Creates a new `SchedulerComponent`.
    ///
    /// # Arguments
    /// - `event_bus`: The event bus for broadcasting application events.
    /// - `config`: Shared session configuration.
    /// - `storage`: Shared storage for completed measurements.
    /// - `acquisition`: The component running the observation windows.
    pub fn new(
        event_bus: Sender<AppEvent>,
        config: ModelHandle<SessionConfig>,
        storage: ModelHandle<StorageComponent>,
        acquisition: AcquisitionComponent,
    ) -> Self {
        trace!("scheduler initialized in {:?} phase", SchedulerPhase::Idle);
        Self {
            event_bus,
            config,
            storage,
            acquisition,
            cancel: Arc::new(AtomicBool::new(false)),
            worker: None,
            link_type: PhantomData,
        }
    }

    /// Whether a worker is currently running.
    #[allow(dead_code)]
    pub fn is_recording(&self) -> bool {
        self.worker.is_some()
    }

    /// The repeating acquisition loop run on the worker thread.
    ///
    /// The cancel flag is checked once per iteration; an in-flight
    /// observation window is never interrupted. Persistence failures are
    /// logged and do not abort the cycle.
    pub fn run_cycles(
        mut link: L,
        acquisition: AcquisitionComponent,
        config: ModelHandle<SessionConfig>,
        storage: ModelHandle<StorageComponent>,
        event_bus: Sender<AppEvent>,
        cancel: Arc<AtomicBool>,
    ) {
        let mut tracker = IntervalTracker::new(
            config.blocking_read().interval(),
            acquisition.window_duration(),
            Instant::now(),
        );
        loop {
            if cancel.load(Ordering::Acquire) {
                trace!("scheduler entered {:?} phase", SchedulerPhase::Cancelled);
                break;
            }
            if tracker.should_fire(Instant::now()) {
                trace!("scheduler entered {:?} phase", SchedulerPhase::Sampling);
                let measurement = acquisition.acquire(&mut link);
                if let Err(e) = storage.blocking_write().record(measurement) {
                    warn!("measurement not persisted: {}", e);
                }
                let _ = event_bus.send(AppEvent::Measurement(measurement));
                let interval = config.blocking_read().interval();
                tracker.complete_cycle(Instant::now(), interval);
                trace!("scheduler entered {:?} phase", SchedulerPhase::Armed);
                let _ = event_bus.send(AppEvent::Status(
                    "Waiting until next acquisition...".to_string(),
                ));
            }
            thread::sleep(SCHEDULER_POLL_INTERVAL);
        }
    }
}

#[async_trait]
impl<L: SensorLink + 'static> RecordingApi for SchedulerComponent<L> {
    async fn start_recording(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Err(anyhow!("recording is already running"));
        }
        let config = self.config.read().await.clone();
        if config.interval_minutes == 0 {
            let _ = self.event_bus.send(AppEvent::Status(
                "Invalid interval value (must be a positive number of minutes).".to_string(),
            ));
            return Err(anyhow!("invalid interval: 0 minutes"));
        }
        let events = self.event_bus.clone();
        let link = tokio::task::spawn_blocking(move || L::attach(&config, &events)).await??;
        self.cancel.store(false, Ordering::Release);
        let acquisition = self.acquisition.clone();
        let config = self.config.clone();
        let storage = self.storage.clone();
        let event_bus = self.event_bus.clone();
        let cancel = self.cancel.clone();
        self.worker = Some(tokio::task::spawn_blocking(move || {
            Self::run_cycles(link, acquisition, config, storage, event_bus, cancel)
        }));
        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<()> {
        self.cancel.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            // Cooperative shutdown; the worker finishes its current
            // iteration, including an in-flight window, before it observes
            // the flag.
            worker.await?;
        }
        Ok(())
    }
}

impl<L: SensorLink + 'static> Drop for SchedulerComponent<L> {
    /// Raises the cancel flag so an orphaned worker winds down on its next
    /// iteration. Dropping never blocks on the worker.
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::model::MeasurementModelApi;
    use crate::model::serial::DeviceError;
    use std::path::PathBuf;
    use tempdir::TempDir;
    use tokio::sync::{broadcast, RwLock};

    #[derive(Default)]
    struct ScriptedLink {
        position: usize,
    }

    impl ScriptedLink {
        const SCRIPT: [&'static str; 4] = ["0", "1", "0", "2"];
    }

    impl SensorLink for ScriptedLink {
        fn attach(_config: &SessionConfig, _events: &Sender<AppEvent>) -> Result<Self> {
            Ok(Self::default())
        }

        fn clear_input(&mut self) -> Result<()> {
            Ok(())
        }

        fn read_record(&mut self) -> Result<String> {
            thread::sleep(Duration::from_millis(1));
            let record = Self::SCRIPT[self.position % Self::SCRIPT.len()];
            self.position += 1;
            Ok(record.to_string())
        }
    }

    struct UnreachableLink;

    impl SensorLink for UnreachableLink {
        fn attach(config: &SessionConfig, _events: &Sender<AppEvent>) -> Result<Self> {
            Err(DeviceError::NoDeviceFound {
                marker: config.device_marker.clone(),
            }
            .into())
        }

        fn clear_input(&mut self) -> Result<()> {
            Ok(())
        }

        fn read_record(&mut self) -> Result<String> {
            Err(anyhow!("no link"))
        }
    }

    fn test_config(output: PathBuf) -> SessionConfig {
        SessionConfig {
            interval_minutes: 60,
            device_marker: "Scripted".to_string(),
            output,
        }
    }

    #[test]
    fn test_first_cycle_fires_immediately() {
        let now = Instant::now();
        let tracker =
            IntervalTracker::new(Duration::from_secs(600), Duration::from_secs(30), now);
        assert!(tracker.should_fire(now));
    }

    #[test]
    fn test_first_completion_re_anchors() {
        let start = Instant::now();
        let mut tracker =
            IntervalTracker::new(Duration::from_secs(60), Duration::from_secs(30), start);
        let first_done = start + Duration::from_secs(30);
        tracker.complete_cycle(first_done, Duration::from_secs(60));
        // 29 s after the first window ends is too early, 31 s is due.
        assert!(!tracker.should_fire(first_done + Duration::from_secs(29)));
        assert!(tracker.should_fire(first_done + Duration::from_secs(31)));
    }

    #[test]
    fn test_threshold_grows_by_interval_after_later_cycles() {
        let start = Instant::now();
        let interval = Duration::from_secs(60);
        let mut tracker = IntervalTracker::new(interval, Duration::from_secs(30), start);
        tracker.complete_cycle(start + Duration::from_secs(30), interval);
        assert_eq!(tracker.threshold(), interval);
        for n in 2u32..=4 {
            tracker.complete_cycle(start + Duration::from_secs(60 * u64::from(n)), interval);
            assert_eq!(tracker.threshold(), interval * n);
        }
    }

    #[test]
    fn test_interval_change_applies_at_cycle_boundary() {
        let start = Instant::now();
        let mut tracker =
            IntervalTracker::new(Duration::from_secs(60), Duration::from_secs(30), start);
        // The interval was reconfigured to 90 s during the first window and
        // to 120 s during the second; each boundary picks up the fresh value.
        tracker.complete_cycle(start + Duration::from_secs(30), Duration::from_secs(90));
        assert_eq!(tracker.threshold(), Duration::from_secs(90));
        tracker.complete_cycle(start + Duration::from_secs(120), Duration::from_secs(120));
        assert_eq!(tracker.threshold(), Duration::from_secs(210));
    }

    #[test]
    fn test_cancelled_before_start_never_samples() {
        let dir = TempDir::new("resp-scheduler").unwrap();
        let (tx, _rx) = broadcast::channel(64);
        let output = dir.path().join("log.json");
        let config: ModelHandle<SessionConfig> =
            Arc::new(RwLock::new(test_config(output.clone())));
        let storage: ModelHandle<StorageComponent> =
            Arc::new(RwLock::new(StorageComponent::new(output)));
        let acquisition = AcquisitionComponent::with_window(tx.clone(), Duration::from_millis(10));
        let cancel = Arc::new(AtomicBool::new(true));
        SchedulerComponent::<ScriptedLink>::run_cycles(
            ScriptedLink::default(),
            acquisition,
            config,
            storage.clone(),
            tx,
            cancel,
        );
        assert!(storage.blocking_read().get_measurements().is_empty());
    }

    #[test]
    fn test_records_first_cycle_immediately_then_waits() {
        let dir = TempDir::new("resp-scheduler").unwrap();
        let output = dir.path().join("log.json");
        let (tx, _rx) = broadcast::channel(64);
        let config: ModelHandle<SessionConfig> =
            Arc::new(RwLock::new(test_config(output.clone())));
        let storage: ModelHandle<StorageComponent> =
            Arc::new(RwLock::new(StorageComponent::new(output.clone())));
        let acquisition = AcquisitionComponent::with_window(tx.clone(), Duration::from_millis(20));
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = {
            let config = config.clone();
            let storage = storage.clone();
            let cancel = cancel.clone();
            thread::spawn(move || {
                SchedulerComponent::<ScriptedLink>::run_cycles(
                    ScriptedLink::default(),
                    acquisition,
                    config,
                    storage,
                    tx,
                    cancel,
                )
            })
        };
        // The first cycle fires with no initial wait; the hour-long interval
        // keeps a second one from firing before the flag is raised.
        thread::sleep(Duration::from_millis(200));
        cancel.store(true, Ordering::Release);
        worker.join().unwrap();
        let guard = storage.blocking_read();
        assert_eq!(guard.get_measurements().len(), 1);
        assert!(guard.get_measurements()[0].breaths_per_minute > 0);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_start_aborts_when_no_device_matches() {
        let (tx, _rx) = broadcast::channel(64);
        let config = Arc::new(RwLock::new(test_config(PathBuf::from("unused.json"))));
        let storage = Arc::new(RwLock::new(StorageComponent::new(PathBuf::from(
            "unused.json",
        ))));
        let acquisition = AcquisitionComponent::with_window(tx.clone(), Duration::from_millis(10));
        let mut scheduler =
            SchedulerComponent::<UnreachableLink>::new(tx, config, storage, acquisition);
        assert!(scheduler.start_recording().await.is_err());
        assert!(!scheduler.is_recording());
        // Stopping without a worker is a no-op.
        assert!(scheduler.stop_recording().await.is_ok());
    }

    #[tokio::test]
    async fn test_start_rejects_zero_interval() {
        let (tx, _rx) = broadcast::channel(64);
        let mut config = test_config(PathBuf::from("unused.json"));
        config.interval_minutes = 0;
        let config = Arc::new(RwLock::new(config));
        let storage = Arc::new(RwLock::new(StorageComponent::new(PathBuf::from(
            "unused.json",
        ))));
        let acquisition = AcquisitionComponent::with_window(tx.clone(), Duration::from_millis(10));
        let mut scheduler =
            SchedulerComponent::<ScriptedLink>::new(tx, config, storage, acquisition);
        assert!(scheduler.start_recording().await.is_err());
        assert!(!scheduler.is_recording());
    }

    #[tokio::test]
    async fn test_start_and_stop_recording() {
        let dir = TempDir::new("resp-scheduler").unwrap();
        let output = dir.path().join("log.json");
        let (tx, _rx) = broadcast::channel(64);
        let mut rx = tx.subscribe();
        let config = Arc::new(RwLock::new(test_config(output.clone())));
        let storage = Arc::new(RwLock::new(StorageComponent::new(output.clone())));
        let acquisition = AcquisitionComponent::with_window(tx.clone(), Duration::from_millis(10));
        let mut scheduler =
            SchedulerComponent::<ScriptedLink>::new(tx, config, storage.clone(), acquisition);

        assert!(scheduler.start_recording().await.is_ok());
        assert!(scheduler.is_recording());
        assert!(scheduler.start_recording().await.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(scheduler.stop_recording().await.is_ok());
        assert!(!scheduler.is_recording());

        let guard = storage.read().await;
        assert_eq!(guard.get_measurements().len(), 1);
        assert!(output.exists());

        // The broadcast measurement matches the stored one.
        let mut broadcast_measurement = None;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Measurement(m) = event {
                broadcast_measurement = Some(m);
            }
        }
        assert_eq!(broadcast_measurement.as_ref(), guard.get_last_measurement());
    }
}
