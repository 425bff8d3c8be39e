//! Playback lifecycle: device ownership, the fill thread, and fades.
//!
//! [`PlaybackDriver`] is the part of an engine that talks to an
//! [`OutputDevice`]. It owns at most one device at a time and runs two kinds
//! of background thread:
//!
//! - a **fill thread** per start, looping `source.fill → device.write` until
//!   the running flag drops or its generation is superseded
//! - at most one **fade thread**, stepping the device volume down and then
//!   tearing the device down
//!
//! ```text
//!            start()                 stop()/pause()          fade done
//! Stopped ──────────▶ Starting ──▶ Running ──────────▶ Stopping ─────────▶ Stopped
//!    ▲                   │ open failed                     │ start()/force_stop()
//!    └───────────────────┴─────────────────────────────────┘ (fade cancelled)
//! ```
//!
//! # Concurrency
//!
//! Lifecycle calls (`start`, `fade_*`, `force_stop`) serialize on an internal
//! mutex that background threads never take. The fill and fade threads see
//! only atomics and the device slot. Every start bumps a generation
//! counter; a thread finalizes state only if its generation is still current,
//! and a fade releases "its" device only if the slot still holds that exact
//! handle (`Arc::ptr_eq`). A superseded fade is cancelled and joined before
//! the next lifecycle step runs, so exactly one fade is ever in flight.
//!
//! Teardown runs pause, flush, stop and release individually. A failing step
//! is logged and the remaining steps still run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::{AudioBackend, OutputConfig, OutputDevice};
use crate::{Error, Result};

/// Produces interleaved samples for the fill thread.
///
/// Called once per buffer on the fill thread; must not block.
pub trait SampleSource: Send + 'static {
    /// Fill `out` completely.
    fn fill(&mut self, out: &mut [f32]);
}

impl<F> SampleSource for F
where
    F: FnMut(&mut [f32]) + Send + 'static,
{
    fn fill(&mut self, out: &mut [f32]) {
        self(out);
    }
}

/// Callback run once a fade-out has torn the device down.
pub type FadeCallback = Box<dyn FnOnce() + Send + 'static>;

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EngineState {
    /// No device held.
    Stopped = 0,
    /// Opening the device.
    Starting = 1,
    /// Device open and fill thread running.
    Running = 2,
    /// Fading to silence before teardown.
    Stopping = 3,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// State visible to the fill and fade threads.
struct Shared {
    label: &'static str,
    state: AtomicU8,
    running: AtomicBool,
    generation: AtomicU64,
    /// Volume requested by the caller.
    volume: AtomicU32,
    /// Volume last applied to the device (differs from `volume` mid-fade).
    applied: AtomicU32,
    device: Mutex<Option<Arc<dyn OutputDevice>>>,
}

impl Shared {
    fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn is_filling(&self, generation: u64) -> bool {
        self.running.load(Ordering::Acquire) && self.is_current(generation)
    }

    fn current_device(&self) -> Option<Arc<dyn OutputDevice>> {
        self.device.lock().clone()
    }

    /// Empty the slot only if it still holds `device`.
    fn take_device_if(&self, device: &Arc<dyn OutputDevice>) -> Option<Arc<dyn OutputDevice>> {
        let mut slot = self.device.lock();
        match slot.as_ref() {
            Some(current) if Arc::ptr_eq(current, device) => slot.take(),
            _ => None,
        }
    }

    fn apply_volume(&self, device: &dyn OutputDevice, volume: f32) {
        match device.set_volume(volume) {
            Ok(()) => self.applied.store(volume.to_bits(), Ordering::Relaxed),
            Err(err) => tracing::debug!(engine = self.label, error = %err, "set_volume skipped"),
        }
    }
}

fn load_f32(atomic: &AtomicU32) -> f32 {
    f32::from_bits(atomic.load(Ordering::Relaxed))
}

type TeardownStep = (&'static str, fn(&dyn OutputDevice) -> Result<()>);

const TEARDOWN: [TeardownStep; 4] = [
    ("pause", |d| d.pause()),
    ("flush", |d| d.flush()),
    ("stop", |d| d.stop()),
    ("release", |d| d.release()),
];

/// Run every teardown step, logging failures without stopping.
fn teardown_device(label: &str, device: &dyn OutputDevice) {
    for (step, op) in TEARDOWN {
        if let Err(err) = op(device) {
            tracing::warn!(engine = label, step, error = %err, "device teardown step failed");
        }
    }
}

struct FadeTask {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Tasks {
    fill: Option<JoinHandle<()>>,
    fade: Option<FadeTask>,
}

/// Owner of one engine's output device and background threads.
pub struct PlaybackDriver {
    backend: Arc<dyn AudioBackend>,
    shared: Arc<Shared>,
    tasks: Mutex<Tasks>,
}

impl std::fmt::Debug for PlaybackDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackDriver")
            .field("label", &self.shared.label)
            .field("backend", &self.backend.name())
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl PlaybackDriver {
    /// Create a stopped driver. `label` tags log lines and thread names.
    pub fn new(label: &'static str, backend: Arc<dyn AudioBackend>, volume: f32) -> Self {
        let volume = reposo_core::clamp_volume(volume);
        Self {
            backend,
            shared: Arc::new(Shared {
                label,
                state: AtomicU8::new(EngineState::Stopped as u8),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                volume: AtomicU32::new(volume.to_bits()),
                applied: AtomicU32::new(volume.to_bits()),
                device: Mutex::new(None),
            }),
            tasks: Mutex::new(Tasks::default()),
        }
    }

    /// Backend devices are opened from.
    pub fn backend(&self) -> &Arc<dyn AudioBackend> {
        &self.backend
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    /// Whether the fill thread is producing samples.
    pub fn is_playing(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Number of starts so far.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Requested volume.
    pub fn volume(&self) -> f32 {
        load_f32(&self.shared.volume)
    }

    /// Channel count of the live device, if any.
    pub fn channels(&self) -> Option<u16> {
        self.shared.current_device().map(|d| d.channels())
    }

    /// The live device, if any.
    pub fn device(&self) -> Option<Arc<dyn OutputDevice>> {
        self.shared.current_device()
    }

    /// Set the volume (clamped). Applied to the device unless a fade owns it.
    pub fn set_volume(&self, volume: f32) {
        let volume = reposo_core::clamp_volume(volume);
        self.shared.volume.store(volume.to_bits(), Ordering::Relaxed);
        if self.state() == EngineState::Running
            && let Some(device) = self.shared.current_device()
        {
            self.shared.apply_volume(&*device, volume);
        }
    }

    /// Open a device and start the fill thread.
    ///
    /// A no-op while already playing. Any fade in flight is cancelled and any
    /// previous device is torn down before the new one opens, so two live
    /// handles never coexist. On failure the driver is left `Stopped`.
    pub fn start<S: SampleSource>(&self, config: &OutputConfig, source: S) -> Result<()> {
        let mut tasks = self.tasks.lock();
        if self.is_playing() {
            tracing::debug!(engine = self.shared.label, "start ignored, already playing");
            return Ok(());
        }

        Self::cancel_fade(&mut tasks);
        self.teardown(&mut tasks);

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.shared.set_state(EngineState::Starting);

        let device = match self.backend.open_output(config) {
            Ok(device) => device,
            Err(err) => {
                self.shared.set_state(EngineState::Stopped);
                tracing::warn!(engine = self.shared.label, error = %err, "failed to open output device");
                return Err(err);
            }
        };
        self.shared.apply_volume(&*device, self.volume());
        *self.shared.device.lock() = Some(Arc::clone(&device));
        self.shared.running.store(true, Ordering::Release);

        let channels = usize::from(config.channels.max(1));
        let buffer_len = (config.buffer_samples / channels).max(1) * channels;
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("reposo-{}-fill", self.shared.label))
            .spawn(move || fill_loop(shared, device, source, generation, buffer_len));

        match spawned {
            Ok(handle) => tasks.fill = Some(handle),
            Err(err) => {
                self.teardown(&mut tasks);
                self.shared.set_state(EngineState::Stopped);
                tracing::warn!(engine = self.shared.label, error = %err, "failed to spawn fill thread");
                return Err(Error::Io(err));
            }
        }

        // The fill thread may already have failed and marked us Stopped.
        let _ = self.shared.state.compare_exchange(
            EngineState::Starting as u8,
            EngineState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        tracing::info!(
            engine = self.shared.label,
            channels = config.channels,
            sample_rate = config.sample_rate,
            generation,
            "playback started"
        );
        Ok(())
    }

    /// Stop producing samples and fade the device to silence over `duration`
    /// in `steps` linear steps, then tear it down.
    ///
    /// Returns immediately; the fade runs on its own thread.
    pub fn fade_to_stop(&self, duration: Duration, steps: u32) {
        let steps = steps.max(1);
        let step_delay = (duration / steps).max(Duration::from_millis(1));
        self.begin_fade(step_delay, steps, false, None);
    }

    /// Keep playing while fading the volume to zero over `duration`, then tear
    /// down and invoke `on_complete`.
    ///
    /// `on_complete` runs on a separate thread after teardown and may call
    /// back into the engine. It is dropped without running if the fade is
    /// superseded. With nothing playing it runs immediately.
    pub fn fade_out(&self, duration: Duration, steps: u32, on_complete: Option<FadeCallback>) {
        let steps = steps.max(1);
        self.begin_fade(duration / steps, steps, true, on_complete);
    }

    fn begin_fade(
        &self,
        step_delay: Duration,
        steps: u32,
        keep_filling: bool,
        on_complete: Option<FadeCallback>,
    ) {
        let mut tasks = self.tasks.lock();
        Self::cancel_fade(&mut tasks);

        let Some(device) = self.shared.current_device() else {
            self.shared.running.store(false, Ordering::Release);
            self.shared.set_state(EngineState::Stopped);
            drop(tasks);
            if let Some(callback) = on_complete {
                callback();
            }
            return;
        };

        let generation = self.generation();
        if !keep_filling {
            self.shared.running.store(false, Ordering::Release);
        }
        self.shared.set_state(EngineState::Stopping);

        let plan = FadePlan {
            shared: Arc::clone(&self.shared),
            device,
            generation,
            start_volume: load_f32(&self.shared.applied),
            steps,
            step_delay,
            cancel: Arc::new(AtomicBool::new(false)),
            on_complete,
        };
        let cancel = Arc::clone(&plan.cancel);
        let spawned = thread::Builder::new()
            .name(format!("reposo-{}-fade", self.shared.label))
            .spawn(move || plan.run());

        match spawned {
            Ok(handle) => tasks.fade = Some(FadeTask { cancel, handle }),
            Err(err) => {
                tracing::warn!(engine = self.shared.label, error = %err, "failed to spawn fade, stopping now");
                self.teardown(&mut tasks);
                self.shared.set_state(EngineState::Stopped);
            }
        }
    }

    /// Cancel any fade and tear down immediately.
    pub fn force_stop(&self) {
        let mut tasks = self.tasks.lock();
        Self::cancel_fade(&mut tasks);
        self.teardown(&mut tasks);
        self.shared.set_state(EngineState::Stopped);
    }

    /// Block until an in-flight fade has finished.
    pub fn wait_for_fade(&self) {
        let task = self.tasks.lock().fade.take();
        if let Some(task) = task
            && task.handle.join().is_err()
        {
            tracing::warn!(engine = self.shared.label, "fade thread panicked");
        }
    }

    fn cancel_fade(tasks: &mut Tasks) {
        if let Some(task) = tasks.fade.take() {
            task.cancel.store(true, Ordering::Release);
            if task.handle.join().is_err() {
                tracing::warn!("fade thread panicked");
            }
        }
    }

    /// Stop the fill thread and release the device, whatever the state.
    fn teardown(&self, tasks: &mut Tasks) {
        self.shared.running.store(false, Ordering::Release);
        let device = self.shared.device.lock().take();
        if let Some(device) = device {
            teardown_device(self.shared.label, &*device);
        }
        if let Some(handle) = tasks.fill.take()
            && handle.join().is_err()
        {
            tracing::warn!(engine = self.shared.label, "fill thread panicked");
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.force_stop();
    }
}

fn fill_loop<S: SampleSource>(
    shared: Arc<Shared>,
    device: Arc<dyn OutputDevice>,
    mut source: S,
    generation: u64,
    buffer_len: usize,
) {
    let mut buffer = vec![0.0f32; buffer_len];
    while shared.is_filling(generation) {
        source.fill(&mut buffer);
        if let Err(err) = device.write(&buffer) {
            if shared.is_filling(generation) {
                tracing::warn!(
                    engine = shared.label,
                    generation,
                    error = %err,
                    "device write failed, stopping"
                );
                shared.running.store(false, Ordering::Release);
                if let Some(device) = shared.take_device_if(&device) {
                    teardown_device(shared.label, &*device);
                }
                if shared.is_current(generation) {
                    shared.set_state(EngineState::Stopped);
                }
            }
            break;
        }
    }
    tracing::debug!(engine = shared.label, generation, "fill loop exited");
}

struct FadePlan {
    shared: Arc<Shared>,
    device: Arc<dyn OutputDevice>,
    generation: u64,
    start_volume: f32,
    steps: u32,
    step_delay: Duration,
    cancel: Arc<AtomicBool>,
    on_complete: Option<FadeCallback>,
}

impl FadePlan {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    fn run(self) {
        let label = self.shared.label;
        for i in (0..=self.steps).rev() {
            if self.cancelled() {
                tracing::debug!(engine = label, "fade cancelled");
                return;
            }
            let volume = self.start_volume * (i as f32 / self.steps as f32);
            self.shared.apply_volume(&*self.device, volume);
            thread::sleep(self.step_delay);
        }
        if self.cancelled() {
            tracing::debug!(engine = label, "fade cancelled");
            return;
        }

        let current = self.shared.is_current(self.generation);
        if current {
            self.shared.running.store(false, Ordering::Release);
        }
        if let Some(device) = self.shared.take_device_if(&self.device) {
            teardown_device(label, &*device);
        }
        if current {
            self.shared.set_state(EngineState::Stopped);
        }
        tracing::debug!(engine = label, generation = self.generation, "fade complete");

        if let Some(callback) = self.on_complete {
            let spawned = thread::Builder::new()
                .name(format!("reposo-{label}-fade-done"))
                .spawn(callback);
            if let Err(err) = spawned {
                tracing::warn!(engine = label, error = %err, "failed to run fade callback");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn driver(backend: &Arc<MockBackend>) -> PlaybackDriver {
        PlaybackDriver::new("test", Arc::clone(backend) as Arc<dyn AudioBackend>, 0.5)
    }

    fn silence(out: &mut [f32]) {
        out.fill(0.0);
    }

    #[test]
    fn start_is_idempotent_while_playing() {
        let backend = Arc::new(MockBackend::new());
        let d = driver(&backend);
        d.start(&OutputConfig::default(), silence).unwrap();
        d.start(&OutputConfig::default(), silence).unwrap();
        assert_eq!(backend.opened(), 1);
        assert_eq!(d.state(), EngineState::Running);
        d.force_stop();
        assert_eq!(backend.live(), 0);
        assert_eq!(d.state(), EngineState::Stopped);
    }

    #[test]
    fn open_failure_leaves_stopped() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_open();
        let d = driver(&backend);
        assert!(d.start(&OutputConfig::default(), silence).is_err());
        assert_eq!(d.state(), EngineState::Stopped);
        assert!(!d.is_playing());
        assert!(d.device().is_none());
    }

    #[test]
    fn fade_ramps_down_then_releases() {
        let backend = Arc::new(MockBackend::new());
        let d = driver(&backend);
        d.start(&OutputConfig::default(), silence).unwrap();
        d.fade_to_stop(Duration::from_millis(12), 12);
        assert_eq!(d.state(), EngineState::Stopping);
        d.wait_for_fade();
        assert_eq!(d.state(), EngineState::Stopped);
        assert_eq!(backend.live(), 0);

        let dev = backend.last_device().unwrap();
        let volumes = dev.volumes();
        // initial volume, then 13 ramp points from 0.5 down to 0
        assert_eq!(volumes.len(), 14);
        assert_eq!(volumes[1], 0.5);
        assert_eq!(*volumes.last().unwrap(), 0.0);
        assert!(volumes[1..].windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(dev.calls(), vec!["pause", "flush", "stop", "release"]);
    }

    #[test]
    fn write_failure_stops_engine() {
        let backend = Arc::new(MockBackend::new());
        let d = driver(&backend);
        d.start(&OutputConfig::default(), silence).unwrap();
        backend.fail_writes(true);
        for _ in 0..200 {
            if d.state() == EngineState::Stopped {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(d.state(), EngineState::Stopped);
        assert!(!d.is_playing());
        assert_eq!(backend.live(), 0);
    }

    #[test]
    fn teardown_continues_past_failures() {
        let backend = Arc::new(MockBackend::new());
        let d = driver(&backend);
        d.start(&OutputConfig::default(), silence).unwrap();
        let dev = d.device().unwrap();
        // release behind the driver's back: pause/flush/stop now fail
        dev.release().unwrap();
        d.force_stop();
        assert_eq!(d.state(), EngineState::Stopped);
        assert_eq!(backend.live(), 0);
    }
}
