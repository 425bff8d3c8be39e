//! Deterministic in-memory backend for tests and headless runs.
//!
//! [`MockBackend`] counts every device it opens and how many are still
//! unreleased, so tests can assert that a mode switch never leaves two live
//! handles. [`MockOutput`] records written samples (up to a cap) and every
//! volume change, and paces writes with a short sleep to behave like a device
//! that drains in real time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::{AudioBackend, AudioDevice, OutputConfig, OutputDevice};
use crate::{Error, Result};

/// Default cap on recorded samples per device.
pub const DEFAULT_RECORD_LIMIT: usize = 1 << 20;

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    live: AtomicUsize,
    fail_next_open: AtomicBool,
    fail_writes: AtomicBool,
}

/// Backend that produces [`MockOutput`] devices.
#[derive(Debug)]
pub struct MockBackend {
    counters: Arc<Counters>,
    devices: Mutex<Vec<Arc<MockOutput>>>,
    write_delay: Duration,
    record_limit: usize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Mock with a 1 ms delay per write.
    pub fn new() -> Self {
        Self::with_write_delay(Duration::from_millis(1))
    }

    /// Mock with a custom per-write delay.
    pub fn with_write_delay(write_delay: Duration) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            devices: Mutex::new(Vec::new()),
            write_delay,
            record_limit: DEFAULT_RECORD_LIMIT,
        }
    }

    /// Devices opened so far.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Devices opened and not yet released.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Make the next [`open_output`](AudioBackend::open_output) fail.
    pub fn fail_next_open(&self) {
        self.counters.fail_next_open.store(true, Ordering::SeqCst);
    }

    /// Make every write on every device fail from now on.
    pub fn fail_writes(&self, fail: bool) {
        self.counters.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every device opened, oldest first.
    pub fn devices(&self) -> Vec<Arc<MockOutput>> {
        self.devices.lock().clone()
    }

    /// The most recently opened device.
    pub fn last_device(&self) -> Option<Arc<MockOutput>> {
        self.devices.lock().last().cloned()
    }
}

impl AudioBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(vec![AudioDevice {
            name: "Mock Output".to_string(),
            is_default: true,
            default_sample_rate: reposo_core::SAMPLE_RATE,
            channels: 2,
        }])
    }

    fn open_output(&self, config: &OutputConfig) -> Result<Arc<dyn OutputDevice>> {
        if self.counters.fail_next_open.swap(false, Ordering::SeqCst) {
            return Err(Error::Stream("mock open failure".to_string()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        let device = Arc::new(MockOutput {
            config: config.clone(),
            counters: Arc::clone(&self.counters),
            released: AtomicBool::new(false),
            state: Mutex::new(MockState::default()),
            write_delay: self.write_delay,
            record_limit: self.record_limit,
        });
        self.devices.lock().push(Arc::clone(&device));
        Ok(device)
    }
}

#[derive(Debug, Default)]
struct MockState {
    samples: Vec<f32>,
    written: usize,
    volumes: Vec<f32>,
    calls: Vec<&'static str>,
}

/// Recording output device.
#[derive(Debug)]
pub struct MockOutput {
    config: OutputConfig,
    counters: Arc<Counters>,
    released: AtomicBool,
    state: Mutex<MockState>,
    write_delay: Duration,
    record_limit: usize,
}

impl MockOutput {
    /// Config the device was opened with.
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Recorded samples (first `record_limit` only).
    pub fn samples(&self) -> Vec<f32> {
        self.state.lock().samples.clone()
    }

    /// Total samples written, including those past the record limit.
    pub fn written(&self) -> usize {
        self.state.lock().written
    }

    /// Every volume set, in order.
    pub fn volumes(&self) -> Vec<f32> {
        self.state.lock().volumes.clone()
    }

    /// Names of teardown calls made, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    fn guard(&self) -> Result<()> {
        if self.is_released() {
            Err(Error::DeviceReleased)
        } else {
            Ok(())
        }
    }

    fn record_call(&self, name: &'static str) {
        self.state.lock().calls.push(name);
    }
}

impl OutputDevice for MockOutput {
    fn channels(&self) -> u16 {
        self.config.channels
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    fn write(&self, samples: &[f32]) -> Result<()> {
        self.guard()?;
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Stream("mock write failure".to_string()));
        }
        {
            let mut state = self.state.lock();
            let room = self.record_limit.saturating_sub(state.samples.len());
            let take = room.min(samples.len());
            state.samples.extend_from_slice(&samples[..take]);
            state.written += samples.len();
        }
        if !self.write_delay.is_zero() {
            std::thread::sleep(self.write_delay);
        }
        self.guard()
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.guard()?;
        self.state.lock().volumes.push(volume);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.guard()?;
        self.record_call("pause");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.guard()?;
        self.record_call("flush");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.guard()?;
        self.record_call("stop");
        Ok(())
    }

    fn release(&self) -> Result<()> {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
            self.record_call("release");
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}
