use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::sensor::client::{SensorApi, SensorStatus};
use crate::state::profile::Scan;

pub const DEFAULT_POLL_RATE_MS: u64 = 200;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 10;
/// How often the poller refreshes the connection status.
pub const STATUS_REFRESH: Duration = Duration::from_secs(1);

/// Missing samples become 0, then the profile is shifted so its minimum is 0.
pub fn normalize_live_profile(raw: &[Option<f64>]) -> Vec<f64> {
    let z: Vec<f64> = raw
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
        .collect();
    let min = z.iter().copied().fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        z.into_iter().map(|v| v - min).collect()
    } else {
        z
    }
}

/// Messages from the poller thread to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveUpdate {
    Status(SensorStatus),
    Profile(Vec<f64>),
    Error(String),
}

/// Requests from the UI to the poller thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerCommand {
    SetPollRate(Duration),
    Connect,
    Disconnect,
    SetSensor { ip: String, port: u16 },
    Shutdown,
}

/// Background thread that owns the sensor client. The UI never blocks on
/// the network: it sends [`PollerCommand`]s and drains [`LiveUpdate`]s once
/// per frame.
pub struct Poller {
    commands: Sender<PollerCommand>,
    updates: Receiver<LiveUpdate>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn(api: Box<dyn SensorApi>, poll_rate: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (upd_tx, upd_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("sensor-poller".into())
            .spawn(move || run_poller(api, poll_rate, cmd_rx, upd_tx));
        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!("cannot start sensor poller: {e}");
                None
            }
        };
        Self {
            commands: cmd_tx,
            updates: upd_rx,
            handle,
        }
    }

    pub fn send(&self, cmd: PollerCommand) {
        if self.commands.send(cmd).is_err() {
            tracing::warn!("sensor poller is not running");
        }
    }

    /// Everything received since the last call, oldest first.
    pub fn drain(&self) -> Vec<LiveUpdate> {
        self.updates.try_iter().collect()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.commands.send(PollerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_poller(
    api: Box<dyn SensorApi>,
    mut poll_rate: Duration,
    commands: Receiver<PollerCommand>,
    updates: Sender<LiveUpdate>,
) {
    let mut connected = false;
    let mut last_status: Option<Instant> = None;

    loop {
        if last_status.map_or(true, |t| t.elapsed() >= STATUS_REFRESH) {
            last_status = Some(Instant::now());
            match api.status() {
                Ok(status) => {
                    connected = status.connected;
                    if updates.send(LiveUpdate::Status(status)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::debug!("status poll failed: {e}");
                    connected = false;
                    if updates.send(LiveUpdate::Error(e.to_string())).is_err() {
                        return;
                    }
                }
            }
        }

        if connected {
            let update = match api.profile() {
                Ok(raw) => LiveUpdate::Profile(normalize_live_profile(&raw)),
                Err(e) => {
                    tracing::warn!("profile poll failed: {e}");
                    connected = false;
                    LiveUpdate::Error(e.to_string())
                }
            };
            if updates.send(update).is_err() {
                return;
            }
        }

        match commands.recv_timeout(poll_rate) {
            Ok(PollerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
            Ok(cmd) => {
                let result = match cmd {
                    PollerCommand::SetPollRate(rate) => {
                        poll_rate = rate.max(Duration::from_millis(1));
                        Ok(())
                    }
                    PollerCommand::Connect => api.connect().map(|c| connected = c),
                    PollerCommand::Disconnect => api.disconnect().map(|_| connected = false),
                    PollerCommand::SetSensor { ip, port } => api.set_sensor(&ip, port),
                    PollerCommand::Shutdown => Ok(()),
                };
                if let Err(e) = result {
                    tracing::error!("sensor command failed: {e}");
                    let _ = updates.send(LiveUpdate::Error(e.to_string()));
                }
                // Refresh status right after any command.
                last_status = None;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

/// Recording of live profiles into a scan list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSession {
    scans: Vec<Scan>,
    capturing: bool,
    paused: bool,
    last_saved_ms: Option<f64>,
}

impl CaptureSession {
    /// Begin a fresh capture, discarding earlier scans.
    pub fn start(&mut self) {
        self.scans.clear();
        self.capturing = true;
        self.paused = false;
        self.last_saved_ms = None;
        tracing::info!("capture started");
    }

    pub fn toggle_pause(&mut self) {
        if self.capturing {
            self.paused = !self.paused;
        }
    }

    /// End the capture. Returns `true` when there is something to export.
    pub fn stop(&mut self) -> bool {
        let was_capturing = self.capturing;
        self.capturing = false;
        self.paused = false;
        if was_capturing {
            tracing::info!(scans = self.scans.len(), "capture stopped");
        }
        was_capturing && !self.scans.is_empty()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    /// Append `z` when recording and at least `interval_ms` have passed
    /// since the last saved scan.
    pub fn offer(&mut self, z: &[f64], now_ms: f64, interval_ms: u64) -> bool {
        if !self.capturing || self.paused || z.is_empty() {
            return false;
        }
        if let Some(last) = self.last_saved_ms {
            if now_ms - last < interval_ms as f64 {
                return false;
            }
        }
        self.scans.push(Scan::new(now_ms, z.to_vec()));
        self.last_saved_ms = Some(now_ms);
        true
    }

    pub fn status_text(&self) -> String {
        let n = self.scans.len();
        if self.capturing && self.paused {
            format!("Paused ({n})")
        } else if self.capturing {
            format!("{n} lines...")
        } else if n > 0 {
            "Ready to download".to_string()
        } else {
            "Not capturing".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::client::SensorError;
    use std::sync::{Arc, Mutex};

    #[test]
    fn live_profile_is_zero_filled_and_shifted() {
        let z = normalize_live_profile(&[Some(3.0), None, Some(5.0), Some(f64::NAN)]);
        assert_eq!(z, vec![3.0, 0.0, 5.0, 0.0]);
        let z = normalize_live_profile(&[Some(3.0), Some(5.0)]);
        assert_eq!(z, vec![0.0, 2.0]);
        assert!(normalize_live_profile(&[]).is_empty());
    }

    #[test]
    fn capture_respects_interval_and_pause() {
        let mut session = CaptureSession::default();
        assert!(!session.offer(&[1.0], 0.0, 10));
        session.start();
        assert!(session.offer(&[1.0], 1000.0, 10));
        assert!(!session.offer(&[1.0], 1005.0, 10));
        assert!(session.offer(&[2.0], 1010.0, 10));
        assert_eq!(session.status_text(), "2 lines...");

        session.toggle_pause();
        assert!(!session.offer(&[3.0], 2000.0, 10));
        assert_eq!(session.status_text(), "Paused (2)");
        session.toggle_pause();

        assert!(session.stop());
        assert_eq!(session.status_text(), "Ready to download");
        assert_eq!(session.scans()[1], Scan::new(1010.0, vec![2.0]));
    }

    #[test]
    fn start_discards_previous_capture() {
        let mut session = CaptureSession::default();
        assert_eq!(session.status_text(), "Not capturing");
        session.start();
        session.offer(&[1.0], 1.0, 0);
        session.stop();
        session.start();
        assert!(session.scans().is_empty());
        assert!(!session.stop());
    }

    struct FakeSensor {
        connected: Arc<Mutex<bool>>,
    }

    impl SensorApi for FakeSensor {
        fn status(&self) -> Result<SensorStatus, SensorError> {
            Ok(SensorStatus {
                connected: *self.connected.lock().unwrap(),
                ..SensorStatus::default()
            })
        }

        fn profile(&self) -> Result<Vec<Option<f64>>, SensorError> {
            Ok(vec![Some(2.0), None, Some(4.0)])
        }

        fn connect(&self) -> Result<bool, SensorError> {
            *self.connected.lock().unwrap() = true;
            Ok(true)
        }

        fn disconnect(&self) -> Result<(), SensorError> {
            *self.connected.lock().unwrap() = false;
            Ok(())
        }

        fn set_sensor(&self, _ip: &str, _port: u16) -> Result<(), SensorError> {
            Err(SensorError::Sensor("rejected".into()))
        }
    }

    fn wait_for(poller: &Poller, pred: impl Fn(&LiveUpdate) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if poller.drain().iter().any(&pred) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn poller_streams_profiles_after_connect() {
        let connected = Arc::new(Mutex::new(false));
        let poller = Poller::spawn(
            Box::new(FakeSensor { connected: connected.clone() }),
            Duration::from_millis(5),
        );
        assert!(wait_for(&poller, |u| matches!(u, LiveUpdate::Status(s) if !s.connected)));
        poller.send(PollerCommand::Connect);
        assert!(wait_for(&poller, |u| *u == LiveUpdate::Profile(vec![2.0, 0.0, 4.0])));
        poller.send(PollerCommand::SetSensor { ip: "1.2.3.4".into(), port: 1 });
        assert!(wait_for(&poller, |u| matches!(u, LiveUpdate::Error(_))));
        drop(poller);
        assert!(*connected.lock().unwrap());
    }
}
