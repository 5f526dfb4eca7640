use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use tokio::{sync::broadcast, sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::DetectionConfig,
    detection::{risk, DebounceCounter, RiskTier, SignalSampler, ThreadRngSampler, ViolationRecorder},
    media::{MediaConstraints, MediaError, MediaGateway, MediaStream, SimulatedGateway},
    models::{MonitorStatus, Session, SessionStats, Violation},
    store::{DashboardRecord, DashboardStore},
};

use super::{
    clock::SessionClock,
    events::{EventBus, ProctorEvent},
    loop_worker::detection_loop,
};

/// Everything the tick handler mutates, confined behind one mutex so the
/// detection task and the start/stop transitions are serialized.
pub(crate) struct MonitorState {
    pub(crate) session: Session,
    pub(crate) clock: SessionClock,
    pub(crate) counters: Vec<DebounceCounter>,
}

impl MonitorState {
    pub(crate) fn new(config: &DetectionConfig) -> Self {
        Self {
            session: Session::new(),
            clock: SessionClock::new(),
            counters: build_counters(config),
        }
    }

    pub(crate) fn begin(&mut self, id: String, demo_mode: bool) {
        let started_at = Utc::now();
        self.session.begin(id, started_at, demo_mode);
        self.clock.start(started_at);
        for counter in &mut self.counters {
            counter.reset();
        }
    }
}

fn build_counters(config: &DetectionConfig) -> Vec<DebounceCounter> {
    config
        .profiles
        .iter()
        .cloned()
        .map(|profile| DebounceCounter::new(profile, config.escalation_cap_minutes))
        .collect()
}

/// Held only so dropping it releases both devices.
#[allow(dead_code)]
struct AcquiredMedia {
    camera: MediaStream,
    microphone: MediaStream,
}

struct LoopHandle {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Point-in-time dashboard payload, recomputed on every read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub status: MonitorStatus,
    pub demo_mode: bool,
    pub stats: SessionStats,
    pub risk_tier: RiskTier,
    pub attention_score: u32,
    pub elapsed: String,
    pub suspicious: bool,
}

/// Final numbers handed out when a session stops.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub duration: String,
    pub total_violations: u32,
}

/// Owns the Idle → Monitoring → Idle state machine: spawns and cancels the
/// detection tick task, performs the single media-acquisition attempt, and
/// persists the dashboard record.
pub struct ProctorController {
    state: Arc<Mutex<MonitorState>>,
    store: Arc<DashboardStore>,
    media: Arc<dyn MediaGateway>,
    sampler: Arc<dyn SignalSampler>,
    recorder: ViolationRecorder,
    config: DetectionConfig,
    constraints: MediaConstraints,
    events: EventBus,
    ticker: Mutex<Option<LoopHandle>>,
    streams: Mutex<Option<AcquiredMedia>>,
}

impl ProctorController {
    pub fn new(
        store: Arc<DashboardStore>,
        media: Arc<dyn MediaGateway>,
        sampler: Arc<dyn SignalSampler>,
        config: DetectionConfig,
    ) -> Self {
        let recorder = ViolationRecorder::new(config.medium_alert_probability);
        Self {
            state: Arc::new(Mutex::new(MonitorState::new(&config))),
            store,
            media,
            sampler,
            recorder,
            config,
            constraints: MediaConstraints::default(),
            events: EventBus::default(),
            ticker: Mutex::new(None),
            streams: Mutex::new(None),
        }
    }

    /// Controller wired for environments without capture devices: every
    /// session runs in demo mode on random sampling.
    pub fn simulated(store: Arc<DashboardStore>) -> Self {
        Self::new(
            store,
            Arc::new(SimulatedGateway),
            Arc::new(ThreadRngSampler),
            DetectionConfig::default(),
        )
    }

    /// Idle → Monitoring. A no-op while already Monitoring.
    ///
    /// Resets the session, stats, counters and clock, makes the one media
    /// acquisition attempt (failure flips the run to demo mode permanently),
    /// then opens the recurring detection tick.
    pub async fn start_exam(&self) -> Result<()> {
        {
            let state = self.state.lock().await;
            if state.session.is_monitoring() {
                warn!("start_exam ignored: session already monitoring");
                return Ok(());
            }
        }

        let acquired = match self.acquire_media() {
            Ok(media) => Some(media),
            Err(err) => {
                warn!("media acquisition failed: {err}; falling back to simulated sampling");
                self.events.emit(ProctorEvent::Notice {
                    message: format!("{err}. Running in simulation mode."),
                });
                None
            }
        };
        let demo_mode = acquired.is_none();

        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            // Re-check under the lock: a concurrent start may have won the
            // race while media was being acquired. Returning here drops any
            // devices this attempt grabbed.
            if state.session.is_monitoring() {
                warn!("start_exam ignored: session already monitoring");
                return Ok(());
            }
            state.begin(session_id.clone(), demo_mode);
        }

        if let Err(err) = self.persist(true).await {
            // Back out to Idle and release any devices before surfacing.
            let mut state = self.state.lock().await;
            state.clock.stop();
            state.session.end();
            drop(state);
            drop(acquired);
            return Err(err);
        }

        *self.streams.lock().await = acquired;
        self.spawn_ticker().await;

        info!("proctoring started (session {session_id}, demo_mode={demo_mode})");
        self.events.emit(ProctorEvent::StateChanged {
            status: MonitorStatus::Monitoring,
            demo_mode,
        });
        Ok(())
    }

    /// Monitoring → Idle. Cancels the tick task before returning, releases
    /// acquired media, freezes the clock and persists the final record. The
    /// session's violations and stats stay readable until the next start.
    pub async fn stop_exam(&self) -> Result<SessionSummary> {
        let (summary, demo_mode) = {
            let mut state = self.state.lock().await;
            if !state.session.is_monitoring() {
                return Err(anyhow!("no active session to stop"));
            }
            state.clock.stop();
            state.session.end();
            (
                SessionSummary {
                    duration: state.clock.format_elapsed(),
                    total_violations: state.session.stats.total_violations,
                },
                state.session.demo_mode,
            )
        };

        self.cancel_ticker().await;

        if self.streams.lock().await.take().is_some() {
            info!("released media streams");
        }

        self.persist(false).await?;

        info!(
            "proctoring stopped: duration {}, {} violations",
            summary.duration, summary.total_violations
        );
        self.events.emit(ProctorEvent::StateChanged {
            status: MonitorStatus::Idle,
            demo_mode,
        });
        self.events.emit(ProctorEvent::SessionSummary {
            duration: summary.duration.clone(),
            total_violations: summary.total_violations,
        });
        Ok(summary)
    }

    pub async fn dashboard(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        snapshot_of(&state, &self.config)
    }

    /// Latest `n` violations, most recent first.
    pub async fn recent_alerts(&self, n: usize) -> Vec<Violation> {
        self.state.lock().await.session.recent_violations(n)
    }

    pub async fn session(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProctorEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// One attempt per device, no retries. The camera handle is dropped (and
    /// the device released) if the microphone request fails.
    fn acquire_media(&self) -> Result<AcquiredMedia, MediaError> {
        let camera = self.media.request_camera(&self.constraints)?;
        let microphone = self.media.request_microphone(&self.constraints)?;
        Ok(AcquiredMedia { camera, microphone })
    }

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        // Start transitions are serialized by the Monitoring guard, so the
        // previous loop is always cancelled and joined before we get here.
        debug_assert!(guard.is_none(), "detection loop already running");

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(detection_loop(
            self.state.clone(),
            self.sampler.clone(),
            self.recorder.clone(),
            self.config.clone(),
            self.events.clone(),
            self.store.clone(),
            cancel.clone(),
        ));
        *guard = Some(LoopHandle { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        let taken = self.ticker.lock().await.take();
        if let Some(LoopHandle { handle, cancel }) = taken {
            cancel.cancel();
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    error!("detection loop task failed to join: {err}");
                }
            }
        }
    }

    async fn persist(&self, active: bool) -> Result<()> {
        let state = self.state.lock().await;
        self.store.save(record_from(&state, active))
    }
}

pub(crate) fn record_from(state: &MonitorState, active: bool) -> DashboardRecord {
    DashboardRecord {
        violations: state.session.violations.clone(),
        stats: state.session.stats.clone(),
        exam_start_time: state.clock.started_at(),
        active,
    }
}

pub(crate) fn snapshot_of(state: &MonitorState, config: &DetectionConfig) -> DashboardSnapshot {
    DashboardSnapshot {
        status: state.session.status,
        demo_mode: state.session.demo_mode,
        risk_tier: risk::risk_tier(&state.session.stats, config),
        attention_score: risk::attention_score(&state.session.stats, config),
        elapsed: state.clock.format_elapsed(),
        suspicious: state.session.suspicious(),
        stats: state.session.stats.clone(),
    }
}
