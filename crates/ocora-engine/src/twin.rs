//! Digital-twin playback.
//!
//! A [`TwinSession`] holds the trajectory currently on display plus the
//! animation cursor; the [`AnimationDriver`] is a spawned interval task that
//! advances the cursor while playback is on and is aborted on drop, so a
//! discarded twin screen can never keep mutating a stale session.

use crate::events::{EventBus, SessionEvent};
use crate::gateway::RemoteGateway;
use ocora_core::{generate_trajectory, mock, Result, SimulationTrajectory, TwinSimulationStep};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Playback advance period
pub const ANIMATION_TICK: Duration = Duration::from_millis(500);

pub struct TwinSession {
    protocol: String,
    trajectory: SimulationTrajectory,
    cursor: usize,
    playing: bool,
    events: EventBus,
}

impl TwinSession {
    /// Start on the precomputed baseline trajectory.
    pub fn new(events: EventBus) -> Self {
        Self {
            protocol: mock::BASELINE_PROTOCOL.to_string(),
            trajectory: mock::baseline_trajectory(),
            cursor: 0,
            playing: false,
            events,
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn trajectory(&self) -> &SimulationTrajectory {
        &self.trajectory
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&TwinSimulationStep> {
        self.trajectory.get(self.cursor)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_playing(&mut self) {
        self.playing = !self.playing;
    }

    /// Advance the cursor one step while playing. At the last index playback
    /// pauses itself instead of advancing.
    pub fn tick(&mut self) -> usize {
        if self.playing {
            let last = self.trajectory.len().saturating_sub(1);
            if self.cursor >= last {
                self.playing = false;
            } else {
                self.cursor += 1;
            }
        }
        self.cursor
    }

    /// Rewind to the start; the playing flag is left alone.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Swap in a new trajectory. The cursor rewinds and playback stops so a
    /// stale cursor can never index past the new bounds.
    pub fn replace_trajectory(
        &mut self,
        protocol: impl Into<String>,
        trajectory: SimulationTrajectory,
    ) {
        self.protocol = protocol.into();
        self.trajectory = trajectory;
        self.cursor = 0;
        self.playing = false;
        self.events.publish(SessionEvent::TrajectoryReplaced {
            protocol: self.protocol.clone(),
            steps: self.trajectory.len(),
        });
    }
}

/// Fetch (or locally generate) the trajectory for a protocol and swap it
/// into the session.
///
/// Without a feature vector there is nothing the backend could personalize,
/// so the deterministic local generator is used directly.
pub async fn load_protocol(
    session: &Arc<Mutex<TwinSession>>,
    gateway: &RemoteGateway,
    protocol: &str,
    feature_vector: Option<&[f64]>,
) -> Result<()> {
    let trajectory = match feature_vector.filter(|v| !v.is_empty()) {
        Some(vector) => gateway.fetch_trajectory(protocol, vector).await?,
        None => generate_trajectory(protocol),
    };
    session.lock().replace_trajectory(protocol, trajectory);
    Ok(())
}

/// Interval task driving a session's playback. Aborted on drop.
pub struct AnimationDriver {
    handle: JoinHandle<()>,
}

impl AnimationDriver {
    pub fn spawn(session: Arc<Mutex<TwinSession>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                session.lock().tick();
            }
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
