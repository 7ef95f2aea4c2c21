use crate::error::CallError;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

pub const INITIAL_QUALITY: f64 = 85.0;
pub const MIN_QUALITY: f64 = 30.0;
pub const MAX_QUALITY: f64 = 100.0;
/// Largest per-tick quality swing, in either direction.
pub const QUALITY_JITTER: f64 = 5.0;
pub const DEFAULT_VOLUME: u8 = 80;
pub const MAX_VOLUME: u8 = 100;

/// Source of the per-tick quality delta.  Implementations must stay within
/// `[-QUALITY_JITTER, QUALITY_JITTER]`; the session clamps regardless.
pub trait QualityJitter: Send {
    fn next_delta(&mut self) -> f64;
}

/// Uniform jitter backed by a seedable RNG.
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl QualityJitter for RandomJitter {
    fn next_delta(&mut self) -> f64 {
        self.rng.gen_range(-QUALITY_JITTER..=QUALITY_JITTER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallState {
    Idle,
    Active,
    /// Active with the recorder running.
    ActiveRecording,
}

impl CallState {
    pub fn is_active(self) -> bool {
        !matches!(self, CallState::Idle)
    }

    pub fn label(self) -> &'static str {
        match self {
            CallState::Idle => "idle",
            CallState::Active => "active",
            CallState::ActiveRecording => "active and recording",
        }
    }
}

/// Simulated call against a single profile.  Recording is folded into the state so it can
/// never be on while the call is idle.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSession {
    profile_id: Uuid,
    state: CallState,
    duration_seconds: u32,
    quality: f64,
    muted: bool,
    volume: u8,
}

impl CallSession {
    pub fn new(profile_id: Uuid) -> Self {
        Self {
            profile_id,
            state: CallState::Idle,
            duration_seconds: 0,
            quality: INITIAL_QUALITY,
            muted: false,
            volume: DEFAULT_VOLUME,
        }
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile_id
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_recording(&self) -> bool {
        self.state == CallState::ActiveRecording
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn quality(&self) -> f64 {
        self.quality
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    fn require_active(&self, operation: &'static str) -> Result<(), CallError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CallError::InvalidState {
                operation,
                state: self.state.label(),
            })
        }
    }

    /// Start the call with recording on.  Returns `false`, changing nothing, if already active.
    pub fn start_call(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = CallState::ActiveRecording;
        self.duration_seconds = 0;
        self.quality = INITIAL_QUALITY;
        true
    }

    /// End the call, stopping any recording.  Returns `false` if the call was already idle.
    pub fn end_call(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = CallState::Idle;
        self.duration_seconds = 0;
        self.muted = false;
        was_active
    }

    /// Flip the recorder; returns the new recording flag.
    pub fn toggle_recording(&mut self) -> Result<bool, CallError> {
        self.require_active("toggle recording")?;
        self.state = match self.state {
            CallState::ActiveRecording => CallState::Active,
            _ => CallState::ActiveRecording,
        };
        Ok(self.is_recording())
    }

    pub fn toggle_mute(&mut self) -> Result<bool, CallError> {
        self.require_active("toggle mute")?;
        self.muted = !self.muted;
        Ok(self.muted)
    }

    /// Set the volume, clamped to `0..=100`.  Returns the applied value.
    pub fn set_volume(&mut self, volume: i64) -> Result<u8, CallError> {
        self.require_active("set volume")?;
        self.volume = volume.clamp(0, i64::from(MAX_VOLUME)) as u8;
        Ok(self.volume)
    }

    /// Advance one second and perturb the quality.  A no-op returning `false` while idle.
    pub fn tick(&mut self, jitter: &mut dyn QualityJitter) -> bool {
        if !self.is_active() {
            return false;
        }
        self.duration_seconds += 1;
        self.quality = (self.quality + jitter.next_delta()).clamp(MIN_QUALITY, MAX_QUALITY);
        true
    }
}

/// `MM:SS`, zero padded.
pub fn format_duration(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Read-only view of a session as served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub profile_id: Uuid,
    pub state: CallState,
    pub active: bool,
    pub duration_seconds: u32,
    pub duration: String,
    pub quality: f64,
    pub recording: bool,
    pub muted: bool,
    pub volume: u8,
}

impl From<&CallSession> for SessionSnapshot {
    fn from(session: &CallSession) -> Self {
        Self {
            profile_id: session.profile_id(),
            state: session.state(),
            active: session.is_active(),
            duration_seconds: session.duration_seconds(),
            duration: format_duration(session.duration_seconds()),
            quality: session.quality(),
            recording: session.is_recording(),
            muted: session.is_muted(),
            volume: session.volume(),
        }
    }
}
