use crate::call_session::{CallSession, QualityJitter, SessionSnapshot};
use crate::error::CallError;
use crate::profile_types::Profile;
use crate::status_log::{StatusLog, StatusLogEntry};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use uuid::Uuid;

pub const CALL_STARTED: &str = "Call started with automatic recording";
pub const CALL_ENDED: &str = "Call ended and recording stopped";
pub const RECORDING_STARTED: &str = "Recording started manually";
pub const RECORDING_STOPPED: &str = "Recording stopped manually";

/// Handed out when a call starts: the ticker driving that call runs until `cancel` fires or the
/// desk stops accepting ticks for `epoch`.
#[derive(Debug, Clone)]
pub struct TickerLease {
    pub epoch: u64,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
pub struct CallStart {
    pub snapshot: SessionSnapshot,
    /// `None` when the call was already running; no second ticker may be spawned.
    pub lease: Option<TickerLease>,
}

/// The call desk: the selected profile's session, the status log every session writes to, and
/// bookkeeping for the single ticker that may drive the active call.
pub struct CallDesk {
    session: Option<CallSession>,
    log: StatusLog,
    jitter: Box<dyn QualityJitter>,
    /// Bumped every time a call starts or stops; ticks carrying a stale epoch are ignored
    epoch: u64,
    ticker: Option<CancellationToken>,
    snapshots: watch::Sender<Option<SessionSnapshot>>,
}

impl CallDesk {
    pub fn new(jitter: Box<dyn QualityJitter>) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            session: None,
            log: StatusLog::new(),
            jitter,
            epoch: 0,
            ticker: None,
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(SessionSnapshot::from)
    }

    pub fn selected_profile_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(CallSession::profile_id)
    }

    pub fn entries_for(&self, profile_id: Uuid) -> Vec<StatusLogEntry> {
        self.log.entries_for(profile_id).cloned().collect()
    }

    fn publish(&self, snapshot: SessionSnapshot) -> SessionSnapshot {
        self.snapshots.send_replace(Some(snapshot.clone()));
        snapshot
    }

    fn session_mut(&mut self) -> Result<&mut CallSession, CallError> {
        self.session.as_mut().ok_or(CallError::NoProfileSelected)
    }

    fn stop_ticker(&mut self) {
        self.epoch += 1;
        if let Some(cancel) = self.ticker.take() {
            cancel.cancel();
        }
    }

    /// Replace the current session with a fresh one for `profile`.  Earlier log entries are kept
    /// and stay reachable through `entries_for`.
    pub fn select_profile(&mut self, profile: &Profile) -> SessionSnapshot {
        self.stop_ticker();
        let session = CallSession::new(profile.id);
        let snapshot = SessionSnapshot::from(&session);
        self.session = Some(session);
        self.log
            .append(profile.id, format!("Profile selected: {}", profile.name));
        info!(profile_id=%profile.id, name=%profile.name, "profile selected");
        self.publish(snapshot)
    }

    pub fn start_call(&mut self) -> Result<CallStart, CallError> {
        let session = self.session_mut()?;
        if !session.start_call() {
            debug!(profile_id=%session.profile_id(), "call already active");
            return Ok(CallStart {
                snapshot: SessionSnapshot::from(&*session),
                lease: None,
            });
        }
        let profile_id = session.profile_id();
        let snapshot = SessionSnapshot::from(&*session);
        self.log.append(profile_id, CALL_STARTED);

        self.stop_ticker();
        let cancel = CancellationToken::new();
        self.ticker = Some(cancel.clone());
        info!(profile_id=%profile_id, epoch=self.epoch, "call started");

        Ok(CallStart {
            snapshot: self.publish(snapshot),
            lease: Some(TickerLease {
                epoch: self.epoch,
                cancel,
            }),
        })
    }

    pub fn end_call(&mut self) -> Result<SessionSnapshot, CallError> {
        let session = self.session_mut()?;
        let duration = session.duration_seconds();
        if !session.end_call() {
            debug!(profile_id=%session.profile_id(), "call already idle");
            return Ok(SessionSnapshot::from(&*session));
        }
        let profile_id = session.profile_id();
        let snapshot = SessionSnapshot::from(&*session);
        self.stop_ticker();
        self.log.append(profile_id, CALL_ENDED);
        info!(profile_id=%profile_id, duration, "call ended");
        Ok(self.publish(snapshot))
    }

    pub fn toggle_recording(&mut self) -> Result<SessionSnapshot, CallError> {
        let session = self.session_mut()?;
        let recording = session.toggle_recording()?;
        let profile_id = session.profile_id();
        let snapshot = SessionSnapshot::from(&*session);
        let message = if recording {
            RECORDING_STARTED
        } else {
            RECORDING_STOPPED
        };
        self.log.append(profile_id, message);
        info!(profile_id=%profile_id, recording, "recording toggled");
        Ok(self.publish(snapshot))
    }

    pub fn toggle_mute(&mut self) -> Result<SessionSnapshot, CallError> {
        let session = self.session_mut()?;
        let muted = session.toggle_mute()?;
        let snapshot = SessionSnapshot::from(&*session);
        debug!(muted, "mute toggled");
        Ok(self.publish(snapshot))
    }

    pub fn set_volume(&mut self, volume: i64) -> Result<SessionSnapshot, CallError> {
        let session = self.session_mut()?;
        let volume = session.set_volume(volume)?;
        let snapshot = SessionSnapshot::from(&*session);
        debug!(volume, "volume set");
        Ok(self.publish(snapshot))
    }

    /// Apply one tick on behalf of the ticker holding `epoch`.  Returns `false` once that ticker
    /// should stop.
    pub fn tick(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.tick(&mut *self.jitter) {
            return false;
        }
        trace!(
            profile_id=%session.profile_id(),
            duration=session.duration_seconds(),
            quality=session.quality(),
            "tick"
        );
        let snapshot = SessionSnapshot::from(&*session);
        self.publish(snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_session::tests::ScriptedJitter;
    use crate::call_session::CallState;
    use crate::profile_types::NewProfile;

    fn profile(name: &str) -> Profile {
        NewProfile {
            name: name.to_string(),
            age: Some(30),
            ..Default::default()
        }
        .into_profile()
        .unwrap()
    }

    fn desk() -> CallDesk {
        CallDesk::new(Box::new(ScriptedJitter::new(&[])))
    }

    fn head(desk: &CallDesk, profile_id: Uuid) -> Option<String> {
        desk.entries_for(profile_id)
            .first()
            .map(|e| e.message.clone())
    }

    #[test]
    fn test_call_scenario() {
        let mut desk = desk();
        let a = profile("A");
        desk.select_profile(&a);
        assert_eq!(head(&desk, a.id).as_deref(), Some("Profile selected: A"));

        let start = desk.start_call().unwrap();
        let lease = start.lease.unwrap();
        assert!(start.snapshot.recording);
        assert_eq!(head(&desk, a.id).as_deref(), Some(CALL_STARTED));

        for _ in 0..3 {
            assert!(desk.tick(lease.epoch));
        }
        assert_eq!(desk.snapshot().unwrap().duration_seconds, 3);

        let ended = desk.end_call().unwrap();
        assert_eq!(ended.duration_seconds, 0);
        assert!(!ended.recording);
        assert_eq!(head(&desk, a.id).as_deref(), Some(CALL_ENDED));
        assert!(lease.cancel.is_cancelled());
        assert!(!desk.tick(lease.epoch));
    }

    #[test]
    fn test_restart_while_active_issues_no_lease() {
        let mut desk = desk();
        let a = profile("A");
        desk.select_profile(&a);
        let first = desk.start_call().unwrap();
        assert!(first.lease.is_some());

        let again = desk.start_call().unwrap();
        assert!(again.lease.is_none());
        assert_eq!(desk.entries_for(a.id).len(), 2);
    }

    #[test]
    fn test_toggle_recording_twice() {
        let mut desk = desk();
        let a = profile("A");
        desk.select_profile(&a);
        desk.start_call().unwrap();
        let before = desk.entries_for(a.id).len();

        assert!(!desk.toggle_recording().unwrap().recording);
        assert!(desk.toggle_recording().unwrap().recording);

        let entries = desk.entries_for(a.id);
        assert_eq!(entries.len(), before + 2);
        assert_eq!(entries[0].message, RECORDING_STARTED);
        assert_eq!(entries[1].message, RECORDING_STOPPED);
    }

    #[test]
    fn test_idle_operations_rejected() {
        let mut desk = desk();
        assert_eq!(desk.start_call().unwrap_err(), CallError::NoProfileSelected);

        let a = profile("A");
        desk.select_profile(&a);
        let before = desk.snapshot();
        assert!(matches!(
            desk.toggle_mute(),
            Err(CallError::InvalidState { .. })
        ));
        assert!(desk.set_volume(5).is_err());
        assert!(desk.toggle_recording().is_err());
        assert_eq!(desk.snapshot(), before);
        assert_eq!(desk.entries_for(a.id).len(), 1);

        // ending an idle call is a quiet no-op
        assert!(desk.end_call().is_ok());
        assert_eq!(desk.entries_for(a.id).len(), 1);
    }

    #[test]
    fn test_switching_profiles_keeps_history() {
        let mut desk = desk();
        let a = profile("A");
        let b = profile("B");
        desk.select_profile(&a);
        let lease = desk.start_call().unwrap().lease.unwrap();
        desk.tick(lease.epoch);

        let snapshot = desk.select_profile(&b);
        assert_eq!(snapshot.state, CallState::Idle);
        assert_eq!(snapshot.duration_seconds, 0);
        assert_eq!(snapshot.quality, 85.0);
        assert!(lease.cancel.is_cancelled());
        assert!(!desk.tick(lease.epoch));

        assert_eq!(desk.entries_for(a.id).len(), 2);
        assert_eq!(head(&desk, b.id).as_deref(), Some("Profile selected: B"));
        assert_eq!(desk.selected_profile_id(), Some(b.id));
    }

    #[test]
    fn test_subscribers_see_updates() {
        let mut desk = desk();
        let updates = desk.subscribe();
        assert!(updates.borrow().is_none());

        desk.select_profile(&profile("A"));
        desk.start_call().unwrap();
        desk.set_volume(30).unwrap();
        let latest = updates.borrow().clone().unwrap();
        assert_eq!(latest.volume, 30);
        assert!(latest.active);
    }
}
