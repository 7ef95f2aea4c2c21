use crate::utils::{display_time, now_local};

use serde::Serialize;
use std::collections::VecDeque;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLogEntry {
    pub id: u64,
    pub profile_id: Uuid,
    pub message: String,
    /// Wall-clock time of creation, formatted for display.
    pub time: String,
}

/// Append-only journal of call events for every profile, newest first.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: VecDeque<StatusLogEntry>,
    next_id: u64,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, profile_id: Uuid, message: impl Into<String>) -> &StatusLogEntry {
        self.append_at(profile_id, message, now_local())
    }

    pub fn append_at(
        &mut self,
        profile_id: Uuid,
        message: impl Into<String>,
        at: OffsetDateTime,
    ) -> &StatusLogEntry {
        self.next_id += 1;
        self.entries.push_front(StatusLogEntry {
            id: self.next_id,
            profile_id,
            message: message.into(),
            time: display_time(at),
        });
        &self.entries[0]
    }

    /// Entries for one profile, newest first.  The iterator is cloneable, so it can be
    /// walked more than once.
    pub fn entries_for(
        &self,
        profile_id: Uuid,
    ) -> impl Iterator<Item = &StatusLogEntry> + Clone + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.profile_id == profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_append_puts_newest_first() {
        let mut log = StatusLog::new();
        let profile = Uuid::new_v4();
        let first = log.append(profile, "Profile selected: John Doe").id;
        let second = log.append(profile, "Call started with automatic recording").id;
        assert!(second > first);

        let messages: Vec<_> = log.entries_for(profile).map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            ["Call started with automatic recording", "Profile selected: John Doe"]
        );
    }

    #[test]
    fn test_entries_are_scoped_by_profile() {
        let mut log = StatusLog::new();
        let p = Uuid::new_v4();
        let q = Uuid::new_v4();
        log.append(q, "Profile selected: Sarah Wilson");
        log.append(p, "Profile selected: John Doe");

        let for_q: Vec<_> = log.entries_for(q).cloned().collect();
        log.append(p, "Call started with automatic recording");

        assert_eq!(log.entries_for(q).cloned().collect::<Vec<_>>(), for_q);
        assert_eq!(
            log.entries_for(p).next().map(|e| e.message.as_str()),
            Some("Call started with automatic recording")
        );
        assert_eq!(log.entries_for(Uuid::new_v4()).count(), 0);
        assert_eq!(log.entries.len(), 3);
    }

    #[test]
    fn test_entries_view_is_restartable() {
        let mut log = StatusLog::new();
        let profile = Uuid::new_v4();
        log.append(profile, "Recording stopped manually");
        log.append(profile, "Recording started manually");

        let view = log.entries_for(profile);
        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.count(), 2);
    }

    #[test]
    fn test_entry_time_format() {
        let mut log = StatusLog::new();
        let entry = log.append_at(Uuid::new_v4(), "Call ended", datetime!(2024-03-01 14:05:09 UTC));
        assert_eq!(entry.time, "2:05:09 PM");
    }
}
