//! # Resume Chain
//!
//! Strict priority between the three places a session can come from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::ResponseMap;

use super::snapshot::{RemoteSession, SessionSnapshot};

/// Where a resumed session came from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    /// Remote session named by an explicit resume identifier.
    ResumeId(String),
    /// Remote session associated with the token.
    Token,
    /// Local snapshot.
    Local,
}

/// Session state to load, replacing all local state.
#[derive(Clone, Debug, PartialEq)]
pub struct ResumedSession {
    /// Winning source.
    pub source: ResumeSource,
    /// Answers.
    pub responses: ResponseMap,
    /// Page index.
    pub current_page: usize,
    /// When the winning copy was saved.
    pub saved_at: Option<DateTime<Utc>>,
}

impl ResumedSession {
    /// From a remote session.
    pub fn from_remote(source: ResumeSource, session: RemoteSession) -> Self {
        Self {
            source,
            responses: session.responses,
            current_page: session.current_page,
            saved_at: session.updated_at,
        }
    }

    /// From the local snapshot.
    pub fn from_local(snapshot: SessionSnapshot) -> Self {
        Self {
            source: ResumeSource::Local,
            responses: snapshot.responses,
            current_page: snapshot.current_page,
            saved_at: Some(snapshot.saved_at),
        }
    }
}

/// Usable remote candidate: still in progress and saved for `form_id`.
pub fn accept_remote(session: Option<RemoteSession>, form_id: &str) -> Option<RemoteSession> {
    session.filter(|s| s.is_resumable() && s.belongs_to(form_id))
}

/// Usable local candidate: a snapshot with at least one answer.
pub fn accept_local(snapshot: Option<SessionSnapshot>) -> Option<SessionSnapshot> {
    snapshot.filter(|s| !s.responses.is_empty())
}

/// Pick the winner among already-fetched candidates, highest priority
/// first. Timestamps are never compared.
pub fn choose(
    by_resume_id: Option<(String, RemoteSession)>,
    by_token: Option<RemoteSession>,
    local: Option<SessionSnapshot>,
) -> Option<ResumedSession> {
    if let Some((id, session)) = by_resume_id {
        return Some(ResumedSession::from_remote(ResumeSource::ResumeId(id), session));
    }
    if let Some(session) = by_token {
        return Some(ResumedSession::from_remote(ResumeSource::Token, session));
    }
    local.map(ResumedSession::from_local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn remote(page: usize, updated: DateTime<Utc>) -> RemoteSession {
        let mut responses = ResponseMap::new();
        responses.insert("q1".into(), json!("remote"));
        RemoteSession {
            id: Some("s1".into()),
            form_id: "f1".into(),
            token: Some("t1".into()),
            responses,
            current_page: page,
            status: Default::default(),
            updated_at: Some(updated),
        }
    }

    fn local(page: usize, saved: DateTime<Utc>) -> SessionSnapshot {
        let mut responses = ResponseMap::new();
        responses.insert("q1".into(), json!("local"));
        SessionSnapshot {
            responses,
            current_page: page,
            saved_at: saved,
        }
    }

    #[test]
    fn test_priority_beats_recency() {
        let now = Utc::now();
        let resumed = choose(
            Some(("s1".into(), remote(2, now - Duration::hours(5)))),
            None,
            Some(local(4, now)),
        )
        .unwrap();
        assert_eq!(resumed.source, ResumeSource::ResumeId("s1".into()));
        assert_eq!(resumed.current_page, 2);
        assert_eq!(resumed.responses["q1"], json!("remote"));
    }

    #[test]
    fn test_token_session_beats_local() {
        let now = Utc::now();
        let resumed = choose(None, Some(remote(1, now)), Some(local(3, now))).unwrap();
        assert_eq!(resumed.source, ResumeSource::Token);
    }

    #[test]
    fn test_local_fallback_and_fresh() {
        let resumed = choose(None, None, Some(local(3, Utc::now()))).unwrap();
        assert_eq!(resumed.source, ResumeSource::Local);
        assert!(choose(None, None, None).is_none());
    }

    #[test]
    fn test_empty_local_snapshot_is_ignored() {
        let empty = SessionSnapshot {
            responses: ResponseMap::new(),
            current_page: 1,
            saved_at: Utc::now(),
        };
        assert!(accept_local(Some(empty)).is_none());
    }

    #[test]
    fn test_completed_remote_is_ignored() {
        let mut done = remote(1, Utc::now());
        done.status = crate::domain::SessionStatus::Completed;
        assert!(accept_remote(Some(done), "f1").is_none());
    }

    #[test]
    fn test_remote_for_other_form_is_ignored() {
        assert!(accept_remote(Some(remote(1, Utc::now())), "f1").is_some());
        assert!(accept_remote(Some(remote(1, Utc::now())), "f2").is_none());

        let mut unnamed = remote(1, Utc::now());
        unnamed.form_id.clear();
        assert!(accept_remote(Some(unnamed), "f1").is_none());
    }
}
