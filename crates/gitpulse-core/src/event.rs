//! Decoded feed records and the push-commit filter/mapper.

use serde::Deserialize;

use crate::fingerprint::AuthorFingerprint;

/// Event kind carried by push events in the feed.
pub const PUSH_EVENT: &str = "PushEvent";

/// One decoded feed record.
///
/// Only the fields the pipeline consumes are modelled; unknown fields in
/// the feed are ignored by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    /// The event kind, e.g. `PushEvent`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The repository the event targets.
    pub repo: EventRepo,
    /// Kind-specific payload; commits are present on push events only.
    #[serde(default)]
    pub payload: EventPayload,
}

/// Repository reference carried by a feed event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRepo {
    /// Full repository name, `owner/repo`.
    pub name: String,
}

/// Kind-specific event payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    /// Commit descriptors of a push event; empty for other kinds.
    #[serde(default)]
    pub commits: Vec<EventCommit>,
}

/// One commit descriptor inside a push event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventCommit {
    /// The commit sha.
    pub sha: String,
    /// True when the commit was newly introduced by this push rather than
    /// replayed from an earlier one.
    #[serde(default)]
    pub distinct: bool,
    /// The commit author.
    pub author: CommitAuthor,
}

/// Author of a commit descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    /// The author email as recorded in the commit.
    pub email: String,
}

/// One unit of commit activity extracted from a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full repository name, `owner/repo`.
    pub repository: String,
    /// Pseudonymized commit author.
    pub author: AuthorFingerprint,
    /// Contribution weight; always 1 at extraction time.
    pub weight: u64,
}

/// Extracts commit records from a decoded event.
///
/// Non-push events and non-distinct commits yield nothing. Output order
/// carries no meaning downstream.
#[must_use]
pub fn commit_records(event: &RawEvent) -> Vec<CommitRecord> {
    if event.kind != PUSH_EVENT {
        return Vec::new();
    }
    event
        .payload
        .commits
        .iter()
        .filter(|commit| commit.distinct)
        .map(|commit| CommitRecord {
            repository: event.repo.name.clone(),
            author: AuthorFingerprint::from_email(&commit.author.email),
            weight: 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_event(repo: &str, commits: &[(&str, bool, &str)]) -> RawEvent {
        RawEvent {
            kind: PUSH_EVENT.to_string(),
            repo: EventRepo {
                name: repo.to_string(),
            },
            payload: EventPayload {
                commits: commits
                    .iter()
                    .map(|(sha, distinct, email)| EventCommit {
                        sha: (*sha).to_string(),
                        distinct: *distinct,
                        author: CommitAuthor {
                            email: (*email).to_string(),
                        },
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn non_push_events_yield_nothing() {
        let mut event = push_event("a/b", &[("c1", true, "x@example.com")]);
        event.kind = "WatchEvent".to_string();
        assert!(commit_records(&event).is_empty());
    }

    #[test]
    fn non_distinct_commits_never_yield_records() {
        let event = push_event(
            "a/b",
            &[("c1", true, "x@example.com"), ("c2", false, "y@example.com")],
        );
        let records = commit_records(&event);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author, AuthorFingerprint::from_email("x@example.com"));
        assert_eq!(records[0].weight, 1);
    }

    #[test]
    fn records_carry_the_event_repository() {
        let event = push_event("rust-lang/rust", &[("c1", true, "x@example.com")]);
        assert_eq!(commit_records(&event)[0].repository, "rust-lang/rust");
    }

    #[test]
    fn feed_record_deserializes_with_unknown_fields() {
        let raw = r#"{
            "id": "123",
            "type": "PushEvent",
            "actor": {"login": "x"},
            "repo": {"id": 7, "name": "a/b", "url": "https://example.com"},
            "payload": {
                "push_id": 9,
                "commits": [
                    {"sha": "c1", "distinct": true, "message": "m",
                     "author": {"name": "X", "email": "x@example.com"}}
                ]
            }
        }"#;
        let event: RawEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.repo.name, "a/b");
        assert_eq!(commit_records(&event).len(), 1);
    }

    #[test]
    fn non_push_payload_without_commits_deserializes() {
        let raw = r#"{"type": "ForkEvent", "repo": {"name": "a/b"}, "payload": {}}"#;
        let event: RawEvent = serde_json::from_str(raw).unwrap();
        assert!(event.payload.commits.is_empty());
    }
}
