//! Shard retrieval and strict decode.
//!
//! A shard is one gzip-compressed stream of newline-delimited JSON event
//! records. The fetcher downloads the body, then decodes it lazily, one
//! record per line. Decoding is strict: the shard is consumed as a unit,
//! and a single malformed line (or a truncated gzip stream) invalidates
//! the whole shard rather than being skipped. The fetcher never retries;
//! retry happens only at whole-cycle granularity.

use std::io::{BufRead, BufReader, Cursor, Lines};
use std::time::Duration;

use bytes::Bytes;
use flate2::read::GzDecoder;
use metrics::counter;

use gitpulse_core::{RawEvent, ShardId};

use crate::error::{Error, Result};
use crate::metrics::names;

/// The public event feed host.
pub const DEFAULT_FEED_BASE_URL: &str = "https://data.githubarchive.org";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves and decodes hour-bucketed shards from the event feed.
///
/// Cheap to clone; the underlying HTTP client is shared.
#[derive(Debug, Clone)]
pub struct ShardFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl ShardFetcher {
    /// Creates a fetcher against the given feed base URL.
    ///
    /// No overall request timeout is set: shard bodies run to tens of
    /// megabytes and download time varies with the hour's activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|source| Error::Client { source })?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    /// Fetches one shard and returns its lazily decoded event sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] when the feed is unreachable, the body
    /// cannot be read, or the response status is not a success.
    pub async fn fetch(&self, shard: ShardId) -> Result<ShardEvents> {
        let url = format!("{}{}", self.base_url, shard.path());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| Error::fetch_with_source(shard, "request failed", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(shard, format!("feed returned status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Error::fetch_with_source(shard, "failed to read body", err))?;

        tracing::debug!(shard = %shard, bytes = body.len(), "fetched shard");
        counter!(names::SHARDS_FETCHED_TOTAL).increment(1);

        Ok(ShardEvents::new(shard, body))
    }
}

/// A lazy, finite, non-restartable sequence of decoded events.
///
/// Yields `Ok(RawEvent)` per well-formed line. The first decode failure
/// yields `Err` once and fuses the iterator; callers must treat the shard
/// as invalid at that point.
pub struct ShardEvents {
    shard: ShardId,
    lines: Lines<BufReader<GzDecoder<Cursor<Bytes>>>>,
    line: usize,
    poisoned: bool,
}

impl ShardEvents {
    pub(crate) fn new(shard: ShardId, body: Bytes) -> Self {
        Self {
            shard,
            lines: BufReader::new(GzDecoder::new(Cursor::new(body))).lines(),
            line: 0,
            poisoned: false,
        }
    }

    /// The shard this sequence was decoded from.
    #[must_use]
    pub fn shard(&self) -> ShardId {
        self.shard
    }
}

impl Iterator for ShardEvents {
    type Item = Result<RawEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                // Truncated or corrupt gzip surfaces as a read error.
                Err(err) => {
                    self.poisoned = true;
                    return Some(Err(Error::decode(self.shard, self.line + 1, err.to_string())));
                }
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            return match serde_json::from_str::<RawEvent>(&line) {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    self.poisoned = true;
                    Some(Err(Error::decode(self.shard, self.line, err.to_string())))
                }
            };
        }
    }
}
