use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_RANGE, RANGE, USER_AGENT};
use reqwest::Url;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::Duration;

use super::MediaSource;
use crate::errors::ProviderError;
use crate::util::log_preview;
use crate::youtube::clients::ClientKind;

pub const STREAM_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Closed,
    Opening,
    Open,
}

/// Range-aware pull reader over a resolved stream URL.
///
/// One session owns at most one upstream connection. `read` returning
/// `Ok(0)` is the end-of-stream signal.
pub struct HttpSource {
    url: String,
    client: Client,
    state: SourceState,
    reader: Option<Box<dyn Read + Send + Sync>>,
    range_start: u64,
    /// How many bytes this session may deliver, when known.
    expected_len: Option<u64>,
    bytes_delivered: u64,
    /// Exclusive end of the window passed to `open`; seeks stay inside it.
    window_end: Option<u64>,
    total_size: Option<u64>,
    /// Leading bytes to discard when the server ignored our Range header.
    skip_remaining: u64,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(url, Duration::from_secs(STREAM_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::UpstreamUnavailable(e.to_string()))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            client,
            state: SourceState::Closed,
            reader: None,
            range_start: 0,
            expected_len: None,
            bytes_delivered: 0,
            window_end: None,
            total_size: None,
            skip_remaining: 0,
        }
    }

    /// Creates a source and opens it in one step.
    pub fn open_url(url: &str, start: u64, length: Option<u64>) -> Result<Self, ProviderError> {
        let mut source = Self::new(url)?;
        source.open(start, length)?;
        Ok(source)
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes_delivered(&self) -> u64 {
        self.bytes_delivered
    }

    /// Total size of the remote resource, if the server revealed it.
    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    /// Absolute offset of the next byte `read` will return.
    pub fn position(&self) -> u64 {
        self.range_start + self.bytes_delivered
    }

    /// Opens a session starting at `start`.
    ///
    /// Returns the number of bytes the session will deliver, if known. Any
    /// previously open connection is closed first.
    pub fn open(&mut self, start: u64, length: Option<u64>) -> Result<Option<u64>, ProviderError> {
        self.close();
        self.state = SourceState::Opening;

        let length = length.filter(|l| *l > 0);
        self.window_end = length.map(|l| start.saturating_add(l));

        match self.try_open(start, length) {
            Ok(expected) => Ok(expected),
            Err(e) => {
                log::warn!("[HttpSource] Open failed for {}: {}", log_preview(&self.url), e);
                self.close();
                Err(e)
            }
        }
    }

    fn try_open(&mut self, start: u64, length: Option<u64>) -> Result<Option<u64>, ProviderError> {
        let range = range_header(start, length);

        let resp = self
            .client
            .get(&self.url)
            .headers(impersonation_headers(&self.url))
            .header(RANGE, &range)
            .send()?;

        let status = resp.status().as_u16();
        let content_range_total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        log::debug!(
            "[HttpSource] {} -> {} (Content-Length: {:?}, Range: {})",
            log_preview(&self.url),
            status,
            resp.content_length(),
            range
        );

        match status {
            416 => {
                // Requested range starts at or past the end.
                self.range_start = start;
                self.bytes_delivered = 0;
                self.expected_len = Some(0);
                self.total_size = content_range_total.or(self.total_size);
                self.skip_remaining = 0;
                self.state = SourceState::Open;
                Ok(Some(0))
            }
            200 | 206 => {
                let content_length = resp.content_length();

                let available = if status == 200 {
                    // Range ignored, the body starts at byte 0.
                    self.total_size = content_length;
                    self.skip_remaining = start;
                    content_length.map(|l| l.saturating_sub(start))
                } else {
                    self.total_size = content_range_total
                        .or_else(|| content_length.map(|l| l + start));
                    self.skip_remaining = 0;
                    content_length
                };

                let expected = match (length, available) {
                    (Some(l), Some(a)) => Some(l.min(a)),
                    (Some(l), None) => Some(l),
                    (None, a) => a,
                };

                self.range_start = start;
                self.bytes_delivered = 0;
                self.expected_len = expected;
                self.reader = Some(Box::new(resp));
                self.state = SourceState::Open;
                Ok(expected)
            }
            _ => {
                drop(resp);
                Err(ProviderError::rejected(status, "stream open failed"))
            }
        }
    }

    /// Pull-source style read into `buf[offset..offset + max_len]`.
    pub fn read_chunk(&mut self, buf: &mut [u8], offset: usize, max_len: usize) -> io::Result<usize> {
        if offset > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "offset past end of buffer",
            ));
        }
        let end = offset.saturating_add(max_len).min(buf.len());
        self.read(&mut buf[offset..end])
    }

    /// Releases the connection. Safe to call in any state.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            log::debug!(
                "[HttpSource] Closed {} after {} bytes",
                log_preview(&self.url),
                self.bytes_delivered
            );
        }
        self.state = SourceState::Closed;
        self.skip_remaining = 0;
    }

    /// Positions an open session at or past the window end without a
    /// connection; reads return end-of-stream.
    fn park_at(&mut self, pos: u64) {
        self.close();
        self.range_start = pos;
        self.bytes_delivered = 0;
        self.expected_len = Some(0);
        self.state = SourceState::Open;
    }

    fn discard_skipped(&mut self) -> io::Result<bool> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };

        let mut scratch = [0u8; 8192];
        while self.skip_remaining > 0 {
            let want = self.skip_remaining.min(scratch.len() as u64) as usize;
            let n = reader.read(&mut scratch[..want])?;
            if n == 0 {
                return Ok(false);
            }
            self.skip_remaining -= n as u64;
        }
        Ok(true)
    }
}

impl Read for HttpSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.state != SourceState::Open {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "stream is not open",
            ));
        }

        let max = match self.expected_len {
            Some(expected) if self.bytes_delivered >= expected => return Ok(0),
            Some(expected) => buf.len().min((expected - self.bytes_delivered) as usize),
            None => buf.len(),
        };

        if self.skip_remaining > 0 && !self.discard_skipped()? {
            return Ok(0);
        }

        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };

        let n = reader.read(&mut buf[..max])?;
        self.bytes_delivered += n as u64;
        Ok(n)
    }
}

impl Seek for HttpSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let current = self.position();
        let new_pos = match pos {
            SeekFrom::Start(p) => p,
            SeekFrom::End(p) => match self.total_size {
                Some(len) => offset_by(len, p)?,
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Cannot seek from end: unknown size",
                    ))
                }
            },
            SeekFrom::Current(p) => offset_by(current, p)?,
        };

        if new_pos != current || self.state != SourceState::Open {
            match self.window_end.map(|end| end.saturating_sub(new_pos)) {
                Some(0) => self.park_at(new_pos),
                remaining => {
                    self.open(new_pos, remaining).map_err(io::Error::other)?;
                }
            }
        }

        Ok(self.position())
    }
}

impl MediaSource for HttpSource {
    fn is_seekable(&self) -> bool {
        self.total_size.is_some()
    }

    fn byte_len(&self) -> Option<u64> {
        self.total_size
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn offset_by(base: u64, delta: i64) -> io::Result<u64> {
    base.checked_add_signed(delta).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position")
    })
}

/// `bytes=<start>-<end>` with the end omitted when the length is unknown.
pub fn range_header(start: u64, length: Option<u64>) -> String {
    match length {
        Some(len) if len > 0 => format!("bytes={}-{}", start, start + len - 1),
        _ => format!("bytes={}-", start),
    }
}

/// Total length from `Content-Range: bytes 0-99/1234` (or `bytes */1234`).
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Headers that make a stream request look like it comes from the client the
/// URL was issued to. Browser clients (`c=WEB_REMIX`, `c=MWEB`, ...) get
/// browser headers, everything else the native app user agent.
pub fn impersonation_headers(url: &str) -> HeaderMap {
    let client_name = Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "c")
            .map(|(_, v)| v.into_owned())
    });

    let profile = client_name
        .as_deref()
        .and_then(ClientKind::from_wire_name)
        .unwrap_or(ClientKind::Android)
        .profile();

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(profile.user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    if profile.browser {
        for (name, value) in profile.extra_headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_header() {
        assert_eq!(range_header(100, Some(50)), "bytes=100-149");
        assert_eq!(range_header(0, None), "bytes=0-");
        assert_eq!(range_header(42, Some(0)), "bytes=42-");
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("bytes 100-149/1000"), Some(1000));
        assert_eq!(parse_content_range_total("bytes */1000"), Some(1000));
        assert_eq!(parse_content_range_total("bytes 0-99/*"), None);
    }

    #[test]
    fn test_browser_client_headers() {
        let headers = impersonation_headers(
            "https://rr1.googlevideo.com/videoplayback?itag=251&c=WEB_REMIX&mime=audio%2Fwebm",
        );
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
        assert_eq!(headers["origin"], "https://music.youtube.com");
    }

    #[test]
    fn test_native_client_headers() {
        let ios = impersonation_headers("https://rr1.googlevideo.com/videoplayback?c=IOS");
        assert!(ios[USER_AGENT].to_str().unwrap().starts_with("com.google.ios.youtube"));
        assert!(ios.get("origin").is_none());

        let unknown = impersonation_headers("https://cdn.example.com/song.mp4");
        assert!(unknown[USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("com.google.android.youtube"));
    }

    #[test]
    fn test_read_requires_open_state() {
        let mut source = HttpSource::with_client("http://127.0.0.1:9/none", Client::new());
        let mut buf = [0u8; 4];
        let err = source.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        source.close();
        source.close();
        assert_eq!(source.state(), SourceState::Closed);
    }
}
