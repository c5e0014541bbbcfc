//! Page acquisition: where the rendered listing markup comes from.
//!
//! The extraction pipeline only ever sees a markup string. This module is the
//! thin shell that obtains it, either from a page source saved by a browser
//! automation tool (file or stdin) or by fetching a static page over HTTP.
//!
//! # Architecture
//!
//! - [`PageSource`]: core trait, one async method returning the markup
//! - [`FileSource`]: reads a saved page source, `-` meaning stdin
//! - [`HttpSource`]: `reqwest` GET with a page-load timeout
//! - [`RetryFetch`]: decorator adding retries to any [`PageSource`]
//!
//! # Retry Strategy
//!
//! - Bounded number of retries (3 from the CLI by default)
//! - Exponential backoff starting at the base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration as StdDuration, Instant};
use tokio::io::AsyncReadExt;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::utils::truncate_for_log;

/// Something that can hand over the rendered listing markup.
pub trait PageSource {
    /// Obtain the page markup.
    async fn fetch_page(&self) -> Result<String, Box<dyn Error>>;
}

/// A page source saved to disk, or piped on stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl PageSource for FileSource {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn fetch_page(&self) -> Result<String, Box<dyn Error>> {
        let markup = if self.is_stdin() {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        } else {
            tokio::fs::read_to_string(&self.path).await?
        };
        info!(bytes = markup.len(), "Read page source");
        Ok(markup)
    }
}

/// Fetches the listing over plain HTTP.
///
/// No script execution happens, so this only suits listings whose articles
/// are present in the served HTML.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpSource {
    /// Build a source for `url`; `timeout` bounds the whole request.
    pub fn new(url: Url, timeout: StdDuration) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("listing_scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    async fn fetch_page(&self) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        let body = response.error_for_status()?.text().await?;
        info!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched listing page"
        );
        debug!(preview = %truncate_for_log(&body, 300), "Listing page preview");
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`PageSource`].
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..max_jitter)
/// ```
pub struct RetryFetch<T> {
    /// The underlying source to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Upper bound on the backoff delay.
    max_delay: StdDuration,
    /// Upper bound on the random jitter added to each delay.
    max_jitter: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: PageSource,
{
    /// Wrap `inner`, retrying up to `max_retries` times after the first attempt.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let source = HttpSource::new(url, Duration::from_secs(30))?;
    /// let retrying = RetryFetch::new(source, 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = rng().random_range(0..=self.max_jitter.as_millis() as u64);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("max_jitter", &self.max_jitter)
            .finish()
    }
}

impl<T> PageSource for RetryFetch<T>
where
    T: PageSource,
{
    #[instrument(level = "info", skip_all)]
    async fn fetch_page(&self) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch_page().await {
                Ok(markup) => return Ok(markup),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch_page() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch_page() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fails a fixed number of times, then returns the markup.
    struct Flaky {
        failures: usize,
        calls: Cell<usize>,
    }

    impl PageSource for Flaky {
        async fn fetch_page(&self) -> Result<String, Box<dyn Error>> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n <= self.failures {
                Err(format!("failure {n}").into())
            } else {
                Ok("<html></html>".to_string())
            }
        }
    }

    fn flaky(failures: usize) -> Flaky {
        Flaky {
            failures,
            calls: Cell::new(0),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let retry = RetryFetch::new(flaky(2), 3, StdDuration::from_millis(1))
            .with_max_jitter(StdDuration::ZERO);
        let markup = retry.fetch_page().await.unwrap();
        assert_eq!(markup, "<html></html>");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let retry = RetryFetch::new(flaky(10), 2, StdDuration::from_millis(1))
            .with_max_jitter(StdDuration::ZERO);
        let err = retry.fetch_page().await.unwrap_err();
        assert_eq!(err.to_string(), "failure 3");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryFetch::new(flaky(0), 5, StdDuration::from_secs(1))
            .with_max_jitter(StdDuration::ZERO);
        assert_eq!(retry.backoff(1), StdDuration::from_secs(1));
        assert_eq!(retry.backoff(2), StdDuration::from_secs(2));
        assert_eq!(retry.backoff(3), StdDuration::from_secs(4));
        assert_eq!(retry.backoff(10), StdDuration::from_secs(30));
    }

    #[tokio::test]
    async fn test_file_source_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<article></article>").unwrap();
        let markup = FileSource::new(path).fetch_page().await.unwrap();
        assert_eq!(markup, "<article></article>");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_error() {
        let source = FileSource::new(PathBuf::from("/nonexistent/page.html"));
        assert!(source.fetch_page().await.is_err());
    }

    #[test]
    fn test_dash_means_stdin() {
        assert!(FileSource::new(PathBuf::from("-")).is_stdin());
        assert!(!FileSource::new(PathBuf::from("page.html")).is_stdin());
    }

    #[test]
    fn test_http_source_builds_client() {
        let url = Url::parse("https://techcrunch.com/").unwrap();
        let source = HttpSource::new(url, StdDuration::from_secs(30)).unwrap();
        assert_eq!(source.url.as_str(), "https://techcrunch.com/");
    }
}
