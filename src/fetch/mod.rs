//! Blocking URL downloads.
//!
//! Downloads stream to disk in 1 MiB chunks with a progress bar. There is no
//! overall timeout. Proxies come from `http_proxy` / `https_proxy`.

use crate::error::{ConfprobeError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::Proxy;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Bytes read per chunk.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Proxy settings for a [`Downloader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proxies {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl Proxies {
    /// Read `http_proxy` and `https_proxy` from the process environment.
    pub fn from_env() -> Self {
        Self {
            http: non_empty_var("http_proxy"),
            https: non_empty_var("https_proxy"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Downloads files over HTTP(S).
#[derive(Debug)]
pub struct Downloader {
    client: Client,
    show_progress: bool,
}

impl Downloader {
    /// A downloader using proxies from the environment.
    pub fn new() -> Result<Self> {
        Self::with_proxies(&Proxies::from_env())
    }

    pub fn with_proxies(proxies: &Proxies) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("confprobe/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .no_proxy();

        if let Some(http) = &proxies.http {
            builder = builder.proxy(Proxy::http(http).map_err(|e| proxy_error(http, e))?);
        }
        if let Some(https) = &proxies.https {
            builder = builder.proxy(Proxy::https(https).map_err(|e| proxy_error(https, e))?);
        }

        let client = builder.build().map_err(|e| ConfprobeError::Download {
            url: String::new(),
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// Show or hide the progress bar.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Download `url` into `target`, returning the number of bytes written.
    ///
    /// A partially written target is removed on failure.
    pub fn download(&self, url: &str, target: &Path) -> Result<u64> {
        tracing::info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| download_error(url, e))?;

        if !response.status().is_success() {
            return Err(ConfprobeError::Download {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let bar = self.progress_bar(response.content_length());
        let result = stream_to_file(&mut response, target, &bar)
            .map_err(|e| download_error(url, e));

        match result {
            Ok(written) => {
                bar.finish_and_clear();
                tracing::info!("Downloaded {} bytes to {}", written, target.display());
                Ok(written)
            }
            Err(e) => {
                bar.abandon();
                let _ = fs::remove_file(target);
                Err(e)
            }
        }
    }

    fn progress_bar(&self, len: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match len {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{bar:40.magenta} {bytes}/{total_bytes} {msg}")
                {
                    bar.set_style(style);
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {bytes}")
                {
                    bar.set_style(style);
                }
                bar
            }
        }
    }
}

fn stream_to_file(source: &mut impl Read, target: &Path, bar: &ProgressBar) -> std::io::Result<u64> {
    let mut file = File::create(target)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        file.write_all(&buf[..n])?;
        written += n as u64;
        bar.inc(n as u64);
    }

    file.flush()?;
    Ok(written)
}

fn download_error(url: &str, e: impl std::fmt::Display) -> ConfprobeError {
    ConfprobeError::Download {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn proxy_error(proxy: &str, e: reqwest::Error) -> ConfprobeError {
    ConfprobeError::Download {
        url: proxy.to_string(),
        message: format!("invalid proxy: {}", e),
    }
}
