// Client configuration
// Environment variables with defaults; CLI flags are applied on top by the binary

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_AUTOSAVE_SECS: u64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Raw `Cookie` header forwarded with every credentialed request
    pub cookies: String,
    pub csrf_cookie: String,
    pub state_dir: PathBuf,
    /// Host color-scheme signal (`dark` / `light`); `None` means light
    pub color_scheme: Option<String>,
    pub autosave_period: Duration,
}

impl ClientConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CODELAB_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url).context("Invalid CODELAB_BASE_URL")?;

        let autosave_secs = match lookup("CODELAB_AUTOSAVE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid CODELAB_AUTOSAVE_SECS: {}", raw))?,
            None => DEFAULT_AUTOSAVE_SECS,
        };
        if autosave_secs == 0 {
            bail!("CODELAB_AUTOSAVE_SECS must be at least 1");
        }

        let state_dir = lookup("CODELAB_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir);

        Ok(Self {
            base_url,
            cookies: lookup("CODELAB_COOKIES").unwrap_or_default(),
            csrf_cookie: lookup("CODELAB_CSRF_COOKIE")
                .unwrap_or_else(|| DEFAULT_CSRF_COOKIE.to_string()),
            state_dir,
            color_scheme: lookup("CODELAB_COLOR_SCHEME"),
            autosave_period: Duration::from_secs(autosave_secs),
        })
    }
}

/// Parse a service origin; API paths are joined onto it, so it must be a base URL
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Not a URL: {}", raw))?;
    if url.cannot_be_a_base() {
        bail!("Base URL must be an http(s) origin, got {}", url);
    }
    Ok(url)
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("codelab"))
        .unwrap_or_else(|| PathBuf::from(".codelab"))
}
