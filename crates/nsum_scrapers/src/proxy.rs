use std::fmt;
use nsum_core::{Error, Result};

/// Outbound proxy shared by the browser and the plain HTTP fetcher.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub server: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Returns `None` unless a non-blank server URL is given.
    pub fn from_parts(
        server: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        let server = server?.trim().to_string();
        if server.is_empty() {
            return None;
        }
        Some(Self {
            server,
            username: username.filter(|u| !u.is_empty()),
            password: password.filter(|p| !p.is_empty()),
        })
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            (Some(user), None) => Some((user.as_str(), "")),
            _ => None,
        }
    }

    /// Chromium only accepts the bare server in `--proxy-server`;
    /// credentials are answered per page instead.
    pub fn chrome_arg(&self) -> String {
        format!("--proxy-server={}", self.server)
    }

    pub fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(&self.server)
            .map_err(|e| Error::Config(format!("Invalid proxy URL {}: {}", self.server, e)))?;
        Ok(match self.credentials() {
            Some((user, pass)) => proxy.basic_auth(user, pass),
            None => proxy,
        })
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}
