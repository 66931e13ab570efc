use crate::config::FetchConfig;
use crate::error::{ReaderError, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::time::Duration;
use url::{Host, Url};

/// Loads the text of an external document.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, uri: &Url) -> Result<String>;
}

/// Fetches `file`, `http` and `https` resources.
///
/// Network fetches refuse localhost, private and cloud metadata addresses unless
/// `allow_private_addresses` is set, and stop reading once the body outgrows
/// `max_size`.
#[derive(Debug, Clone)]
pub struct HttpResourceFetcher {
    client: Option<reqwest::Client>,
    config: FetchConfig,
}

impl HttpResourceFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| ReaderError::fetch("<client>", e))?;
        Ok(Self {
            client: Some(client),
            config,
        })
    }

    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self {
            client: Some(client),
            config,
        }
    }

    /// Only `file` resources; network URIs fail.
    pub fn new_local_only() -> Self {
        Self {
            client: None,
            config: FetchConfig::default(),
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_file(&self, uri: &Url) -> Result<String> {
        let path = uri.to_file_path().map_err(|_| ReaderError::InvalidUri {
            uri: uri.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        let metadata = tokio::fs::metadata(&path).await?;
        if metadata.len() as usize > self.config.max_size {
            return Err(ReaderError::TooLarge {
                uri: uri.to_string(),
                max: self.config.max_size,
            });
        }
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    async fn fetch_http(&self, uri: &Url) -> Result<String> {
        if !self.config.allow_private_addresses && is_restricted_host(uri) {
            return Err(ReaderError::RestrictedAddress(uri.to_string()));
        }
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ReaderError::fetch(uri, "no http client configured (local only)"))?;
        let res = client
            .get(uri.clone())
            .send()
            .await
            .map_err(|e| ReaderError::fetch(uri, e))?;
        if !res.status().is_success() {
            return Err(ReaderError::fetch(uri, format!("status: {}", res.status())));
        }
        let max = self.config.max_size;
        if res.content_length().is_some_and(|len| len as usize > max) {
            return Err(ReaderError::TooLarge {
                uri: uri.to_string(),
                max,
            });
        }
        let mut body: Vec<u8> = Vec::new();
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ReaderError::fetch(uri, e))?;
            if body.len() + chunk.len() > max {
                return Err(ReaderError::TooLarge {
                    uri: uri.to_string(),
                    max,
                });
            }
            body.extend_from_slice(&chunk);
        }
        String::from_utf8(body).map_err(|e| ReaderError::fetch(uri, e))
    }
}

#[async_trait]
impl ResourceFetcher for HttpResourceFetcher {
    async fn fetch(&self, uri: &Url) -> Result<String> {
        tracing::debug!("fetching external resource: {}", uri);
        let result = match uri.scheme() {
            "file" => self.fetch_file(uri).await,
            "http" | "https" => self.fetch_http(uri).await,
            scheme => Err(ReaderError::UnsupportedScheme {
                scheme: scheme.to_string(),
                uri: uri.to_string(),
            }),
        };
        if let Err(e) = &result {
            tracing::error!("failed to fetch {}: {:?}", uri, e);
        }
        result
    }
}

fn is_restricted_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
}

fn is_restricted_ipv6(ip: &Ipv6Addr) -> bool {
    if ip.is_unspecified() || ip.is_loopback() {
        return true;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_restricted_ipv4(&v4);
    }
    let head = ip.segments()[0];
    // fe80::/10 link local, fc00::/7 unique local
    (head & 0xffc0) == 0xfe80 || (head & 0xfe00) == 0xfc00
}

/// Localhost, private ranges and cloud metadata endpoints.
pub fn is_restricted_host(uri: &Url) -> bool {
    match uri.host() {
        None => true,
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost"
                || domain.ends_with(".localhost")
                || domain.ends_with(".local")
                || domain.ends_with(".internal")
        }
        Some(Host::Ipv4(ip)) => is_restricted_ipv4(&ip),
        Some(Host::Ipv6(ip)) => is_restricted_ipv6(&ip),
    }
}

fn is_windows_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Turns a reference into a fetchable URL: absolute URIs are kept, relative
/// ones are joined onto `base`, and without a base the reference is taken as
/// a file path (relative to the working directory).
pub fn resolve_uri(reference: &str, base: Option<&Url>) -> Result<Url> {
    let invalid = |reason: String| ReaderError::InvalidUri {
        uri: reference.to_string(),
        reason,
    };
    if !is_windows_path(reference)
        && let Ok(url) = Url::parse(reference)
    {
        return Ok(url);
    }
    if let Some(base) = base {
        return base.join(reference).map_err(|e| invalid(e.to_string()));
    }
    let path = Path::new(reference);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&path).map_err(|_| invalid("not an absolute file path".to_string()))
}

/// Directory URL (trailing slash) so that joins resolve inside it.
pub fn directory_url(dir: &Path) -> Result<Url> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    Url::from_directory_path(&dir).map_err(|_| ReaderError::InvalidUri {
        uri: dir.display().to_string(),
        reason: "not an absolute directory path".to_string(),
    })
}
