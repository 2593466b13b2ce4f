use url::Url;

use crate::crawl::CrawlError;

/// Hosts a crawl or live extraction may reach. Checked before any fetch.
#[derive(Debug, Clone)]
pub struct HostAllowlist {
    hosts: Vec<String>,
}

impl HostAllowlist {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().trim_end_matches('.').to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Parses `raw` and accepts it only for http(s) on an allowed host or one
    /// of its subdomains.
    pub fn check(&self, raw: &str) -> Result<Url, CrawlError> {
        let url = Url::parse(raw.trim()).map_err(|e| CrawlError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host = url
            .host_str()
            .map(|h| h.trim_end_matches('.').to_lowercase())
            .unwrap_or_default();
        if self.allows(&host) {
            Ok(url)
        } else {
            Err(CrawlError::HostNotAllowed(host))
        }
    }

    fn allows(&self, host: &str) -> bool {
        !host.is_empty()
            && self
                .hosts
                .iter()
                .any(|allowed| host == allowed || host.ends_with(&format!(".{allowed}")))
    }
}
