//! Public favicon providers
//!
//! Providers only build URLs; nothing here touches the network. The prober
//! decides whether a provider URL actually yields a usable image.

use crate::models::IconSource;

/// A public icon service addressed by domain
pub trait IconProvider: Send + Sync {
    fn source(&self) -> IconSource;

    fn icon_url(&self, domain: &str) -> String;
}

/// Google's `s2/favicons` endpoint, which can upscale to a requested size
#[derive(Debug, Clone)]
pub struct GoogleFaviconProvider {
    size: u32,
}

impl GoogleFaviconProvider {
    pub fn new(size: u32) -> Self {
        Self { size }
    }
}

impl IconProvider for GoogleFaviconProvider {
    fn source(&self) -> IconSource {
        IconSource::Google
    }

    fn icon_url(&self, domain: &str) -> String {
        format!(
            "https://www.google.com/s2/favicons?domain={domain}&sz={}",
            self.size
        )
    }
}

/// DuckDuckGo's `ip3` endpoint, serving the site's own `.ico`
#[derive(Debug, Clone, Default)]
pub struct DuckDuckGoProvider;

impl IconProvider for DuckDuckGoProvider {
    fn source(&self) -> IconSource {
        IconSource::DuckDuckGo
    }

    fn icon_url(&self, domain: &str) -> String {
        format!("https://icons.duckduckgo.com/ip3/{domain}.ico")
    }
}
