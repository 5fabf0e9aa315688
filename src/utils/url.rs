//! URL utilities: domain extraction and log-safe URL rendering

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SENSITIVE_PARAMS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["api_key", "api_secret", "signature", "token", "password", "pass"]
        .iter()
        .filter_map(|param| Regex::new(&format!(r"(?i)([?&]{}=)[^&]*", regex::escape(param))).ok())
        .collect()
});

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Extract the normalized domain of an absolute URL
    ///
    /// Returns the hostname with a single leading `www.` removed, or an empty
    /// string when `url` is not a parseable absolute URL or has no host.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use favicon_resolver::utils::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::get_domain("https://www.github.com/rust-lang"), "github.com");
    /// assert_eq!(UrlUtils::get_domain("github.com"), "");
    /// ```
    pub fn get_domain(url: &str) -> String {
        let Ok(parsed) = Url::parse(url) else {
            return String::new();
        };

        let host = parsed.host_str().unwrap_or_default();
        host.strip_prefix("www.").unwrap_or(host).to_string()
    }

    /// Mask credentials and signing parameters before a URL is logged
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        for re in SENSITIVE_PARAMS.iter() {
            obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
        }

        obfuscated
    }
}
