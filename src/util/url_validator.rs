use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating an API base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a non-loopback host would expose the API key.
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates the base URL of the generative-AI endpoint.
///
/// The API key travels in a request header, so the base URL must be HTTPS.
/// Plain HTTP is accepted only for loopback hosts (`localhost`, `127.0.0.1`,
/// `::1`), which is what mock servers in tests bind to.
///
/// A trailing slash is removed so paths can be appended with `format!`.
///
/// # Examples
///
/// ```
/// use healthwire::util::validate_base_url;
///
/// let url = validate_base_url("https://generativelanguage.googleapis.com/").unwrap();
/// assert_eq!(url, "https://generativelanguage.googleapis.com");
///
/// assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
/// assert!(validate_base_url("http://evil.example.com").is_err());
/// assert!(validate_base_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<String, UrlValidationError> {
    let url = Url::parse(url_str)?;

    let host = url.host_str().ok_or(UrlValidationError::MissingHost)?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback_host(host) => {
            tracing::warn!(base_url = %url_str, "Using non-HTTPS API base URL (localhost only)");
        }
        "http" => return Err(UrlValidationError::InsecureBaseUrl),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn is_loopback_host(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
