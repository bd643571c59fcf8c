use url::Url;

/// Extracts the network location of a URL
///
/// The network location is the host plus an explicit non-default port, so
/// `http://example.com:8080/` and `http://example.com/` are different
/// locations. Credentials are kept when present; the host is lowercase
/// because the `url` parser already normalized it.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::network_location;
///
/// let url = Url::parse("https://example.com:8443/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com:8443".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    let mut location = String::new();
    if !url.username().is_empty() {
        location.push_str(url.username());
        if let Some(password) = url.password() {
            location.push(':');
            location.push_str(password);
        }
        location.push('@');
    }
    location.push_str(host);
    if let Some(port) = url.port() {
        location.push(':');
        location.push_str(&port.to_string());
    }

    Some(location)
}

/// Returns true if both URLs share a byte-equal network location
pub fn is_same_domain(url: &Url, other: &Url) -> bool {
    match (network_location(url), network_location(other)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
