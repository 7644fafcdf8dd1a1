use url::Url;

/// Returns the network location of a URL: lowercase host plus explicit port
///
/// Default ports are not part of the network location, so
/// `http://example.com:80/` and `http://example.com/` share one.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vidtrawl::url::netloc;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(netloc(&url), "example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(netloc(&url), "127.0.0.1:8080");
/// ```
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_lowercase();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    }
}

/// Returns true if both URLs share the same network location
pub fn is_same_domain(candidate: &Url, base: &Url) -> bool {
    candidate.host_str().is_some() && netloc(candidate) == netloc(base)
}
