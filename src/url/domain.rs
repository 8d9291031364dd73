use url::Url;

/// Extracts the site authority (lowercase host plus explicit port) from a URL
///
/// Two URLs belong to the same site only when their authorities are equal,
/// so `www.example.com` and `example.com` are different sites, as are two
/// local servers on different ports.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use recipe_scout::url::extract_authority;
///
/// let url = Url::parse("https://www.example.com/recipes").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:4000/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:4000".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
