use crate::UrlError;
use url::Url;

/// Reduces a URL to the canonical form used for every dedup check and for storage
///
/// # Canonical Form
///
/// 1. Scheme must be http or https
/// 2. A host must be present
/// 3. Query string is removed
/// 4. Fragment is removed
///
/// Host lowercasing and dot-segment removal are already done by `Url::parse`.
/// Nothing else is rewritten: `/recipes/a` and `/recipes/a/` stay distinct,
/// matching how the target site serves them.
///
/// # Examples
///
/// ```
/// use recipe_scout::url::canonicalize_str;
///
/// let url = canonicalize_str("https://WWW.Example.com/recipes/soup?page=2#method").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/recipes/soup");
/// ```
pub fn canonicalize_str(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Canonicalizes an already-parsed URL (see [`canonicalize_str`])
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
