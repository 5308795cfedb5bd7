use url::Url;

use crate::{FailureKind, ReloadError, SearchError};

/// `GET {base}/search?q=<term>&offset=<offset>`
pub fn search_url(base: &Url, term: &str, offset: usize) -> Result<Url, SearchError> {
    let mut url = base
        .join("search")
        .map_err(|err| SearchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("q", term)
        .append_pair("offset", &offset.to_string());
    Ok(url)
}

/// `GET {base}/locate-message?id=<id>`
pub fn locate_message_url(base: &Url, id: &str) -> Result<Url, SearchError> {
    let mut url = base
        .join("locate-message")
        .map_err(|err| SearchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    url.query_pairs_mut().clear().append_pair("id", id);
    Ok(url)
}

/// Reload socket endpoint: same host as `base`, `wss` when `base` is secure.
pub fn reload_url(base: &Url) -> Result<Url, ReloadError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ReloadError::InvalidEndpoint(format!(
                "unsupported scheme {other}"
            )))
        }
    };
    let mut url = base
        .join("reload")
        .map_err(|err| ReloadError::InvalidEndpoint(err.to_string()))?;
    url.set_scheme(scheme)
        .map_err(|()| ReloadError::InvalidEndpoint(format!("cannot switch to {scheme}")))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
