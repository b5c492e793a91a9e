//! `fsearch://open` URI handling.
//!
//! `fsearch://open?viewtype=tab&query=bar` opens the search UI hosted in
//! the requested surface with the given query; both parameters are
//! optional and default to the modal with an empty query.

use crate::error::{Error, Result};
use fsearch_types::ViewKind;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriRequest {
    pub view: ViewKind,
    pub query: String,
}

pub fn parse(uri: &str) -> Result<UriRequest> {
    let url = Url::parse(uri)?;
    if url.scheme() != "fsearch" {
        return Err(Error::Uri(format!("unsupported scheme: {}", url.scheme())));
    }
    let action = url.host_str().unwrap_or_default();
    if action != "open" {
        return Err(Error::Uri(format!("unsupported action: {action}")));
    }

    let mut view = ViewKind::Modal;
    let mut query = String::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "viewtype" => {
                view = ViewKind::try_from(value.as_ref()).map_err(Error::Uri)?;
            }
            "query" => query = value.into_owned(),
            _ => {}
        }
    }
    Ok(UriRequest { view, query })
}
