//! Query parameter handling shared by OGC request builders.
//!
//! Endpoints frequently carry their own query parameters (proxy routes,
//! gateway keys, `map=` selectors on MapServer). Builders keep those first,
//! byte for byte as the endpoint spelled them, and append their own
//! parameters after them.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Url;
use serde::Serialize;

use super::WmsError;

/// Characters escaped in query keys and values. Everything else that is a
/// valid URL code point, including `/`, `:` and `,`, is emitted literally.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A single `name=value` query parameter.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QueryParam {
    /// Parameter name.
    pub name: String,
    /// Decoded parameter value.
    pub value: String,
    /// Segment as it appeared on the endpoint; emitted instead of encoding
    /// `name` and `value`.
    #[serde(skip)]
    verbatim: Option<String>,
}

impl QueryParam {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            verbatim: None,
        }
    }

    fn from_segment(name: impl Into<String>, value: impl Into<String>, segment: &str) -> Self {
        Self {
            verbatim: Some(segment.to_owned()),
            ..Self::new(name, value)
        }
    }

    fn encode_into(&self, target: &mut String) {
        if let Some(segment) = &self.verbatim {
            target.push_str(segment);
            return;
        }
        target.extend(utf8_percent_encode(&self.name, QUERY_COMPONENT));
        target.push('=');
        target.extend(utf8_percent_encode(&self.value, QUERY_COMPONENT));
    }
}

/// Parses `url` and returns it without query or fragment, together with the
/// query parameters it carried (decoded, in order). Each parameter remembers
/// its original segment so [`encode_query`] reproduces it unchanged.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `url` is not an absolute URL.
pub fn split_endpoint(url: &str) -> Result<(Url, Vec<QueryParam>), WmsError> {
    let mut parsed = Url::parse(url).map_err(|err| WmsError::InvalidEndpoint {
        url: url.to_owned(),
        message: err.to_string(),
    })?;
    // `query_pairs` skips empty segments, so both sides stay aligned.
    let params = parsed.query().map_or_else(Vec::new, |query| {
        query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .zip(parsed.query_pairs())
            .map(|(segment, (name, value))| QueryParam::from_segment(name, value, segment))
            .collect()
    });
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok((parsed, params))
}

/// Returns the query parameters already present on `url`.
///
/// # Errors
///
/// Returns [`WmsError::InvalidEndpoint`] when `url` is not an absolute URL.
pub fn extract_query_params(url: &str) -> Result<Vec<QueryParam>, WmsError> {
    split_endpoint(url).map(|(_, params)| params)
}

/// Renders `params` as an `&`-joined query string. Parameters taken from an
/// endpoint keep their original spelling.
#[must_use]
pub fn encode_query(params: &[QueryParam]) -> String {
    let mut rendered = String::new();
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            rendered.push('&');
        }
        param.encode_into(&mut rendered);
    }
    rendered
}
