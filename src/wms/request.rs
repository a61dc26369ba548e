//! Immutable GET request descriptors produced by the WMS builders.

use std::fmt;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::query::{QueryParam, encode_query};

/// A fully formed HTTP GET request: base URL plus ordered query parameters.
///
/// Parameter names are not deduplicated; repeated names are emitted in the
/// order they were added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetRequest {
    base_url: Url,
    params: Vec<QueryParam>,
}

impl GetRequest {
    pub(crate) const fn new(base_url: Url, params: Vec<QueryParam>) -> Self {
        Self { base_url, params }
    }

    /// HTTP method of the request; always `GET`.
    #[must_use]
    pub fn method(&self) -> Method {
        Method::GET
    }

    /// Endpoint without query string or fragment.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Query parameters in emission order.
    #[must_use]
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Returns the first value recorded for `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }

    /// Renders the encoded query string (without the leading `?`).
    #[must_use]
    pub fn query_string(&self) -> String {
        encode_query(&self.params)
    }

    /// Full request URL.
    #[must_use]
    pub fn url(&self) -> Url {
        let mut url = self.base_url.clone();
        if !self.params.is_empty() {
            url.set_query(Some(&self.query_string()));
        }
        url
    }

    /// Prepares the request on `client` for the transport layer to send.
    #[must_use]
    pub fn to_request(&self, client: &Client) -> RequestBuilder {
        client.request(self.method(), self.url())
    }
}

impl fmt::Display for GetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url().as_str())
    }
}

impl Serialize for GetRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GetRequest", 4)?;
        state.serialize_field("method", self.method().as_str())?;
        state.serialize_field("url", self.url().as_str())?;
        state.serialize_field("base_url", self.base_url.as_str())?;
        state.serialize_field("params", &self.params)?;
        state.end()
    }
}
