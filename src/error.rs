use thiserror::Error;

/// Result envelope shared by every public operation
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failure from a [`DocumentLoader`](crate::scrapers::DocumentLoader)
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("no document at {0}")]
    NotFound(String),
}

/// Failure while mapping a listing page onto a [`Listing`](crate::models::Listing)
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("invalid source identifier: {0:?}")]
    InvalidSourceId(String),

    #[error("missing required node: {0}")]
    MissingNode(&'static str),

    #[error("malformed {field}: {value:?}")]
    Malformed { field: &'static str, value: String },
}

impl ExtractError {
    /// True when the document itself is the wrong shape, as opposed to the URL
    pub fn is_page_shape(&self) -> bool {
        !matches!(self, ExtractError::InvalidSourceId(_))
    }

    pub(crate) fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        ExtractError::Malformed {
            field,
            value: value.into(),
        }
    }
}

/// Failure while reading a search result page
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("invalid search url: {0:?}")]
    InvalidUrl(String),

    #[error("page has no result links and no total count")]
    NotAResultPage,

    #[error("missing total result count")]
    MissingTotalCount,

    #[error("malformed total result count: {0:?}")]
    MalformedTotalCount(String),
}

/// Coarse failure category of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The url could not be fetched or does not identify a listing
    InvalidUrl,
    /// The fetched page is not a listing
    NotAPosting,
    /// The fetched page is not a search result index
    InvalidSearch,
    /// A blocking call could not drive its async runtime
    Runtime,
}

/// Error returned by [`PostClient`](crate::PostClient) operations.
///
/// `Display` yields one of a small set of stable messages. The precise
/// cause is kept as the error source.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid Url: {url}")]
    Fetch {
        url: String,
        #[source]
        source: LoadError,
    },

    #[error("Invalid Url: {url}")]
    InvalidSourceId {
        url: String,
        #[source]
        source: ExtractError,
    },

    #[error("Url is not a valid Craigslist Posting")]
    NotAPosting {
        url: String,
        #[source]
        source: ExtractError,
    },

    #[error("Invalid Craigslist search Url.")]
    InvalidSearch {
        url: String,
        #[source]
        source: SearchError,
    },

    #[error("Failed to run async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl ClientError {
    /// Relabel an extraction failure for `url` into its public message
    pub fn from_extract(url: impl Into<String>, source: ExtractError) -> Self {
        let url = url.into();
        if source.is_page_shape() {
            ClientError::NotAPosting { url, source }
        } else {
            ClientError::InvalidSourceId { url, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Fetch { .. } | ClientError::InvalidSourceId { .. } => ErrorKind::InvalidUrl,
            ClientError::NotAPosting { .. } => ErrorKind::NotAPosting,
            ClientError::InvalidSearch { .. } => ErrorKind::InvalidSearch,
            ClientError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// The url the failing operation was working on
    pub fn url(&self) -> &str {
        match self {
            ClientError::Fetch { url, .. }
            | ClientError::InvalidSourceId { url, .. }
            | ClientError::NotAPosting { url, .. }
            | ClientError::InvalidSearch { url, .. } => url,
            ClientError::Runtime(_) => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_shape_failures_map_to_not_a_posting() {
        let err = ClientError::from_extract("https://x.org/a.html", ExtractError::MissingNode("title"));
        assert_eq!(err.kind(), ErrorKind::NotAPosting);
        assert_eq!(err.to_string(), "Url is not a valid Craigslist Posting");

        let err = ClientError::from_extract(
            "https://x.org/a.html",
            ExtractError::malformed("price", "abc"),
        );
        assert_eq!(err.kind(), ErrorKind::NotAPosting);
    }

    #[test]
    fn invalid_source_id_maps_to_invalid_url() {
        let err = ClientError::from_extract("x.org", ExtractError::InvalidSourceId("x.org".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert_eq!(err.to_string(), "Invalid Url: x.org");
        assert_eq!(err.url(), "x.org");
    }

    #[test]
    fn fetch_failure_keeps_its_cause() {
        let err = ClientError::Fetch {
            url: "https://x.org/a.html".into(),
            source: LoadError::Status(404),
        };
        assert_eq!(err.to_string(), "Invalid Url: https://x.org/a.html");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("server returned status 404"));
    }
}
