//! Client-specific error type wrapping reqwest errors.

use needlehub_domain::error::{NeedleError, QueryError, ResolveError};

/// Errors originating from talking to a remote sensor host.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response not received.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status.
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl ClientError {
    /// Classify a failure that happened while resolving `name`.
    #[must_use]
    pub fn into_resolve(self, name: &str) -> NeedleError {
        let name = name.to_string();
        match self {
            Self::UnexpectedStatus { status, .. } if status == reqwest::StatusCode::NOT_FOUND => {
                ResolveError::NotFound { name }.into()
            }
            other => ResolveError::Unreachable {
                name,
                source: Box::new(other),
            }
            .into(),
        }
    }

    /// Classify a failure that happened while reading.
    ///
    /// The host tags error bodies with a `kind`; the query outcomes that the
    /// controller reports differently are mapped back to their own variants.
    /// Everything else becomes [`QueryError::Store`].
    #[must_use]
    pub fn into_read(self) -> NeedleError {
        match self.remote_kind().as_deref() {
            Some("empty_result") => QueryError::EmptyResult.into(),
            Some("missing_count") => QueryError::MissingCount.into(),
            Some("closed") => NeedleError::Closed,
            _ => QueryError::Store(Box::new(self)).into(),
        }
    }

    fn remote_kind(&self) -> Option<String> {
        let Self::UnexpectedStatus { body, .. } = self else {
            return None;
        };
        let body: serde_json::Value = serde_json::from_str(body).ok()?;
        body.get("kind")?.as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ClientError {
        with_body(code, "")
    }

    fn with_body(code: u16, body: &str) -> ClientError {
        ClientError::UnexpectedStatus {
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn should_map_not_found_to_resolve_not_found() {
        assert!(matches!(
            status(404).into_resolve("sensor-1"),
            NeedleError::Resolve(ResolveError::NotFound { name }) if name == "sensor-1"
        ));
    }

    #[test]
    fn should_map_other_statuses_to_unreachable() {
        assert!(matches!(
            status(500).into_resolve("sensor-1"),
            NeedleError::Resolve(ResolveError::Unreachable { .. })
        ));
    }

    #[test]
    fn should_map_read_failures_to_query_store() {
        assert!(matches!(
            status(503).into_read(),
            NeedleError::Query(QueryError::Store(_))
        ));
    }

    #[test]
    fn should_map_tagged_read_failures_back_to_their_kind() {
        let empty = with_body(502, r#"{"error":"query failed","kind":"empty_result"}"#);
        assert!(matches!(
            empty.into_read(),
            NeedleError::Query(QueryError::EmptyResult)
        ));

        let missing = with_body(502, r#"{"error":"query failed","kind":"missing_count"}"#);
        assert!(matches!(
            missing.into_read(),
            NeedleError::Query(QueryError::MissingCount)
        ));

        let closed = with_body(503, r#"{"error":"sensor is closed","kind":"closed"}"#);
        assert!(matches!(closed.into_read(), NeedleError::Closed));
    }

    #[test]
    fn should_keep_store_error_for_untagged_or_transport_failures() {
        let tagged = with_body(502, r#"{"error":"timeout","kind":"query"}"#);
        assert!(matches!(
            tagged.into_read(),
            NeedleError::Query(QueryError::Store(_))
        ));
        assert!(matches!(
            with_body(502, "<html>bad gateway</html>").into_read(),
            NeedleError::Query(QueryError::Store(_))
        ));
    }
}
