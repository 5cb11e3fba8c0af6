//! Mapping from reqwest outcomes to `TransportError`.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::resilience::{Dependency, NetworkOrigin, TransportError};

const MAX_ERROR_BODY: usize = 512;

/// Classifies a failed send.
pub fn classify_reqwest_error(dependency: Dependency, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        return TransportError::Network {
            dependency,
            message: format!("request timed out: {}", error),
            origin: NetworkOrigin::Dependency,
        };
    }
    if error.is_decode() {
        return TransportError::shape(dependency, error.to_string());
    }
    if let Some(status) = error.status() {
        return classify_status(dependency, status, String::new());
    }
    if error.is_connect() {
        return TransportError::network(dependency, format!("connection failed: {}", error));
    }
    TransportError::network(dependency, error.to_string())
}

/// Classifies a non-success status.
///
/// 407 and 511 come from a proxy or captive portal between us and the
/// upstream, not from the upstream itself.
pub fn classify_status(dependency: Dependency, status: StatusCode, body: String) -> TransportError {
    match status {
        StatusCode::PROXY_AUTHENTICATION_REQUIRED | StatusCode::NETWORK_AUTHENTICATION_REQUIRED => {
            TransportError::Network {
                dependency,
                message: format!("intercepted by network intermediary (HTTP {})", status.as_u16()),
                origin: NetworkOrigin::ThirdParty,
            }
        }
        _ => TransportError::from_status(dependency, status.as_u16(), body),
    }
}

/// Fails on non-success statuses, keeping a truncated body for diagnostics.
pub async fn ensure_success(dependency: Dependency, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(classify_status(dependency, status, body))
}

/// Checks the status, then decodes the body as `T`.
///
/// A body that is not JSON, or JSON of the wrong shape, is a `Shape` error.
pub async fn decode_json<T: DeserializeOwned>(
    dependency: Dependency,
    response: Response,
) -> Result<T, TransportError> {
    let response = ensure_success(dependency, response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_reqwest_error(dependency, e))?;
    parse_json(dependency, &bytes)
}

pub fn parse_json<T: DeserializeOwned>(dependency: Dependency, bytes: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let preview: String = String::from_utf8_lossy(bytes).chars().take(80).collect();
        TransportError::shape(dependency, format!("{} (body starts with {:?})", e, preview))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        #[allow(dead_code)]
        id: u64,
    }

    #[test]
    fn html_body_is_a_shape_error() {
        let err = parse_json::<Vec<Item>>(Dependency::Functions, b"<!DOCTYPE html><html>")
            .unwrap_err();
        assert!(matches!(err, TransportError::Shape { .. }));
    }

    #[test]
    fn wrong_json_shape_is_a_shape_error() {
        let err = parse_json::<Vec<Item>>(Dependency::Functions, br#"{"error":"nope"}"#).unwrap_err();
        assert!(matches!(err, TransportError::Shape { .. }));
    }

    #[test]
    fn valid_json_decodes() {
        let items = parse_json::<Vec<Item>>(Dependency::Functions, br#"[{"id":1},{"id":2}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn captive_portal_is_third_party() {
        let err = classify_status(
            Dependency::Commerce,
            StatusCode::NETWORK_AUTHENTICATION_REQUIRED,
            String::new(),
        );
        assert!(matches!(
            err,
            TransportError::Network {
                origin: NetworkOrigin::ThirdParty,
                ..
            }
        ));
    }

    #[test]
    fn forbidden_is_auth() {
        let err = classify_status(Dependency::Commerce, StatusCode::FORBIDDEN, String::new());
        assert!(err.is_auth());
    }
}
