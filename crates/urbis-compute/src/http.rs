//! Shared HTTP response helpers for the compute client.

use crate::error::ComputeError;

/// Map a non-success status to [`ComputeError::Api`], carrying the body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ComputeError> {
    if !resp.status().is_success() {
        return Err(ComputeError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let resp = mock_response(500, "definition failed to solve");
        let err = check_response(resp).await.unwrap_err();
        match err {
            ComputeError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "definition failed to solve");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn not_found_is_api_error() {
        let resp = mock_response(404, "");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, ComputeError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }
}
