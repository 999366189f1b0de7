use eyre::Report;
use primitives::retries::retry_with_backoff_if;
use reqwest::{Error as ReqwestError, StatusCode};
use tracing::warn;

/// Timeouts, connection failures, server errors and rate limiting are worth
/// another attempt. Anything else is final.
fn is_retryable(err: &Report) -> bool {
    let Some(req_err) = err.downcast_ref::<ReqwestError>() else {
        return false;
    };
    if req_err.is_timeout() || req_err.is_connect() {
        return true;
    }
    req_err
        .status()
        .is_some_and(|status| status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS)
}

/// Run `op`, retrying retryable failures with exponential backoff.
pub(crate) async fn retry_op<F, Fut, T>(op: F) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = eyre::Result<T>>,
{
    retry_with_backoff_if(op, |err: &Report| {
        let retry = is_retryable(err);
        if retry {
            warn!(error = %err, "hypersync request failed, retrying");
        }
        retry
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::Client;

    async fn status_error(status: usize) -> Report {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", "/height").with_status(status).create_async().await;
        let url = format!("{}/height", server.url());
        let resp = Client::new().get(url).send().await.unwrap();
        Report::from(resp.error_for_status().unwrap_err())
    }

    #[tokio::test]
    async fn server_errors_and_rate_limits_are_retryable() {
        assert!(is_retryable(&status_error(503).await));
        assert!(is_retryable(&status_error(429).await));
        assert!(!is_retryable(&status_error(401).await));
    }

    #[test]
    fn other_errors_are_final() {
        assert!(!is_retryable(&eyre::eyre!("bad payload")));
    }

    #[tokio::test]
    async fn retries_until_the_server_recovers() {
        let mut server = Server::new_async().await;
        let failing = server.mock("GET", "/").with_status(502).expect(2).create_async().await;
        let url = server.url();
        let client = Client::new();

        let mut attempt = 0;
        let result = retry_op(|| {
            attempt += 1;
            let (client, url) = (client.clone(), url.clone());
            let n = attempt;
            async move {
                if n <= 2 {
                    client.get(url).send().await?.error_for_status()?;
                }
                Ok::<_, Report>(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        failing.assert_async().await;
    }
}
