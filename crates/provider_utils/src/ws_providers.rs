use std::time::Duration;

use ethers::providers::{Provider, Ws, WsClientError};

pub struct WsProviders;

impl WsProviders {
    pub async fn connect(ws_url: &str) -> Result<Provider<Ws>, WsClientError> {
        let ws = Ws::connect(ws_url).await?;
        Ok(Provider::new(ws))
    }

    /// Connect with a capped linear backoff between attempts. Used wherever a
    /// dropped websocket must be replaced before the next subscription.
    pub async fn connect_with_retry(
        ws_url: &str,
        max_attempts: usize,
    ) -> Result<Provider<Ws>, WsClientError> {
        let mut last_err = None;
        for attempt in 1..=max_attempts {
            match Self::connect(ws_url).await {
                Ok(provider) => return Ok(provider),
                Err(err) => {
                    log::warn!(
                        "[WsProviders] connect attempt {}/{} failed, err={:?}",
                        attempt,
                        max_attempts,
                        err
                    );
                    last_err = Some(err);
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(Duration::from_secs(attempt.min(5) as u64)).await;
            }
        }

        Err(last_err.expect("max_attempts > 0"))
    }
}
