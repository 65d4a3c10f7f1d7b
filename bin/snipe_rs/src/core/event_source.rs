use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    contract::parse_log,
    providers::{Middleware, Provider, ProviderError, StreamExt, Ws, WsClientError},
    types::{Address, BlockNumber, Filter},
};
use provider_utils::ws_providers::WsProviders;
use snipe_utils::abi::PairCreatedFilter;
use thiserror::Error;

use crate::{
    constants::{Env, PAIR_WAIT_TIMEOUT, WS_CONNECT_ATTEMPTS},
    types::PairCreatedEvent,
};

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error(transparent)]
    Ws(#[from] WsClientError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("event stream closed by provider")]
    StreamClosed,
}

/// One waiting consumer at a time. `Ok(None)` means the wait window elapsed
/// without a factory event, which is not an error.
#[async_trait]
pub trait EventSource: Send {
    async fn next_pair_created(&mut self) -> Result<Option<PairCreatedEvent>, ConnectionError>;
}

/// Factory watcher over a node websocket. The connection is established
/// lazily and dropped whenever the stream dies, so the next wait transparently
/// reconnects. Events emitted while disconnected are lost, best-effort only.
pub struct WsEventSource {
    ws_url: String,
    factory_address: Address,
    provider: Option<Arc<Provider<Ws>>>,
}

impl WsEventSource {
    pub fn new(env: &Env) -> Self {
        Self {
            ws_url: env.ws_url.clone(),
            factory_address: env.factory_address,
            provider: None,
        }
    }

    async fn ensure_provider(&mut self) -> Result<Arc<Provider<Ws>>, ConnectionError> {
        if let Some(provider) = &self.provider {
            return Ok(provider.clone());
        }

        let provider =
            Arc::new(WsProviders::connect_with_retry(&self.ws_url, WS_CONNECT_ATTEMPTS).await?);
        self.provider = Some(provider.clone());
        Ok(provider)
    }
}

#[async_trait]
impl EventSource for WsEventSource {
    async fn next_pair_created(&mut self) -> Result<Option<PairCreatedEvent>, ConnectionError> {
        let provider = self.ensure_provider().await?;
        let filter = Filter::new()
            .from_block(BlockNumber::Latest)
            .address(self.factory_address)
            .event("PairCreated(address,address,address,uint256)");

        let mut stream = match provider.subscribe_logs(&filter).await {
            Ok(stream) => stream,
            Err(err) => {
                self.provider = None;
                return Err(err.into());
            }
        };

        let deadline = tokio::time::sleep(PAIR_WAIT_TIMEOUT);
        tokio::pin!(deadline);

        let event = loop {
            tokio::select! {
                _ = &mut deadline => break None,
                log = stream.next() => {
                    let Some(log) = log else {
                        self.provider = None;
                        return Err(ConnectionError::StreamClosed);
                    };
                    // undecodable logs under the same topic are skipped, the
                    // wait window keeps running
                    let Ok(decoded) = parse_log::<PairCreatedFilter>(log) else {
                        continue;
                    };
                    break Some(PairCreatedEvent {
                        token0: decoded.token_0,
                        token1: decoded.token_1,
                        pair: decoded.pair,
                    });
                }
            }
        };

        // tear the registration down before handing the event over so no
        // stale listener observes a later event
        let _ = stream.unsubscribe().await;

        Ok(event)
    }
}
