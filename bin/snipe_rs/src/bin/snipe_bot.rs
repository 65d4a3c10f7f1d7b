use std::sync::{atomic::Ordering, Arc};

use provider_utils::ws_providers::WsProviders;
use snipe_rs::{
    constants::{Env, WS_CONNECT_ATTEMPTS},
    core::{MonitorLoop, TokenSnifferClient, UniswapV2Executor, WsEventSource},
};
use snipe_utils::log::setup_logger;
use tokio::task::JoinSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    // missing or malformed configuration panics here, before the loop starts
    let env = Env::new();
    let exit = env.exit.clone();

    let provider =
        Arc::new(WsProviders::connect_with_retry(&env.ws_url, WS_CONNECT_ATTEMPTS).await?);
    let executor = UniswapV2Executor::init(&env, provider).await?;
    let recipient = executor.wallet_address();
    let source = WsEventSource::new(&env);
    let oracle = TokenSnifferClient::new(&env);
    let monitor = MonitorLoop::new(&env, source, oracle, executor, recipient);

    let mut set = JoinSet::new();
    {
        let exit = exit.clone();
        set.spawn(async move {
            tokio::signal::ctrl_c().await?;
            log::info!("ctrl-c received, shutting down");
            exit.store(true, Ordering::Relaxed);
            Ok(())
        });
    }
    set.spawn(monitor.run());

    while let Some(res) = set.join_next().await {
        log::error!("program exited, res {:?}", res);
        // gracefully shutdown
        exit.store(true, Ordering::Relaxed);
    }

    Ok(())
}
