use std::{
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use ethers::{
    types::{Address, U256},
    utils::parse_ether,
};
use snipe_utils::env::{get_env, get_env_address};

/// How long one cycle waits for a qualifying PairCreated event.
pub const PAIR_WAIT_TIMEOUT: Duration = Duration::from_secs(60);
/// Pacing delay between cycles, whatever the previous cycle's outcome.
pub const COOLDOWN_DELAY: Duration = Duration::from_secs(5);
/// Upper bound on one safety-oracle round trip.
pub const ORACLE_TIMEOUT: Duration = Duration::from_secs(30);
/// How long a submitted swap may stay pending before it is reported
/// as unconfirmed. Matches the on-chain deadline window.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
/// Router deadline, seconds past submission time.
pub const SWAP_DEADLINE_SECS: u64 = 120;
pub const SNIPE_GAS_LIMIT: u64 = 500_000;
/// Buy/sell tax ceiling, percent. Above this the token is rejected.
pub const MAX_TAX_PERCENT: f64 = 10.0;
pub const WS_CONNECT_ATTEMPTS: usize = 5;

pub const DEFAULT_TOKEN_SNIFFER_URL: &str = "https://tokensniffer.com/TokenSnifferAPI";

#[derive(Debug, Clone, Default)]
pub struct Env {
    pub ws_url: String,
    pub private_key: String,
    pub weth_address: Address,
    pub router_address: Address,
    pub factory_address: Address,
    pub token_sniffer_url: String,
    pub token_sniffer_api_key: String,
    pub snipe_eth_amount: U256,
    pub exit: Arc<AtomicBool>,
}

impl Env {
    pub fn new() -> Self {
        let snipe_eth_amount_str = get_env("SNIPE_ETH_AMOUNT", Some("0.001".to_string()));
        let Ok(snipe_eth_amount) = parse_ether(&snipe_eth_amount_str) else {
            panic!("SNIPE_ETH_AMOUNT {:?} invalid", snipe_eth_amount_str);
        };

        Self {
            ws_url: get_env("WS_URL", None),
            private_key: get_env("PRIVATE_KEY", None),
            weth_address: get_env_address("WETH_ADDRESS"),
            router_address: get_env_address("ROUTER_ADDRESS"),
            factory_address: get_env_address("FACTORY_ADDRESS"),
            token_sniffer_url: get_env(
                "TOKEN_SNIFFER_URL",
                Some(DEFAULT_TOKEN_SNIFFER_URL.to_string()),
            ),
            token_sniffer_api_key: get_env("TOKEN_SNIFFER_API_KEY", None),
            snipe_eth_amount,
            exit: Arc::new(AtomicBool::new(false)),
        }
    }
}
