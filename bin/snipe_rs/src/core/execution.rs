use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use ethers::{
    providers::{Middleware, Provider, ProviderError, Ws},
    signers::{LocalWallet, Signer, WalletError},
    types::{
        transaction::eip2718::TypedTransaction, Address, TransactionReceipt, H256, U256, U64,
    },
    utils::keccak256,
};
use snipe_utils::{
    abi::UniswapV2Router02Abigen,
    utils::{compute_transaction_hash, load_private_key_wallet, to_legacy_tx, to_signed_tx},
};
use thiserror::Error;
use tokio::time::timeout;

use crate::{
    constants::{Env, CONFIRMATION_TIMEOUT, SNIPE_GAS_LIMIT, SWAP_DEADLINE_SECS},
    types::{SwapOutcome, SwapRequest},
};

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("swap reverted on-chain, tx_hash={0:?}")]
    Reverted(H256),
    #[error("swap exhausted its gas budget, tx_hash={0:?}")]
    GasExhausted(H256),
    /// The transaction may still be in the mempool. It is never resubmitted
    /// automatically; the operator decides what to do with the stuck intent.
    #[error("swap not confirmed within the wait window, tx_hash={0:?}")]
    Unconfirmed(H256),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute(&self, swap: &SwapRequest) -> Result<SwapOutcome, ExecutionError>;
}

/// Submits bounded-gas `swapExactETHForTokens` transactions along
/// [reference, candidate] and waits for one confirmation. Success means a
/// mined, non-reverted receipt, nothing less.
#[derive(Debug, Clone)]
pub struct UniswapV2Executor {
    provider: Arc<Provider<Ws>>,
    wallet: LocalWallet,
    router_address: Address,
    chain_id: U64,
}

impl UniswapV2Executor {
    /// Fails fast when the node or the router is unusable; this runs before
    /// the monitor loop starts.
    pub async fn init(env: &Env, provider: Arc<Provider<Ws>>) -> anyhow::Result<Self> {
        let chain_id = provider.get_chainid().await?;
        let wallet = load_private_key_wallet(&env.private_key, chain_id.as_u64())?;

        let router = UniswapV2Router02Abigen::new(env.router_address, provider.clone());
        let factory = router.factory().call().await?;
        log::info!(
            "[UniswapV2Executor] initialized, chain_id={}, wallet={:?}, router factory={:?}",
            chain_id,
            wallet.address(),
            factory
        );

        Ok(Self {
            provider,
            wallet,
            router_address: env.router_address,
            chain_id: U64::from(chain_id.as_u64()),
        })
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl SwapExecutor for UniswapV2Executor {
    async fn execute(&self, swap: &SwapRequest) -> Result<SwapOutcome, ExecutionError> {
        let router = UniswapV2Router02Abigen::new(self.router_address, self.provider.clone());
        let (gas_price, nonce) = tokio::join!(
            self.provider.get_gas_price(),
            self.provider
                .get_transaction_count(self.wallet.address(), None)
        );
        let (gas_price, nonce) = (gas_price?, nonce?);

        let deadline = U256::from(Utc::now().timestamp() as u64 + SWAP_DEADLINE_SECS);
        let mut tx: TypedTransaction = router
            .swap_exact_eth_for_tokens(
                swap.amount_out_min,
                vec![swap.token_in, swap.token_out],
                swap.recipient,
                deadline,
            )
            .tx;
        tx.set_chain_id(self.chain_id);
        tx.set_from(self.wallet.address());
        tx.set_nonce(nonce);
        tx.set_value(swap.amount_in);
        tx.set_gas(U256::from(SNIPE_GAS_LIMIT));
        tx.set_gas_price(gas_price);

        let swap_tx = to_legacy_tx(tx);
        let signed_tx = to_signed_tx(&self.wallet, &swap_tx).await?;
        let tx_hash = H256::from(keccak256(&signed_tx));
        log::info!(
            "[UniswapV2Executor] submitting swap, token_out={:?}, amount_in={:?}, tx_hash={}",
            swap.token_out,
            swap.amount_in,
            compute_transaction_hash(&signed_tx),
        );

        let pending = self.provider.send_raw_transaction(signed_tx).await?;
        let Ok(receipt) = timeout(CONFIRMATION_TIMEOUT, pending).await else {
            return Err(ExecutionError::Unconfirmed(tx_hash));
        };
        let Some(receipt) = receipt? else {
            // dropped from the mempool without a receipt
            return Err(ExecutionError::Unconfirmed(tx_hash));
        };

        classify_receipt(receipt)
    }
}

/// Map a mined receipt onto the swap outcome. Status 0 with the whole gas
/// budget burned is an out-of-gas failure, any other status-0 receipt a
/// revert.
pub fn classify_receipt(receipt: TransactionReceipt) -> Result<SwapOutcome, ExecutionError> {
    if receipt.status == Some(U64::zero()) {
        if receipt.gas_used == Some(U256::from(SNIPE_GAS_LIMIT)) {
            return Err(ExecutionError::GasExhausted(receipt.transaction_hash));
        }
        return Err(ExecutionError::Reverted(receipt.transaction_hash));
    }

    Ok(SwapOutcome {
        tx_hash: receipt.transaction_hash,
        confirmed: true,
        block_number: receipt.block_number,
    })
}
