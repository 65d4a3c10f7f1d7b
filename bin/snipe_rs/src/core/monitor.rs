use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::anyhow;
use ethers::types::{Address, U256};

use crate::{
    constants::{Env, COOLDOWN_DELAY},
    core::{filter_candidate, EventSource, SafetyOracle, SwapExecutor},
    types::{SwapOutcome, SwapRequest},
};

async fn watch_exit(exit: &AtomicBool) {
    while !exit.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Where a cycle ended. Every variant funnels into the same cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No factory event within the wait window.
    NoPair,
    /// Event wait aborted by a provider/stream failure; the source
    /// reconnects on the next cycle.
    ConnectionFailed,
    /// The pair does not involve the reference asset.
    NoCandidate,
    /// Safety verdict said no, or the oracle failed (fail closed).
    Rejected,
    /// Swap submitted but reverted, ran out of gas, or never confirmed.
    ExecutionFailed,
    Sniped(SwapOutcome),
}

/// Drives detect → filter → verify → execute serially, forever. At most one
/// cycle is in flight; per-cycle state is dropped at cycle end.
pub struct MonitorLoop<S, O, X> {
    source: S,
    oracle: O,
    executor: X,
    reference_asset: Address,
    recipient: Address,
    snipe_eth_amount: U256,
    cooldown: Duration,
    exit: Arc<AtomicBool>,
}

impl<S, O, X> MonitorLoop<S, O, X>
where
    S: EventSource,
    O: SafetyOracle,
    X: SwapExecutor,
{
    pub fn new(env: &Env, source: S, oracle: O, executor: X, recipient: Address) -> Self {
        Self {
            source,
            oracle,
            executor,
            reference_asset: env.weth_address,
            recipient,
            snipe_eth_amount: env.snipe_eth_amount,
            cooldown: COOLDOWN_DELAY,
            exit: env.exit.clone(),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            if self.exit.load(Ordering::Relaxed) {
                return Err(anyhow!("[MonitorLoop] exit={:?}", self.exit));
            }

            let exit = self.exit.clone();
            tokio::select! {
                outcome = self.run_cycle() => {
                    log::info!(
                        "[MonitorLoop] cycle finished, outcome={:?}, cooling down {:?}",
                        outcome,
                        self.cooldown
                    );
                }
                _ = watch_exit(&exit) => {
                    log::info!("[MonitorLoop] exit raised mid-cycle");
                    continue;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.cooldown) => {}
                _ = watch_exit(&self.exit) => {}
            }
        }
    }

    /// One WAITING_FOR_PAIR → FILTERING → VERIFYING → EXECUTING pass.
    /// Every stage catches its own failures; nothing escapes to the caller,
    /// so the loop around this can never die mid-flight.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let event = match self.source.next_pair_created().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                log::info!("[MonitorLoop] no new pair within the wait window");
                return CycleOutcome::NoPair;
            }
            Err(err) => {
                log::warn!("[MonitorLoop] event wait failed, err={:?}", err);
                return CycleOutcome::ConnectionFailed;
            }
        };
        log::info!(
            "[MonitorLoop] pair created, token0={:?}, token1={:?}, pair={:?}",
            event.token0,
            event.token1,
            event.pair
        );

        let Some(candidate) = filter_candidate(&event, self.reference_asset) else {
            log::info!(
                "[MonitorLoop] pair {:?} does not involve the reference asset, skipped",
                event.pair
            );
            return CycleOutcome::NoCandidate;
        };

        let verdict = match self.oracle.assess(&candidate).await {
            Ok(verdict) => verdict,
            Err(err) => {
                // a broken oracle must never cause a blind buy
                log::warn!(
                    "[MonitorLoop] oracle failed for token {:?}, rejecting, err={:?}",
                    candidate.address,
                    err
                );
                return CycleOutcome::Rejected;
            }
        };
        if !verdict.is_acceptable() {
            log::info!(
                "[MonitorLoop] token {:?} failed safety checks, verdict={:?}",
                candidate.address,
                verdict
            );
            return CycleOutcome::Rejected;
        }

        let swap = SwapRequest {
            token_in: self.reference_asset,
            token_out: candidate.address,
            amount_in: self.snipe_eth_amount,
            amount_out_min: U256::zero(),
            recipient: self.recipient,
        };
        match self.executor.execute(&swap).await {
            Ok(outcome) => {
                log::info!(
                    "[MonitorLoop] sniped token {:?}, tx_hash={:?}, block={:?}",
                    candidate.address,
                    outcome.tx_hash,
                    outcome.block_number
                );
                CycleOutcome::Sniped(outcome)
            }
            Err(err) => {
                log::warn!(
                    "[MonitorLoop] swap failed for token {:?}, err={:?}",
                    candidate.address,
                    err
                );
                CycleOutcome::ExecutionFailed
            }
        }
    }
}
