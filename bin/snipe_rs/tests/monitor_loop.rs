use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethers::types::{Address, H256, U256, U64};
use snipe_rs::{
    constants::Env,
    core::{
        ConnectionError, CycleOutcome, EventSource, ExecutionError, MonitorLoop, OracleError,
        SafetyOracle, SwapExecutor,
    },
    types::{CandidateToken, PairCreatedEvent, SafetyVerdict, SwapOutcome, SwapRequest},
};
use tokio::sync::Mutex;

fn addr(byte: u8) -> Address {
    Address::from_low_u64_be(byte as u64)
}

fn test_env(reference: Address) -> Env {
    Env {
        weth_address: reference,
        snipe_eth_amount: U256::exp10(15),
        ..Default::default()
    }
}

fn pair_event(token0: Address, token1: Address) -> PairCreatedEvent {
    PairCreatedEvent {
        token0,
        token1,
        pair: addr(0xee),
    }
}

fn clean_verdict() -> SafetyVerdict {
    SafetyVerdict {
        is_honeypot: false,
        buy_tax_percent: Some(3.0),
        sell_tax_percent: Some(3.0),
    }
}

fn confirmed_outcome() -> SwapOutcome {
    SwapOutcome {
        tx_hash: H256::repeat_byte(0x11),
        confirmed: true,
        block_number: Some(U64::from(1234)),
    }
}

/// Replays a scripted sequence of event-wait results; an exhausted script
/// behaves like an endless quiet chain (timeouts).
struct ScriptedSource {
    script: VecDeque<Result<Option<PairCreatedEvent>, ConnectionError>>,
    waits: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Option<PairCreatedEvent>, ConnectionError>>) -> Self {
        Self {
            script: script.into(),
            waits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_pair_created(&mut self) -> Result<Option<PairCreatedEvent>, ConnectionError> {
        self.waits.fetch_add(1, Ordering::Relaxed);
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

struct ScriptedOracle {
    script: Mutex<VecDeque<Result<SafetyVerdict, OracleError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    fn new(script: Vec<Result<SafetyVerdict, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SafetyOracle for ScriptedOracle {
    async fn assess(&self, _token: &CandidateToken) -> Result<SafetyVerdict, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(OracleError::Unparseable))
    }
}

struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<SwapOutcome, ExecutionError>>>,
    submissions: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<SwapRequest>>>,
}

impl ScriptedExecutor {
    fn new(script: Vec<Result<SwapOutcome, ExecutionError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            submissions: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl SwapExecutor for ScriptedExecutor {
    async fn execute(&self, swap: &SwapRequest) -> Result<SwapOutcome, ExecutionError> {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().await = Some(*swap);
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(ExecutionError::Unconfirmed(H256::zero())))
    }
}

#[tokio::test]
async fn quiet_wait_window_reaches_cooldown_without_oracle_or_executor() {
    let reference = addr(9);
    let source = ScriptedSource::new(vec![Ok(None)]);
    let oracle = ScriptedOracle::new(vec![]);
    let executor = ScriptedExecutor::new(vec![]);
    let waits = source.waits.clone();
    let (oracle_calls, submissions) = (oracle.calls.clone(), executor.submissions.clone());

    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    assert_eq!(monitor.run_cycle().await, CycleOutcome::NoPair);
    assert_eq!(waits.load(Ordering::Relaxed), 1);
    assert_eq!(oracle_calls.load(Ordering::Relaxed), 0);
    assert_eq!(submissions.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn end_to_end_snipe_builds_the_expected_swap() {
    let reference = addr(9);
    let token_x = addr(2);
    let recipient = addr(0xaa);
    let env = test_env(reference);

    let source = ScriptedSource::new(vec![Ok(Some(pair_event(reference, token_x)))]);
    let oracle = ScriptedOracle::new(vec![Ok(clean_verdict())]);
    let executor = ScriptedExecutor::new(vec![Ok(confirmed_outcome())]);
    let submissions = executor.submissions.clone();
    let last_request = executor.last_request.clone();

    let mut monitor = MonitorLoop::new(&env, source, oracle, executor, recipient);
    let outcome = monitor.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::Sniped(confirmed_outcome()));
    assert_eq!(submissions.load(Ordering::Relaxed), 1);
    let request = last_request.lock().await.unwrap();
    assert_eq!(request.token_in, reference);
    assert_eq!(request.token_out, token_x);
    assert_eq!(request.amount_in, env.snipe_eth_amount);
    assert_eq!(request.amount_out_min, U256::zero());
    assert_eq!(request.recipient, recipient);
}

#[tokio::test]
async fn oracle_failure_rejects_and_never_buys() {
    let reference = addr(9);
    let source = ScriptedSource::new(vec![Ok(Some(pair_event(reference, addr(2))))]);
    let oracle = ScriptedOracle::new(vec![Err(OracleError::Unparseable)]);
    let executor = ScriptedExecutor::new(vec![Ok(confirmed_outcome())]);
    let submissions = executor.submissions.clone();

    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    assert_eq!(monitor.run_cycle().await, CycleOutcome::Rejected);
    assert_eq!(submissions.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn honeypot_verdict_skips_execution() {
    let reference = addr(9);
    let source = ScriptedSource::new(vec![Ok(Some(pair_event(addr(2), reference)))]);
    let oracle = ScriptedOracle::new(vec![Ok(SafetyVerdict {
        is_honeypot: true,
        ..Default::default()
    })]);
    let executor = ScriptedExecutor::new(vec![Ok(confirmed_outcome())]);
    let submissions = executor.submissions.clone();

    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    assert_eq!(monitor.run_cycle().await, CycleOutcome::Rejected);
    assert_eq!(submissions.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn reverted_swap_ends_the_cycle_without_crashing() {
    let reference = addr(9);
    let source = ScriptedSource::new(vec![Ok(Some(pair_event(reference, addr(2))))]);
    let oracle = ScriptedOracle::new(vec![Ok(clean_verdict())]);
    let executor =
        ScriptedExecutor::new(vec![Err(ExecutionError::Reverted(H256::repeat_byte(0xab)))]);

    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    assert_eq!(monitor.run_cycle().await, CycleOutcome::ExecutionFailed);
}

#[tokio::test]
async fn unconfirmed_swap_is_submitted_exactly_once() {
    let reference = addr(9);
    let source = ScriptedSource::new(vec![Ok(Some(pair_event(reference, addr(2))))]);
    let oracle = ScriptedOracle::new(vec![Ok(clean_verdict())]);
    let executor = ScriptedExecutor::new(vec![Err(ExecutionError::Unconfirmed(
        H256::repeat_byte(0xab),
    ))]);
    let submissions = executor.submissions.clone();

    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    assert_eq!(monitor.run_cycle().await, CycleOutcome::ExecutionFailed);
    assert_eq!(submissions.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn thousand_mixed_cycles_never_stall() {
    let reference = addr(9);
    let mut source_script = Vec::new();
    let mut oracle_script = Vec::new();
    let mut executor_script = Vec::new();
    let mut expected = Vec::new();

    for i in 0..1000usize {
        match i % 5 {
            0 => {
                source_script.push(Ok(None));
                expected.push(CycleOutcome::NoPair);
            }
            1 => {
                source_script.push(Err(ConnectionError::StreamClosed));
                expected.push(CycleOutcome::ConnectionFailed);
            }
            2 => {
                source_script.push(Ok(Some(pair_event(addr(3), addr(4)))));
                expected.push(CycleOutcome::NoCandidate);
            }
            3 => {
                source_script.push(Ok(Some(pair_event(reference, addr(2)))));
                oracle_script.push(Ok(SafetyVerdict {
                    is_honeypot: true,
                    ..Default::default()
                }));
                expected.push(CycleOutcome::Rejected);
            }
            _ => {
                source_script.push(Ok(Some(pair_event(reference, addr(2)))));
                oracle_script.push(Ok(clean_verdict()));
                if i % 2 == 0 {
                    executor_script.push(Ok(confirmed_outcome()));
                    expected.push(CycleOutcome::Sniped(confirmed_outcome()));
                } else {
                    executor_script
                        .push(Err(ExecutionError::Reverted(H256::repeat_byte(0xab))));
                    expected.push(CycleOutcome::ExecutionFailed);
                }
            }
        }
    }

    let source = ScriptedSource::new(source_script);
    let oracle = ScriptedOracle::new(oracle_script);
    let executor = ScriptedExecutor::new(executor_script);
    let mut monitor = MonitorLoop::new(&test_env(reference), source, oracle, executor, addr(0xaa));

    for (i, expected_outcome) in expected.into_iter().enumerate() {
        let outcome = tokio::time::timeout(Duration::from_secs(1), monitor.run_cycle())
            .await
            .unwrap_or_else(|_| panic!("cycle {} stalled", i));
        assert_eq!(outcome, expected_outcome, "cycle {}", i);
    }
}

/// An endlessly quiet chain: the event wait never resolves.
struct SilentSource;

#[async_trait]
impl EventSource for SilentSource {
    async fn next_pair_created(&mut self) -> Result<Option<PairCreatedEvent>, ConnectionError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn exit_interrupts_a_blocked_event_wait() {
    let env = test_env(addr(9));
    let exit = env.exit.clone();

    let monitor = MonitorLoop::new(
        &env,
        SilentSource,
        ScriptedOracle::new(vec![]),
        ScriptedExecutor::new(vec![]),
        addr(0xaa),
    );

    let handle = tokio::spawn(monitor.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    exit.store(true, Ordering::Relaxed);

    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("run stayed blocked in the event wait after exit")
        .expect("join failed");
    assert!(result.is_err());
}

#[tokio::test]
async fn exit_interrupts_the_cooldown() {
    let env = test_env(addr(9));
    let exit = env.exit.clone();

    let monitor = MonitorLoop::new(
        &env,
        ScriptedSource::new(vec![Ok(None)]),
        ScriptedOracle::new(vec![]),
        ScriptedExecutor::new(vec![]),
        addr(0xaa),
    )
    .with_cooldown(Duration::from_secs(60));

    let handle = tokio::spawn(monitor.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    exit.store(true, Ordering::Relaxed);

    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("run slept through the whole cooldown after exit")
        .expect("join failed");
    assert!(result.is_err());
}

#[tokio::test]
async fn run_stops_once_the_exit_flag_is_raised() {
    let reference = addr(9);
    let env = test_env(reference);
    let exit = env.exit.clone();

    let source = ScriptedSource::new(vec![]);
    let oracle = ScriptedOracle::new(vec![]);
    let executor = ScriptedExecutor::new(vec![]);
    let monitor = MonitorLoop::new(&env, source, oracle, executor, addr(0xaa))
        .with_cooldown(Duration::ZERO);

    let handle = tokio::spawn(monitor.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    exit.store(true, Ordering::Relaxed);

    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("run did not observe the exit flag")
        .expect("join failed");
    assert!(result.is_err());
}
