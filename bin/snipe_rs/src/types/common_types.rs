use ethers::types::{Address, H256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TAX_PERCENT;

/// Decoded `PairCreated(address,address,address,uint256)` factory event.
/// The trailing all-pairs-length field is dropped at decode time.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PairCreatedEvent {
    pub token0: Address,
    pub token1: Address,
    pub pair: Address,
}

/// The non-reference side of a freshly created pair. Never equals the
/// reference asset, `filter_candidate` guarantees it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateToken {
    pub address: Address,
}

/// Reduced safety-oracle response for one candidate token.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    pub is_honeypot: bool,
    pub buy_tax_percent: Option<f64>,
    pub sell_tax_percent: Option<f64>,
}

impl SafetyVerdict {
    /// Accept unless the token is a honeypot or either tax exceeds the
    /// ceiling. A missing tax field passes, same policy as the scraped
    /// TokenSniffer response where the fields are frequently absent.
    pub fn is_acceptable(&self) -> bool {
        if self.is_honeypot {
            return false;
        }
        if self.buy_tax_percent.is_some_and(|tax| tax > MAX_TAX_PERCENT) {
            return false;
        }
        if self.sell_tax_percent.is_some_and(|tax| tax > MAX_TAX_PERCENT) {
            return false;
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// Always zero: no slippage floor, speed over price protection.
    pub amount_out_min: U256,
    pub recipient: Address,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutcome {
    pub tx_hash: H256,
    pub confirmed: bool,
    pub block_number: Option<U64>,
}
