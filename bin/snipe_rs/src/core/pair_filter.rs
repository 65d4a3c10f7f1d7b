use ethers::types::Address;

use crate::types::{CandidateToken, PairCreatedEvent};

/// Pick the candidate out of a newly created pair. Exactly one side must be
/// the reference asset; the other side becomes the candidate. Pairs that do
/// not touch the reference asset, and the degenerate reference/reference
/// pair, yield no candidate.
pub fn filter_candidate(
    event: &PairCreatedEvent,
    reference_asset: Address,
) -> Option<CandidateToken> {
    let is_reference_token0 = event.token0 == reference_asset;
    let is_reference_token1 = event.token1 == reference_asset;

    match (is_reference_token0, is_reference_token1) {
        (true, false) => Some(CandidateToken {
            address: event.token1,
        }),
        (false, true) => Some(CandidateToken {
            address: event.token0,
        }),
        _ => None,
    }
}
