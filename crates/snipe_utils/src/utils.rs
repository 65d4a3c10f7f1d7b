use std::fmt::LowerHex;

use ethers::{
    signers::{LocalWallet, Signer, WalletError},
    types::{transaction::eip2718::TypedTransaction, Bytes, TransactionRequest},
    utils::keccak256,
};

pub fn compute_transaction_hash(raw_tx: &Bytes) -> String {
    format!("0x{}", hex::encode(keccak256(raw_tx)))
}

pub fn to_legacy_tx(tx: TypedTransaction) -> TypedTransaction {
    match tx {
        TypedTransaction::Eip1559(inner) => {
            let tx: TransactionRequest = inner.into();
            TypedTransaction::Legacy(tx)
        }
        other => other,
    }
}

pub async fn to_signed_tx(
    wallet: &LocalWallet,
    tx: &TypedTransaction,
) -> Result<Bytes, WalletError> {
    let signature = wallet.sign_transaction(tx).await?;
    let signed = tx.rlp_signed(&signature);
    Ok(signed)
}

/// Load a signer from a raw hex private key, bound to the given chain id.
pub fn load_private_key_wallet(private_key: &str, chain_id: u64) -> Result<LocalWallet, WalletError> {
    let wallet: LocalWallet = private_key.trim_start_matches("0x").parse()?;
    Ok(wallet.with_chain_id(chain_id))
}

pub fn format_lower_hex(hash: &impl LowerHex) -> String {
    format!("{:#x}", hash)
}
