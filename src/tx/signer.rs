//! Transaction Signer
//!
//! Signs transaction envelopes with an ed25519 secret seed.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, WalletResult};
use crate::log_info;
use crate::stellar::{Keypair, TransactionEnvelope, XdrCodec};
use crate::types::Network;

/// Signed envelope and the network hash it was signed over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub signed_xdr: String,
    /// Hex transaction hash
    pub hash: String,
}

/// Hex hash of an envelope on `network`
pub fn transaction_hash(xdr: &str, network: Network) -> WalletResult<String> {
    let envelope = TransactionEnvelope::from_xdr_base64(xdr)?;
    Ok(hex::encode(envelope.hash(network.passphrase())))
}

/// Add a signature by `secret` (S...) to the envelope in `xdr`
pub fn sign_transaction(xdr: &str, secret: &str, network: Network) -> WalletResult<SignedTransaction> {
    let keypair = Keypair::from_secret(secret).map_err(|mut e| {
        e.code = ErrorCode::InvalidSecretKey;
        e.context("Cannot sign transaction")
    })?;
    let mut envelope = TransactionEnvelope::from_xdr_base64(xdr)?;
    let hash = envelope.hash(network.passphrase());

    envelope.add_signature(keypair.sign_decorated(&hash))?;
    log_info!(
        "signer",
        "Transaction signed",
        signer = keypair.public_key(),
        hash = hex::encode(hash),
        signatures = envelope.signatures().len()
    );

    Ok(SignedTransaction {
        signed_xdr: envelope.to_xdr_base64(),
        hash: hex::encode(hash),
    })
}

/// Operation as shown on the review screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub destination: Option<String>,
}

/// Decoded view of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub source_account: String,
    /// Stroops
    pub fee: u32,
    pub sequence: i64,
    pub memo: Option<String>,
    pub max_time: Option<u64>,
    pub operations: Vec<OperationSummary>,
    pub signatures: usize,
}

/// Decode `xdr` for review
pub fn decode_transaction(xdr: &str, network: Network) -> WalletResult<TransactionSummary> {
    let envelope = TransactionEnvelope::from_xdr_base64(xdr)?;
    let tx = envelope.transaction();
    Ok(TransactionSummary {
        hash: hex::encode(envelope.hash(network.passphrase())),
        source_account: tx.source_account.address(),
        fee: tx.fee,
        sequence: tx.seq_num,
        memo: tx.memo.value(),
        max_time: tx.time_bounds().map(|b| b.max_time),
        operations: tx
            .operations
            .iter()
            .map(|op| OperationSummary {
                kind: op.type_name().to_string(),
                destination: op.destination().map(|d| d.address()),
            })
            .collect(),
        signatures: envelope.signatures().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::keypair::verify;
    use crate::stellar::{Asset, Memo, MuxedAccount, Operation, TransactionBuilder};

    const SECRET: &str = "SCZANGBA5YHTNYVVV4C3U252E2B6P6F5T3U6MM63WBSBZATAQI3EBTQ4";

    fn unsigned_xdr(source: &str) -> String {
        let destination = MuxedAccount::from_address(
            "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
        )
        .unwrap();
        let tx = TransactionBuilder::new(MuxedAccount::from_address(source).unwrap(), 1, 100)
            .timeout(1_000, 180)
            .add_operation(Operation::payment(destination, Asset::Native, 10))
            .build()
            .unwrap();
        TransactionEnvelope::unsigned(tx).to_xdr_base64()
    }

    #[test]
    fn test_sign_transaction() {
        let keypair = Keypair::from_secret(SECRET).unwrap();
        let xdr = unsigned_xdr(&keypair.public_key());

        let signed = sign_transaction(&xdr, SECRET, Network::Testnet).unwrap();
        assert_eq!(signed.hash, transaction_hash(&xdr, Network::Testnet).unwrap());

        let envelope = TransactionEnvelope::from_xdr_base64(&signed.signed_xdr).unwrap();
        let signature = &envelope.signatures()[0];
        assert_eq!(signature.hint, keypair.account_id().hint());

        let hash = envelope.hash(Network::Testnet.passphrase());
        assert!(verify(&keypair.account_id(), &hash, &signature.signature).is_ok());
        assert!(verify(
            &keypair.account_id(),
            &envelope.hash(Network::Public.passphrase()),
            &signature.signature
        )
        .is_err());
    }

    #[test]
    fn test_sign_keeps_binary_memo_intact() {
        let keypair = Keypair::from_secret(SECRET).unwrap();
        let mut envelope = TransactionEnvelope::from_xdr_base64(&unsigned_xdr(&keypair.public_key())).unwrap();
        let TransactionEnvelope::Tx { tx, .. } = &mut envelope else {
            panic!("expected v1 envelope");
        };
        tx.memo = Memo::Text(vec![0xff; 20]);
        let xdr = envelope.to_xdr_base64();

        let signed = sign_transaction(&xdr, SECRET, Network::Testnet).unwrap();
        assert_eq!(signed.hash, transaction_hash(&xdr, Network::Testnet).unwrap());

        let decoded = TransactionEnvelope::from_xdr_base64(&signed.signed_xdr).unwrap();
        assert_eq!(decoded.transaction().memo, Memo::Text(vec![0xff; 20]));
        assert_eq!(decoded.transaction().to_xdr(), envelope.transaction().to_xdr());
    }

    #[test]
    fn test_invalid_secret() {
        let xdr = unsigned_xdr("GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7");
        let err = sign_transaction(&xdr, "SNOTASECRET", Network::Testnet).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSecretKey);
    }

    #[test]
    fn test_invalid_xdr() {
        assert!(sign_transaction("not-xdr", SECRET, Network::Testnet).is_err());
    }

    #[test]
    fn test_decode_transaction() {
        let keypair = Keypair::from_secret(SECRET).unwrap();
        let xdr = unsigned_xdr(&keypair.public_key());
        let signed = sign_transaction(&xdr, SECRET, Network::Testnet).unwrap();

        let summary = decode_transaction(&signed.signed_xdr, Network::Testnet).unwrap();
        assert_eq!(summary.hash, signed.hash);
        assert_eq!(summary.source_account, keypair.public_key());
        assert_eq!(summary.fee, 100);
        assert_eq!(summary.max_time, Some(1_180));
        assert_eq!(summary.signatures, 1);
        assert_eq!(summary.operations[0].kind, "payment");
        assert_eq!(
            summary.operations[0].destination.as_deref(),
            Some("GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H")
        );
    }
}
