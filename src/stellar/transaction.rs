//! Transactions, envelopes and the transaction builder

use sha2::{Digest, Sha256};

use super::account::{AccountId, MuxedAccount};
use super::invocation::SorobanTransactionData;
use super::operation::{Operation, OperationBody};
use super::xdr::{XdrCodec, XdrReader, XdrWriter};
use crate::error::{WalletError, WalletResult};

pub const MAX_OPERATIONS: u32 = 100;
pub const MAX_MEMO_TEXT_LEN: usize = 28;
const MAX_SIGNATURES: u32 = 20;

const ENVELOPE_TYPE_TX_V0: u32 = 0;
pub(crate) const ENVELOPE_TYPE_TX: u32 = 2;
const ENVELOPE_TYPE_TX_FEE_BUMP: u32 = 5;

/// sha256 of the network passphrase
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

fn signature_payload_hash(passphrase: &str, envelope_type: u32, tagged: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(network_id(passphrase));
    hasher.update(envelope_type.to_be_bytes());
    hasher.update(tagged);
    hasher.finalize().into()
}

// =============================================================================
// Memo
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Memo {
    #[default]
    None,
    /// Raw bytes; memo text is not required to be UTF-8
    Text(Vec<u8>),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    pub fn text(text: &str) -> WalletResult<Self> {
        if text.len() > MAX_MEMO_TEXT_LEN {
            return Err(WalletError::invalid_input(format!(
                "Memo text must be at most {} bytes",
                MAX_MEMO_TEXT_LEN
            )));
        }
        Ok(Memo::Text(text.as_bytes().to_vec()))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Memo::None)
    }

    /// Memo rendered as a string; hashes are hex
    pub fn value(&self) -> Option<String> {
        match self {
            Memo::None => None,
            Memo::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
            Memo::Id(id) => Some(id.to_string()),
            Memo::Hash(hash) | Memo::Return(hash) => Some(hex::encode(hash)),
        }
    }
}

impl XdrCodec for Memo {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Memo::None => w.u32(0),
            Memo::Text(text) => {
                w.u32(1);
                w.var(text);
            }
            Memo::Id(id) => {
                w.u32(2);
                w.u64(*id);
            }
            Memo::Hash(hash) => {
                w.u32(3);
                w.fixed(hash);
            }
            Memo::Return(hash) => {
                w.u32(4);
                w.fixed(hash);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            0 => Ok(Memo::None),
            1 => {
                Ok(Memo::Text(r.var(MAX_MEMO_TEXT_LEN as u32)?))
            }
            2 => Ok(Memo::Id(r.u64()?)),
            3 => Ok(Memo::Hash(r.fixed::<32>()?)),
            4 => Ok(Memo::Return(r.fixed::<32>()?)),
            t => Err(WalletError::xdr_error(format!("Unknown memo type {}", t))),
        }
    }
}

// =============================================================================
// Preconditions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    /// 0 means no upper bound
    pub max_time: u64,
}

impl XdrCodec for TimeBounds {
    fn encode(&self, w: &mut XdrWriter) {
        w.u64(self.min_time);
        w.u64(self.max_time);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        Ok(Self {
            min_time: r.u64()?,
            max_time: r.u64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerBounds {
    pub min_ledger: u32,
    pub max_ledger: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    Ed25519SignedPayload { key: [u8; 32], payload: Vec<u8> },
}

impl XdrCodec for SignerKey {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            SignerKey::Ed25519(key) => {
                w.u32(0);
                w.fixed(key);
            }
            SignerKey::PreAuthTx(hash) => {
                w.u32(1);
                w.fixed(hash);
            }
            SignerKey::HashX(hash) => {
                w.u32(2);
                w.fixed(hash);
            }
            SignerKey::Ed25519SignedPayload { key, payload } => {
                w.u32(3);
                w.fixed(key);
                w.var(payload);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            0 => Ok(SignerKey::Ed25519(r.fixed::<32>()?)),
            1 => Ok(SignerKey::PreAuthTx(r.fixed::<32>()?)),
            2 => Ok(SignerKey::HashX(r.fixed::<32>()?)),
            3 => Ok(SignerKey::Ed25519SignedPayload {
                key: r.fixed::<32>()?,
                payload: r.var(64)?,
            }),
            t => Err(WalletError::xdr_error(format!("Unknown signer key type {}", t))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreconditionsV2 {
    pub time_bounds: Option<TimeBounds>,
    pub ledger_bounds: Option<LedgerBounds>,
    pub min_seq_num: Option<i64>,
    pub min_seq_age: u64,
    pub min_seq_ledger_gap: u32,
    pub extra_signers: Vec<SignerKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preconditions {
    #[default]
    None,
    Time(TimeBounds),
    V2(PreconditionsV2),
}

impl Preconditions {
    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        match self {
            Preconditions::None => None,
            Preconditions::Time(bounds) => Some(bounds),
            Preconditions::V2(v2) => v2.time_bounds.as_ref(),
        }
    }
}

impl XdrCodec for Preconditions {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Preconditions::None => w.u32(0),
            Preconditions::Time(bounds) => {
                w.u32(1);
                bounds.encode(w);
            }
            Preconditions::V2(v2) => {
                w.u32(2);
                w.option(v2.time_bounds.as_ref(), |w, b| b.encode(w));
                w.option(v2.ledger_bounds.as_ref(), |w, b| {
                    w.u32(b.min_ledger);
                    w.u32(b.max_ledger);
                });
                w.option(v2.min_seq_num.as_ref(), |w, n| w.i64(*n));
                w.u64(v2.min_seq_age);
                w.u32(v2.min_seq_ledger_gap);
                w.array(&v2.extra_signers);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            0 => Ok(Preconditions::None),
            1 => Ok(Preconditions::Time(TimeBounds::decode(r)?)),
            2 => Ok(Preconditions::V2(PreconditionsV2 {
                time_bounds: r.option(TimeBounds::decode)?,
                ledger_bounds: r.option(|r| {
                    Ok(LedgerBounds {
                        min_ledger: r.u32()?,
                        max_ledger: r.u32()?,
                    })
                })?,
                min_seq_num: r.option(|r| r.i64())?,
                min_seq_age: r.u64()?,
                min_seq_ledger_gap: r.u32()?,
                extra_signers: r.array(2)?,
            })),
            t => Err(WalletError::xdr_error(format!("Unknown precondition type {}", t))),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source_account: MuxedAccount,
    /// Total fee in stroops
    pub fee: u32,
    pub seq_num: i64,
    pub cond: Preconditions,
    pub memo: Memo,
    pub operations: Vec<Operation>,
    pub soroban_data: Option<SorobanTransactionData>,
}

impl Transaction {
    /// Hash signed by every signer of the transaction
    pub fn hash(&self, network_passphrase: &str) -> [u8; 32] {
        signature_payload_hash(network_passphrase, ENVELOPE_TYPE_TX, &self.to_xdr())
    }

    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        self.cond.time_bounds()
    }

    pub fn is_soroban(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op.body, OperationBody::InvokeHostFunction { .. }))
    }
}

impl XdrCodec for Transaction {
    fn encode(&self, w: &mut XdrWriter) {
        self.source_account.encode(w);
        w.u32(self.fee);
        w.i64(self.seq_num);
        self.cond.encode(w);
        self.memo.encode(w);
        w.array(&self.operations);
        match &self.soroban_data {
            None => w.u32(0),
            Some(data) => {
                w.u32(1);
                data.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let source_account = MuxedAccount::decode(r)?;
        let fee = r.u32()?;
        let seq_num = r.i64()?;
        let cond = Preconditions::decode(r)?;
        let memo = Memo::decode(r)?;
        let operations = r.array(MAX_OPERATIONS)?;
        let soroban_data = match r.u32()? {
            0 => None,
            1 => Some(SorobanTransactionData::decode(r)?),
            t => return Err(WalletError::xdr_error(format!("Unknown transaction ext {}", t))),
        };
        Ok(Self {
            source_account,
            fee,
            seq_num,
            cond,
            memo,
            operations,
            soroban_data,
        })
    }
}

/// Legacy v0 transaction body, upgraded to v1 on decode
fn decode_transaction_v0(r: &mut XdrReader<'_>) -> WalletResult<Transaction> {
    let source = r.fixed::<32>()?;
    let fee = r.u32()?;
    let seq_num = r.i64()?;
    let cond = match r.option(TimeBounds::decode)? {
        Some(bounds) => Preconditions::Time(bounds),
        None => Preconditions::None,
    };
    let memo = Memo::decode(r)?;
    let operations = r.array(MAX_OPERATIONS)?;
    if r.u32()? != 0 {
        return Err(WalletError::xdr_error("Unknown v0 transaction ext"));
    }
    Ok(Transaction {
        source_account: MuxedAccount::Ed25519(source),
        fee,
        seq_num,
        cond,
        memo,
        operations,
        soroban_data: None,
    })
}

// =============================================================================
// Signatures & Envelopes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

impl DecoratedSignature {
    pub fn new(signer: &AccountId, signature: [u8; 64]) -> Self {
        Self {
            hint: signer.hint(),
            signature: signature.to_vec(),
        }
    }
}

impl XdrCodec for DecoratedSignature {
    fn encode(&self, w: &mut XdrWriter) {
        w.fixed(&self.hint);
        w.var(&self.signature);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        Ok(Self {
            hint: r.fixed::<4>()?,
            signature: r.var(64)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBumpTransaction {
    pub fee_source: MuxedAccount,
    pub fee: i64,
    pub inner_tx: Transaction,
    pub inner_signatures: Vec<DecoratedSignature>,
}

impl XdrCodec for FeeBumpTransaction {
    fn encode(&self, w: &mut XdrWriter) {
        self.fee_source.encode(w);
        w.i64(self.fee);
        w.u32(ENVELOPE_TYPE_TX);
        self.inner_tx.encode(w);
        w.array(&self.inner_signatures);
        w.u32(0);
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        let fee_source = MuxedAccount::decode(r)?;
        let fee = r.i64()?;
        if r.u32()? != ENVELOPE_TYPE_TX {
            return Err(WalletError::xdr_error("Fee bump inner transaction must be v1"));
        }
        let inner_tx = Transaction::decode(r)?;
        let inner_signatures = r.array(MAX_SIGNATURES)?;
        if r.u32()? != 0 {
            return Err(WalletError::xdr_error("Unknown fee bump ext"));
        }
        Ok(Self {
            fee_source,
            fee,
            inner_tx,
            inner_signatures,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEnvelope {
    Tx {
        tx: Transaction,
        signatures: Vec<DecoratedSignature>,
    },
    FeeBump {
        tx: FeeBumpTransaction,
        signatures: Vec<DecoratedSignature>,
    },
}

impl TransactionEnvelope {
    pub fn unsigned(tx: Transaction) -> Self {
        TransactionEnvelope::Tx {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn hash(&self, network_passphrase: &str) -> [u8; 32] {
        match self {
            TransactionEnvelope::Tx { tx, .. } => tx.hash(network_passphrase),
            TransactionEnvelope::FeeBump { tx, .. } => signature_payload_hash(
                network_passphrase,
                ENVELOPE_TYPE_TX_FEE_BUMP,
                &tx.to_xdr(),
            ),
        }
    }

    /// Transaction carrying the operations (the inner one for fee bumps)
    pub fn transaction(&self) -> &Transaction {
        match self {
            TransactionEnvelope::Tx { tx, .. } => tx,
            TransactionEnvelope::FeeBump { tx, .. } => &tx.inner_tx,
        }
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        match self {
            TransactionEnvelope::Tx { signatures, .. }
            | TransactionEnvelope::FeeBump { signatures, .. } => signatures,
        }
    }

    pub fn add_signature(&mut self, signature: DecoratedSignature) -> WalletResult<()> {
        let signatures = match self {
            TransactionEnvelope::Tx { signatures, .. }
            | TransactionEnvelope::FeeBump { signatures, .. } => signatures,
        };
        if signatures.len() >= MAX_SIGNATURES as usize {
            return Err(WalletError::invalid_transaction("Too many signatures"));
        }
        signatures.push(signature);
        Ok(())
    }
}

impl XdrCodec for TransactionEnvelope {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            TransactionEnvelope::Tx { tx, signatures } => {
                w.u32(ENVELOPE_TYPE_TX);
                tx.encode(w);
                w.array(signatures);
            }
            TransactionEnvelope::FeeBump { tx, signatures } => {
                w.u32(ENVELOPE_TYPE_TX_FEE_BUMP);
                tx.encode(w);
                w.array(signatures);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> WalletResult<Self> {
        match r.u32()? {
            ENVELOPE_TYPE_TX_V0 => Ok(TransactionEnvelope::Tx {
                tx: decode_transaction_v0(r)?,
                signatures: r.array(MAX_SIGNATURES)?,
            }),
            ENVELOPE_TYPE_TX => Ok(TransactionEnvelope::Tx {
                tx: Transaction::decode(r)?,
                signatures: r.array(MAX_SIGNATURES)?,
            }),
            ENVELOPE_TYPE_TX_FEE_BUMP => Ok(TransactionEnvelope::FeeBump {
                tx: FeeBumpTransaction::decode(r)?,
                signatures: r.array(MAX_SIGNATURES)?,
            }),
            t => Err(WalletError::xdr_error(format!("Unknown envelope type {}", t))),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles a transaction; `base_fee` is charged per operation
pub struct TransactionBuilder {
    source_account: MuxedAccount,
    sequence: i64,
    base_fee: u32,
    time_bounds: Option<TimeBounds>,
    memo: Memo,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    /// `sequence` is the value the transaction will carry
    pub fn new(source_account: MuxedAccount, sequence: i64, base_fee: u32) -> Self {
        Self {
            source_account,
            sequence,
            base_fee,
            time_bounds: None,
            memo: Memo::None,
            operations: Vec::new(),
        }
    }

    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn time_bounds(mut self, min_time: u64, max_time: u64) -> Self {
        self.time_bounds = Some(TimeBounds { min_time, max_time });
        self
    }

    /// Bounds of `[0, now + timeout_secs]`
    pub fn timeout(self, now: u64, timeout_secs: u64) -> Self {
        self.time_bounds(0, now.saturating_add(timeout_secs))
    }

    pub fn build(self) -> WalletResult<Transaction> {
        if self.operations.is_empty() {
            return Err(WalletError::invalid_transaction("Transaction has no operations"));
        }
        if self.operations.len() > MAX_OPERATIONS as usize {
            return Err(WalletError::invalid_transaction("Too many operations"));
        }
        let fee = self
            .base_fee
            .checked_mul(self.operations.len() as u32)
            .ok_or_else(|| WalletError::invalid_transaction("Transaction fee overflows u32"))?;

        Ok(Transaction {
            source_account: self.source_account,
            fee,
            seq_num: self.sequence,
            cond: match self.time_bounds {
                Some(bounds) => Preconditions::Time(bounds),
                None => Preconditions::None,
            },
            memo: self.memo,
            operations: self.operations,
            soroban_data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::asset::Asset;

    fn sample_tx() -> Transaction {
        TransactionBuilder::new(AccountId([1u8; 32]).into(), 101, 100)
            .add_operation(Operation::payment(AccountId([2u8; 32]).into(), Asset::Native, 5))
            .add_operation(Operation::payment(AccountId([3u8; 32]).into(), Asset::Native, 6))
            .memo(Memo::text("hello").unwrap())
            .timeout(1_000, 180)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_fee_per_operation() {
        let tx = sample_tx();
        assert_eq!(tx.fee, 200);
        assert_eq!(tx.seq_num, 101);
        assert_eq!(tx.time_bounds(), Some(&TimeBounds { min_time: 0, max_time: 1_180 }));
    }

    #[test]
    fn test_builder_rejects_empty() {
        assert!(TransactionBuilder::new(AccountId([1u8; 32]).into(), 1, 100)
            .build()
            .is_err());
    }

    #[test]
    fn test_envelope_roundtrip() {
        let envelope = TransactionEnvelope::unsigned(sample_tx());
        let decoded = TransactionEnvelope::from_xdr_base64(&envelope.to_xdr_base64()).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_memo_text_limit() {
        assert!(Memo::text(&"a".repeat(28)).is_ok());
        assert!(Memo::text(&"a".repeat(29)).is_err());
        assert_eq!(Memo::Id(42).value().as_deref(), Some("42"));
    }

    #[test]
    fn test_non_utf8_memo_text_preserved() {
        let mut tx = sample_tx();
        tx.memo = Memo::Text(vec![0xff; 20]);
        let bytes = TransactionEnvelope::unsigned(tx).to_xdr();

        let decoded = TransactionEnvelope::from_xdr(&bytes).unwrap();
        assert_eq!(decoded.transaction().memo, Memo::Text(vec![0xff; 20]));
        assert_eq!(decoded.to_xdr(), bytes);
        assert!(decoded.transaction().memo.value().is_some());
    }

    #[test]
    fn test_v0_envelope_upgraded() {
        let mut w = XdrWriter::new();
        w.u32(ENVELOPE_TYPE_TX_V0);
        w.fixed(&[1u8; 32]);
        w.u32(100);
        w.i64(7);
        w.bool(false);
        Memo::None.encode(&mut w);
        w.array(&[Operation::payment(AccountId([2u8; 32]).into(), Asset::Native, 5)]);
        w.u32(0);
        w.u32(0); // signatures

        let envelope = TransactionEnvelope::from_xdr(&w.into_bytes()).unwrap();
        let tx = envelope.transaction();
        assert_eq!(tx.source_account, MuxedAccount::Ed25519([1u8; 32]));
        assert_eq!(tx.seq_num, 7);
        assert_eq!(tx.operations.len(), 1);
    }

    #[test]
    fn test_fee_bump_hash_differs_from_inner() {
        let inner = sample_tx();
        let passphrase = "Test SDF Network ; September 2015";
        let envelope = TransactionEnvelope::FeeBump {
            tx: FeeBumpTransaction {
                fee_source: AccountId([9u8; 32]).into(),
                fee: 400,
                inner_tx: inner.clone(),
                inner_signatures: vec![],
            },
            signatures: vec![],
        };
        assert_ne!(envelope.hash(passphrase), inner.hash(passphrase));
        assert_eq!(envelope.transaction(), &inner);
        let decoded = TransactionEnvelope::from_xdr(&envelope.to_xdr()).unwrap();
        assert_eq!(decoded, envelope);
    }
}
