//! Transaction Session
//!
//! Build, sign and submit state for one send flow. Each step records its
//! error instead of leaving the session half-updated.

use serde::Serialize;

use super::broadcaster::{submit_transaction, BroadcastConfig};
use super::builder::build_payment_transaction;
use super::signer::sign_transaction;
use super::soroban::simulate_contract_transfer;
use crate::api::{HorizonApi, SorobanRpcApi};
use crate::error::{WalletError, WalletResult};
use crate::types::{BuildPaymentTransactionParams, Network, NetworkDetails};
use crate::log_debug;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionSession {
    transaction_xdr: Option<String>,
    signed_transaction_xdr: Option<String>,
    transaction_hash: Option<String>,
    transaction_memo: Option<String>,
    network: Option<Network>,
    is_building: bool,
    is_submitting: bool,
    error: Option<WalletError>,
}

impl TransactionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_xdr(&self) -> Option<&str> {
        self.transaction_xdr.as_deref()
    }

    pub fn signed_transaction_xdr(&self) -> Option<&str> {
        self.signed_transaction_xdr.as_deref()
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    /// Memo entered in the send flow
    pub fn transaction_memo(&self) -> Option<&str> {
        self.transaction_memo.as_deref()
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    pub fn is_building(&self) -> bool {
        self.is_building
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn error(&self) -> Option<&WalletError> {
        self.error.as_ref()
    }

    fn record<T>(&mut self, result: WalletResult<T>) -> WalletResult<T> {
        if let Err(e) = &result {
            self.error = Some(e.clone());
        }
        result
    }

    /// Build the payment; contract transfers are simulated and prepared
    pub fn build(
        &mut self,
        horizon: &dyn HorizonApi,
        rpc: &dyn SorobanRpcApi,
        network_details: &NetworkDetails,
        params: BuildPaymentTransactionParams,
    ) -> WalletResult<String> {
        self.is_building = true;
        self.error = None;
        self.signed_transaction_xdr = None;
        self.transaction_hash = None;
        self.transaction_memo = params.transaction_memo.clone();
        self.network = params.network;

        let result = build_payment_transaction(horizon, &params).and_then(|built| {
            if built.contract_id.is_some() {
                simulate_contract_transfer(rpc, &built.transaction, network_details)
            } else {
                Ok(built.xdr)
            }
        });

        self.is_building = false;
        let xdr = self.record(result)?;
        log_debug!("session", "Transaction built", xdr = xdr);
        self.transaction_xdr = Some(xdr.clone());
        Ok(xdr)
    }

    pub fn sign(&mut self, secret: &str, network: Network) -> WalletResult<String> {
        let result = match self.transaction_xdr.as_deref() {
            Some(xdr) => sign_transaction(xdr, secret, network),
            None => Err(WalletError::invalid_transaction("No transaction to sign")),
        };
        let signed = self.record(result)?;
        self.signed_transaction_xdr = Some(signed.signed_xdr.clone());
        Ok(signed.signed_xdr)
    }

    pub fn submit(&mut self, horizon: &dyn HorizonApi, config: &BroadcastConfig) -> WalletResult<String> {
        let Some(signed) = self.signed_transaction_xdr.clone() else {
            return self.record(Err(WalletError::invalid_transaction(
                "No signed transaction to submit",
            )));
        };

        self.is_submitting = true;
        let result = submit_transaction(horizon, &signed, config);
        self.is_submitting = false;

        let hash = self.record(result)?.hash;
        self.transaction_hash = Some(hash.clone());
        Ok(hash)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{FakeHorizon, FakeSorobanRpc};
    use crate::stellar::{Keypair, TransactionEnvelope, XdrCodec};
    use crate::types::{Balance, PricedBalance};
    use rust_decimal::Decimal;
    use std::time::Duration;

    const SECRET: &str = "SCZANGBA5YHTNYVVV4C3U252E2B6P6F5T3U6MM63WBSBZATAQI3EBTQ4";
    const RECIPIENT: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    fn params(sender: &str, recipient: &str) -> BuildPaymentTransactionParams {
        BuildPaymentTransactionParams {
            token_amount: "5".to_string(),
            selected_balance: Some(PricedBalance::new(Balance::Native {
                total: Decimal::from(100),
                available: None,
                minimum_balance: None,
            })),
            recipient_address: Some(recipient.to_string()),
            transaction_memo: Some("hello".to_string()),
            transaction_fee: Some("0.00001".to_string()),
            transaction_timeout: Some(180),
            network: Some(Network::Testnet),
            sender_address: Some(sender.to_string()),
        }
    }

    #[test]
    fn test_build_sign_submit() {
        let sender = Keypair::from_secret(SECRET).unwrap().public_key();
        let horizon = FakeHorizon::new().with_account(&sender, 10).with_account(RECIPIENT, 1);
        let rpc = FakeSorobanRpc::default();
        let details = Network::Testnet.details();
        let mut session = TransactionSession::new();

        session.build(&horizon, &rpc, &details, params(&sender, RECIPIENT)).unwrap();
        assert!(session.transaction_xdr().is_some());
        assert_eq!(session.transaction_memo(), Some("hello"));
        assert!(!session.is_building());
        assert!(rpc.requests.borrow().is_empty());

        session.sign(SECRET, Network::Testnet).unwrap();
        let signed = TransactionEnvelope::from_xdr_base64(session.signed_transaction_xdr().unwrap()).unwrap();
        assert_eq!(signed.signatures().len(), 1);

        let config = BroadcastConfig {
            retries: 0,
            backoff: Duration::ZERO,
        };
        let hash = session.submit(&horizon, &config).unwrap();
        assert_eq!(session.transaction_hash(), Some(hash.as_str()));
        assert!(session.error().is_none());

        session.reset();
        assert!(session.transaction_xdr().is_none());
        assert!(session.transaction_hash().is_none());
    }

    #[test]
    fn test_steps_require_previous_step() {
        let mut session = TransactionSession::new();
        assert!(session.sign(SECRET, Network::Testnet).is_err());
        assert!(session.error().is_some());
        assert!(session.submit(&FakeHorizon::new(), &BroadcastConfig::default()).is_err());
    }

    #[test]
    fn test_build_failure_recorded() {
        let sender = Keypair::from_secret(SECRET).unwrap().public_key();
        let horizon = FakeHorizon::new();
        let mut session = TransactionSession::new();
        let err = session
            .build(&horizon, &FakeSorobanRpc::default(), &Network::Testnet.details(), params(&sender, RECIPIENT))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(session.error(), Some(&err));
        assert!(!session.is_building());
        assert!(session.transaction_xdr().is_none());
    }
}
