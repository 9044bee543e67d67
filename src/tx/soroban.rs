//! Soroban Preparer
//!
//! Simulates a contract invocation and folds the result back into the
//! transaction: resource fee, footprint (transaction data) and auth entries.

use crate::api::{SimulateTransactionResponse, SorobanRpcApi};
use crate::error::{WalletError, WalletResult};
use crate::stellar::{
    OperationBody, SorobanAuthEntry, SorobanTransactionData, Transaction, TransactionEnvelope,
    XdrCodec,
};
use crate::types::NetworkDetails;
use crate::{log_debug, log_error};

/// Apply a successful simulation to `transaction`
pub fn assemble_transaction(
    transaction: &Transaction,
    simulation: &SimulateTransactionResponse,
) -> WalletResult<Transaction> {
    if let Some(error) = &simulation.error {
        return Err(WalletError::simulation_failed(format!("Simulation failed: {}", error)));
    }
    if simulation.restore_preamble.is_some() {
        return Err(WalletError::simulation_failed(
            "Archived contract state must be restored before this transaction can run",
        ));
    }

    let data = simulation
        .transaction_data
        .as_deref()
        .ok_or_else(|| WalletError::simulation_failed("Simulation returned no transaction data"))?;
    let data = SorobanTransactionData::from_base64(data)?;
    let resource_fee = simulation.min_resource_fee()?;

    // A re-prepared transaction already carries a resource fee
    let classic_fee = i64::from(transaction.fee)
        - transaction
            .soroban_data
            .as_ref()
            .map_or(0, SorobanTransactionData::resource_fee);
    let fee = u32::try_from(classic_fee.max(0) + resource_fee)
        .map_err(|_| WalletError::invalid_transaction("Prepared fee overflows u32"))?;

    let auth = match simulation.results.first() {
        Some(result) => result
            .auth
            .iter()
            .map(|entry| SorobanAuthEntry::from_base64(entry))
            .collect::<WalletResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    let mut prepared = transaction.clone();
    prepared.fee = fee;
    prepared.soroban_data = Some(data);
    for operation in &mut prepared.operations {
        if let OperationBody::InvokeHostFunction { auth: op_auth, .. } = &mut operation.body {
            if op_auth.is_empty() {
                *op_auth = auth.clone();
            }
        }
    }
    Ok(prepared)
}

/// Simulate `transaction` and return the prepared envelope XDR
pub fn prepare_soroban_transaction(
    rpc: &dyn SorobanRpcApi,
    transaction: &Transaction,
) -> WalletResult<String> {
    let xdr = TransactionEnvelope::unsigned(transaction.clone()).to_xdr_base64();
    let simulation = rpc.simulate_transaction(&xdr)?;
    let prepared = assemble_transaction(transaction, &simulation)?;
    log_debug!(
        "soroban",
        "Prepared Soroban transaction",
        fee = prepared.fee,
        latest_ledger = simulation.latest_ledger.unwrap_or(0)
    );
    Ok(TransactionEnvelope::unsigned(prepared).to_xdr_base64())
}

/// Prepare a contract token transfer built by the payment builder
pub fn simulate_contract_transfer(
    rpc: &dyn SorobanRpcApi,
    transaction: &Transaction,
    network_details: &NetworkDetails,
) -> WalletResult<String> {
    if !transaction.is_soroban() {
        return Err(WalletError::invalid_transaction(
            "Transaction has no contract invocation",
        ));
    }
    if network_details.soroban_rpc_url.is_none() {
        return Err(WalletError::invalid_input(
            "Soroban RPC URL is not defined for this network",
        ));
    }

    prepare_soroban_transaction(rpc, transaction).map_err(|e| {
        log_error!(
            "soroban",
            "Contract transfer simulation failed",
            error = e.message,
            source = transaction.source_account.address()
        );
        e
    })
}
