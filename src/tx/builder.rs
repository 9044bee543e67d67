//! Transaction Builder
//!
//! Builds unsigned payment, swap and change-trust transactions from the
//! request structs collected by the send and swap flows.

use crate::api::HorizonApi;
use crate::error::{ErrorCode, ValidationError, WalletError, WalletResult};
use crate::fees::get_network_fees;
use crate::stellar::amount::{fee_to_stroops, parse_amount, parse_stroops, to_base_units};
use crate::stellar::contract::{contract_id_for_asset, transfer_invocation};
use crate::stellar::operation::MAX_PATH_LEN;
use crate::stellar::{
    AccountId, Asset, Memo, MuxedAccount, Operation, Transaction, TransactionBuilder,
    TransactionEnvelope, XdrCodec,
};
use crate::types::*;
use crate::wallet::{
    is_contract_address, validate_swap_transaction_params, validate_transaction_params,
    PaymentCheck, SwapCheck,
};
use crate::{log_debug, log_error};

pub use crate::stellar::contract::get_contract_id_for_native_token;

/// Trustline limit used when adding a trustline
pub const MAX_TRUSTLINE_LIMIT: i64 = i64::MAX;

/// Classic asset for a balance: native XLM or a credit asset
pub fn get_asset_for_payment(balance: &PricedBalance) -> WalletResult<Asset> {
    if balance.token_code.as_deref() == Some(NATIVE_TOKEN_CODE) || balance.balance.is_native() {
        return Ok(Asset::Native);
    }
    match &balance.balance {
        Balance::Classic { token, .. } if token.token_type != Some(TokenType::Native) => {
            Asset::credit(&token.code, &token.issuer.key)
        }
        _ => Err(WalletError::invalid_input("Unsupported asset type for payment")),
    }
}

/// Token contract that moves `balance` when paying a contract address
pub fn resolve_token_contract(balance: &PricedBalance, network: Network) -> WalletResult<String> {
    if let Balance::Soroban { contract_id, .. } = &balance.balance {
        return Ok(contract_id.clone());
    }
    let asset = get_asset_for_payment(balance)?;
    if asset.is_native() {
        get_contract_id_for_native_token(network)
    } else {
        Ok(contract_id_for_asset(&asset, network.passphrase()))
    }
}

/// Token `transfer` call paying `amount` base units from `source_account`
/// to `destination_address`
#[derive(Debug, Clone)]
pub struct SorobanTransfer<'a> {
    pub source_account: &'a str,
    pub destination_address: &'a str,
    pub amount: i128,
    pub contract_id: &'a str,
}

pub fn build_soroban_transfer_operation(params: &SorobanTransfer<'_>) -> WalletResult<Operation> {
    transfer_invocation(
        params.contract_id,
        params.source_account,
        params.destination_address,
        params.amount,
    )
    .map(Operation::invoke_contract)
    .map_err(|e| {
        log_error!("tx_builder", "Error building Soroban transfer operation", error = e.message);
        e.context("Error building Soroban transfer operation")
    })
}

/// Horizon's clock, falling back to local time
pub(crate) fn server_now(horizon: &dyn HorizonApi) -> u64 {
    match horizon.server_time() {
        Ok(now) => now,
        Err(e) => {
            log_debug!("tx_builder", "Using local time for time bounds", error = e.message);
            u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
        }
    }
}

/// Builder starting at the account's next sequence number
fn start_transaction(
    horizon: &dyn HorizonApi,
    sender: &str,
    fee: &str,
    timeout: u64,
) -> WalletResult<TransactionBuilder> {
    let source = MuxedAccount::from_address(sender)?;
    let account = horizon.load_account(&source.account_id().address())?;
    let sequence = account
        .sequence
        .checked_add(1)
        .ok_or_else(|| WalletError::invalid_transaction("Sequence number overflow"))?;
    let base_fee = fee_to_stroops(fee)?;
    let now = server_now(horizon);

    Ok(TransactionBuilder::new(source, sequence, base_fee).timeout(now, timeout))
}

fn finish(transaction: Transaction, contract_id: Option<String>) -> BuiltTransaction {
    let xdr = TransactionEnvelope::unsigned(transaction.clone()).to_xdr_base64();
    BuiltTransaction {
        transaction,
        xdr,
        contract_id,
    }
}

fn missing_params() -> WalletError {
    WalletError::invalid_input("Missing required parameters for building transaction")
}

/// Build a payment, account creation or Soroban token transfer
pub fn build_payment_transaction(
    horizon: &dyn HorizonApi,
    params: &BuildPaymentTransactionParams,
) -> WalletResult<BuiltTransaction> {
    build_payment(horizon, params).map_err(|e| {
        log_error!(
            "tx_builder",
            "Failed to build payment transaction",
            error = e.message,
            code = format!("{:?}", e.code)
        );
        e.context("Failed to build payment transaction")
    })
}

fn build_payment(
    horizon: &dyn HorizonApi,
    params: &BuildPaymentTransactionParams,
) -> WalletResult<BuiltTransaction> {
    let (Some(sender), Some(network), Some(balance), Some(recipient), Some(fee), Some(timeout)) = (
        params.sender_address.as_deref().map(str::trim),
        params.network,
        params.selected_balance.as_ref(),
        params.recipient_address.as_deref().map(str::trim),
        params.transaction_fee.as_deref(),
        params.transaction_timeout.filter(|t| *t > 0),
    ) else {
        return Err(missing_params());
    };
    let amount = params.token_amount.as_str();

    validate_transaction_params(&PaymentCheck {
        sender_address: sender,
        balance,
        amount,
        destination: recipient,
        fee,
        timeout,
    })?;

    let mut builder = start_transaction(horizon, sender, fee, timeout)?;
    if let Some(memo) = params.transaction_memo.as_deref().filter(|m| !m.is_empty()) {
        builder = builder.memo(Memo::text(memo)?);
    }

    if is_contract_address(recipient) {
        let contract_id = resolve_token_contract(balance, network)?;
        let base_units = to_base_units(parse_amount(amount)?, balance.balance.decimals())?;
        let operation = build_soroban_transfer_operation(&SorobanTransfer {
            source_account: sender,
            destination_address: recipient,
            amount: base_units,
            contract_id: &contract_id,
        })?;
        log_debug!("tx_builder", "Built contract transfer", contract = contract_id, destination = recipient);
        let transaction = builder.add_operation(operation).build()?;
        return Ok(finish(transaction, Some(contract_id)));
    }

    let asset = get_asset_for_payment(balance)?;
    let destination = MuxedAccount::from_address(recipient)?;
    let stroops = parse_stroops(amount)?;

    if asset.is_native() {
        if let Some(operation) = create_account_if_unfunded(horizon, &destination, amount, stroops)? {
            let transaction = builder.add_operation(operation).build()?;
            return Ok(finish(transaction, None));
        }
    }

    let transaction = builder
        .add_operation(Operation::payment(destination, asset, stroops))
        .build()?;
    Ok(finish(transaction, None))
}

/// `CreateAccount` when the destination does not exist yet
fn create_account_if_unfunded(
    horizon: &dyn HorizonApi,
    destination: &MuxedAccount,
    amount: &str,
    stroops: i64,
) -> WalletResult<Option<Operation>> {
    let account_id = destination.account_id();
    match horizon.load_account(&account_id.address()) {
        Ok(_) => Ok(None),
        Err(e) if e.code == ErrorCode::AccountNotFound => {
            if parse_amount(amount)? < rust_decimal::Decimal::ONE {
                return Err(ValidationError::MinimumXlmForNewAccount.into());
            }
            if destination.is_muxed() {
                return Err(WalletError::invalid_address(
                    "Cannot create an account from a muxed address",
                ));
            }
            log_debug!("tx_builder", "Destination unfunded, creating account", destination = account_id.address());
            Ok(Some(Operation::create_account(account_id, stroops)))
        }
        Err(e) => Err(e),
    }
}

/// Build a path-payment strict-send swap back to the sender
pub fn build_swap_transaction(
    horizon: &dyn HorizonApi,
    params: &BuildSwapTransactionParams,
) -> WalletResult<BuiltTransaction> {
    build_swap(horizon, params).map_err(|e| {
        log_error!("tx_builder", "Failed to build swap transaction", error = e.message);
        e.context("Failed to build swap transaction")
    })
}

fn build_swap(
    horizon: &dyn HorizonApi,
    params: &BuildSwapTransactionParams,
) -> WalletResult<BuiltTransaction> {
    let (Some(sender), Some(_network), Some(fee), Some(timeout)) = (
        params.sender_address.as_deref(),
        params.network,
        params.transaction_fee.as_deref(),
        params.transaction_timeout.filter(|t| *t > 0),
    ) else {
        return Err(missing_params());
    };

    validate_swap_transaction_params(&SwapCheck {
        source_balance: &params.source_balance,
        destination_balance: &params.destination_balance,
        source_amount: &params.source_amount,
        destination_amount: &params.destination_amount,
        fee,
        timeout,
    })?;

    if params.path.len() > MAX_PATH_LEN as usize {
        return Err(WalletError::invalid_input(format!(
            "Path has {} assets, at most {} allowed",
            params.path.len(),
            MAX_PATH_LEN
        )));
    }

    let builder = start_transaction(horizon, sender, fee, timeout)?;
    let send_asset = get_asset_for_payment(&params.source_balance)?;
    let dest_asset = get_asset_for_payment(&params.destination_balance)?;
    let path = params
        .path
        .iter()
        .map(|item| Asset::from_identifier(item))
        .collect::<WalletResult<Vec<_>>>()?;

    let operation = Operation::path_payment_strict_send(
        send_asset,
        parse_stroops(&params.source_amount)?,
        MuxedAccount::from_address(sender)?,
        dest_asset,
        parse_stroops(&params.destination_amount_min)?,
        path,
    );
    let transaction = builder.add_operation(operation).build()?;
    Ok(finish(transaction, None))
}

/// Add (`is_remove == false`) or remove a trustline to `token_identifier`
/// ("CODE:ISSUER") at the recommended network fee
pub fn build_change_trust_transaction(
    horizon: &dyn HorizonApi,
    network: Network,
    public_key: &str,
    token_identifier: &str,
    is_remove: bool,
) -> WalletResult<BuiltTransaction> {
    let asset = Asset::from_identifier(token_identifier)?;
    if asset.is_native() {
        return Err(WalletError::invalid_input("Cannot change trust for the native asset"));
    }
    AccountId::from_address(public_key)?;

    let fees = get_network_fees(horizon);
    let limit = if is_remove { 0 } else { MAX_TRUSTLINE_LIMIT };
    log_debug!(
        "tx_builder",
        "Building change trust",
        network = network,
        asset = token_identifier,
        remove = is_remove
    );

    let transaction = start_transaction(
        horizon,
        public_key,
        &fees.recommended_fee,
        DEFAULT_TRANSACTION_TIMEOUT,
    )?
    .add_operation(Operation::change_trust(asset, limit))
    .build()?;
    Ok(finish(transaction, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeHorizon;
    use crate::api::{FeeDistribution, FeeStatsResponse};
    use crate::stellar::contract::TESTNET_NATIVE_CONTRACT_ID;
    use crate::stellar::{OperationBody, Preconditions, ScVal};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SENDER: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
    const RECIPIENT: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";
    const ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";
    const CONTRACT: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";

    fn xlm(total: &str) -> PricedBalance {
        PricedBalance::new(Balance::Native {
            total: Decimal::from_str(total).unwrap(),
            available: None,
            minimum_balance: None,
        })
    }

    fn usdc(total: &str) -> PricedBalance {
        PricedBalance::new(Balance::Classic {
            total: Decimal::from_str(total).unwrap(),
            token: NonNativeToken {
                code: "USDC".to_string(),
                issuer: Issuer {
                    key: ISSUER.to_string(),
                    name: None,
                    url: None,
                    host_name: None,
                },
                token_type: Some(TokenType::CreditAlphanum4),
            },
            available: None,
            limit: None,
        })
    }

    fn params(amount: &str, balance: PricedBalance, recipient: &str) -> BuildPaymentTransactionParams {
        BuildPaymentTransactionParams {
            token_amount: amount.to_string(),
            selected_balance: Some(balance),
            recipient_address: Some(recipient.to_string()),
            transaction_memo: None,
            transaction_fee: Some("0.00001".to_string()),
            transaction_timeout: Some(180),
            network: Some(Network::Testnet),
            sender_address: Some(SENDER.to_string()),
        }
    }

    fn only_op(built: &BuiltTransaction) -> &OperationBody {
        assert_eq!(built.transaction.operations.len(), 1);
        &built.transaction.operations[0].body
    }

    #[test]
    fn test_funded_native_payment() {
        let horizon = FakeHorizon::new().with_account(SENDER, 100).with_account(RECIPIENT, 5);
        let mut p = params("10.5", xlm("100"), RECIPIENT);
        p.transaction_memo = Some("invoice 42".to_string());

        let built = build_payment_transaction(&horizon, &p).unwrap();
        match only_op(&built) {
            OperationBody::Payment { asset, amount, .. } => {
                assert!(asset.is_native());
                assert_eq!(*amount, 105_000_000);
            }
            other => panic!("unexpected op {:?}", other),
        }
        assert_eq!(built.transaction.seq_num, 101);
        assert_eq!(built.transaction.fee, 100);
        assert_eq!(built.transaction.memo, Memo::Text(b"invoice 42".to_vec()));
        assert_eq!(
            built.transaction.cond,
            Preconditions::Time(crate::stellar::TimeBounds {
                min_time: 0,
                max_time: horizon.now + 180
            })
        );
        assert!(built.contract_id.is_none());

        let decoded = TransactionEnvelope::from_xdr_base64(&built.xdr).unwrap();
        assert_eq!(decoded.transaction(), &built.transaction);
    }

    #[test]
    fn test_unfunded_destination_creates_account() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let built = build_payment_transaction(&horizon, &params("2", xlm("100"), RECIPIENT)).unwrap();
        match only_op(&built) {
            OperationBody::CreateAccount { destination, starting_balance } => {
                assert_eq!(destination.address(), RECIPIENT);
                assert_eq!(*starting_balance, 20_000_000);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_unfunded_destination_below_minimum() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let err = build_payment_transaction(&horizon, &params("0.5", xlm("100"), RECIPIENT)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientFunds);
        assert_eq!(err.details.as_deref(), Some("transaction.errors.minimumXlmForNewAccount"));
        assert!(err.message.starts_with("Failed to build payment transaction: "));
    }

    #[test]
    fn test_destination_lookup_failure_propagates() {
        let mut horizon = FakeHorizon::new().with_account(SENDER, 1);
        horizon.failing_accounts.push(RECIPIENT.to_string());
        let err = build_payment_transaction(&horizon, &params("2", xlm("100"), RECIPIENT)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }

    #[test]
    fn test_credit_asset_payment_skips_destination_lookup() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let built = build_payment_transaction(&horizon, &params("3", usdc("50"), RECIPIENT)).unwrap();
        match only_op(&built) {
            OperationBody::Payment { asset, amount, .. } => {
                assert_eq!(asset.code(), "USDC");
                assert_eq!(*amount, 30_000_000);
            }
            other => panic!("unexpected op {:?}", other),
        }
        assert_eq!(horizon.account_loads.get(), 1);
    }

    #[test]
    fn test_contract_destination_native() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let built = build_payment_transaction(&horizon, &params("1.25", xlm("100"), CONTRACT)).unwrap();
        assert_eq!(built.contract_id.as_deref(), Some(TESTNET_NATIVE_CONTRACT_ID));

        let OperationBody::InvokeHostFunction { host_function, auth } = only_op(&built) else {
            panic!("expected invoke host function");
        };
        assert!(auth.is_empty());
        let args = host_function.invoke_args().unwrap();
        assert_eq!(args.contract_address.address(), TESTNET_NATIVE_CONTRACT_ID);
        assert_eq!(args.function_name, "transfer");
        assert_eq!(args.args[0], ScVal::address(SENDER).unwrap());
        assert_eq!(args.args[1], ScVal::address(CONTRACT).unwrap());
        assert_eq!(args.args[2], ScVal::I128(12_500_000));
    }

    #[test]
    fn test_contract_destination_credit_asset_uses_derived_contract() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let built = build_payment_transaction(&horizon, &params("2", usdc("50"), CONTRACT)).unwrap();

        let sac = "CA2E53VHFZ6YSWQIEIPBXJQGT6VW3VKWWZO555XKRQXYJ63GEBJJGHY7";
        assert_eq!(built.contract_id.as_deref(), Some(sac));
        let OperationBody::InvokeHostFunction { host_function, .. } = only_op(&built) else {
            panic!("expected invoke host function");
        };
        let args = host_function.invoke_args().unwrap();
        assert_eq!(args.contract_address.address(), sac);
        assert_eq!(args.args[2], ScVal::I128(20_000_000));
    }

    #[test]
    fn test_recipient_with_surrounding_whitespace() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1).with_account(RECIPIENT, 5);
        let padded = format!("  {}\n", RECIPIENT);
        let built = build_payment_transaction(&horizon, &params("1", xlm("100"), &padded)).unwrap();
        let OperationBody::Payment { destination, .. } = only_op(&built) else {
            panic!("expected payment");
        };
        assert_eq!(destination.address(), RECIPIENT);

        let padded_contract = format!(" {} ", CONTRACT);
        let built = build_payment_transaction(&horizon, &params("1", xlm("100"), &padded_contract)).unwrap();
        let OperationBody::InvokeHostFunction { host_function, .. } = only_op(&built) else {
            panic!("expected invoke host function");
        };
        assert_eq!(host_function.invoke_args().unwrap().args[1], ScVal::address(CONTRACT).unwrap());
    }

    #[test]
    fn test_contract_destination_soroban_token_decimals() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let token = PricedBalance::new(Balance::Soroban {
            total: Decimal::from(10),
            token: NonNativeToken {
                code: "TKN".to_string(),
                issuer: Issuer {
                    key: CONTRACT.to_string(),
                    name: None,
                    url: None,
                    host_name: None,
                },
                token_type: Some(TokenType::CustomToken),
            },
            contract_id: CONTRACT.to_string(),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            decimals: 2,
        });
        let recipient = "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC";
        let built = build_payment_transaction(&horizon, &params("1.005", token, recipient)).unwrap();
        assert_eq!(built.contract_id.as_deref(), Some(CONTRACT));
        let OperationBody::InvokeHostFunction { host_function, .. } = only_op(&built) else {
            panic!("expected invoke host function");
        };
        // 100.5 rounds half up
        assert_eq!(host_function.invoke_args().unwrap().args[2], ScVal::I128(101));
    }

    #[test]
    fn test_missing_parameters() {
        let horizon = FakeHorizon::new();
        let mut p = params("1", xlm("10"), RECIPIENT);
        p.transaction_fee = None;
        let err = build_payment_transaction(&horizon, &p).unwrap_err();
        assert_eq!(
            err.message,
            "Failed to build payment transaction: Missing required parameters for building transaction"
        );
    }

    #[test]
    fn test_validation_failure_is_prefixed() {
        let horizon = FakeHorizon::new().with_account(SENDER, 1);
        let err = build_payment_transaction(&horizon, &params("1", xlm("10"), SENDER)).unwrap_err();
        assert_eq!(err.message, "Failed to build payment transaction: Cannot send to yourself");
        assert_eq!(horizon.account_loads.get(), 0);
    }

    #[test]
    fn test_liquidity_pool_balance_unsupported() {
        let pool = PricedBalance::new(Balance::LiquidityPool {
            total: Decimal::from(10),
            liquidity_pool_id: "abcd".to_string(),
            reserves: vec![],
        });
        assert_eq!(
            get_asset_for_payment(&pool).unwrap_err().message,
            "Unsupported asset type for payment"
        );
    }

    #[test]
    fn test_swap_transaction() {
        let horizon = FakeHorizon::new().with_account(SENDER, 7);
        let params = BuildSwapTransactionParams {
            source_amount: "5".to_string(),
            source_balance: xlm("100"),
            destination_balance: usdc("0"),
            path: vec!["native".to_string(), format!("EURT:{}", ISSUER)],
            destination_amount: "1.2".to_string(),
            destination_amount_min: "1.1".to_string(),
            transaction_fee: Some("0.0001".to_string()),
            transaction_timeout: Some(60),
            network: Some(Network::Public),
            sender_address: Some(SENDER.to_string()),
        };

        let built = build_swap_transaction(&horizon, &params).unwrap();
        match only_op(&built) {
            OperationBody::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                assert!(send_asset.is_native());
                assert_eq!(*send_amount, 50_000_000);
                assert_eq!(destination.address(), SENDER);
                assert_eq!(dest_asset.code(), "USDC");
                assert_eq!(*dest_min, 11_000_000);
                assert_eq!(path.len(), 2);
            }
            other => panic!("unexpected op {:?}", other),
        }
        assert_eq!(built.transaction.fee, 1_000);
    }

    #[test]
    fn test_swap_same_asset() {
        let horizon = FakeHorizon::new().with_account(SENDER, 7);
        let params = BuildSwapTransactionParams {
            source_amount: "5".to_string(),
            source_balance: xlm("100"),
            destination_balance: xlm("100"),
            path: vec![],
            destination_amount: "5".to_string(),
            destination_amount_min: "5".to_string(),
            transaction_fee: Some("0.00001".to_string()),
            transaction_timeout: Some(60),
            network: Some(Network::Public),
            sender_address: Some(SENDER.to_string()),
        };
        let err = build_swap_transaction(&horizon, &params).unwrap_err();
        assert_eq!(err.message, "Failed to build swap transaction: Cannot swap an asset for itself");
    }

    #[test]
    fn test_change_trust() {
        let mut horizon = FakeHorizon::new().with_account(SENDER, 1);
        horizon.fee_stats = Some(FeeStatsResponse {
            ledger_capacity_usage: "0.2".to_string(),
            max_fee: FeeDistribution {
                mode: "200".to_string(),
                ..FeeDistribution::default()
            },
            ..FeeStatsResponse::default()
        });
        let identifier = format!("USDC:{}", ISSUER);

        let added = build_change_trust_transaction(&horizon, Network::Testnet, SENDER, &identifier, false).unwrap();
        assert_eq!(added.transaction.fee, 200);
        assert!(matches!(
            only_op(&added),
            OperationBody::ChangeTrust { limit, .. } if *limit == MAX_TRUSTLINE_LIMIT
        ));

        let removed = build_change_trust_transaction(&horizon, Network::Testnet, SENDER, &identifier, true).unwrap();
        assert!(matches!(only_op(&removed), OperationBody::ChangeTrust { limit: 0, .. }));

        assert!(build_change_trust_transaction(&horizon, Network::Testnet, SENDER, "native", false).is_err());
    }
}
