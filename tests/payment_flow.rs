//! End-to-end send flow against mocked Horizon and Soroban RPC servers

use std::str::FromStr;
use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use rust_decimal::Decimal;
use stellar_wallet_core::api::{HorizonClient, SorobanRpcClient};
use stellar_wallet_core::fees::get_network_fees;
use stellar_wallet_core::stellar::{Keypair, OperationBody, TransactionEnvelope, XdrCodec};
use stellar_wallet_core::tx::{BroadcastConfig, TransactionSession};
use stellar_wallet_core::utils::HttpClient;
use stellar_wallet_core::{
    Balance, BuildPaymentTransactionParams, ErrorCode, Network, NetworkCongestion,
    NetworkDetails, PricedBalance,
};

const SECRET: &str = "SCZANGBA5YHTNYVVV4C3U252E2B6P6F5T3U6MM63WBSBZATAQI3EBTQ4";
const DESTINATION: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";
const CONTRACT: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";
const HASH: &str = "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889";

fn sender() -> String {
    Keypair::from_secret(SECRET).unwrap().public_key()
}

fn xlm_balance(total: &str) -> PricedBalance {
    PricedBalance::new(Balance::Native {
        total: Decimal::from_str(total).unwrap(),
        available: None,
        minimum_balance: None,
    })
}

fn params(recipient: &str, amount: &str) -> BuildPaymentTransactionParams {
    BuildPaymentTransactionParams {
        token_amount: amount.to_string(),
        selected_balance: Some(xlm_balance("100")),
        recipient_address: Some(recipient.to_string()),
        transaction_memo: None,
        transaction_fee: Some("0.00001".to_string()),
        transaction_timeout: Some(180),
        network: Some(Network::Testnet),
        sender_address: Some(sender()),
    }
}

fn details(horizon: &ServerGuard, rpc: &ServerGuard) -> NetworkDetails {
    let mut details = Network::Testnet.details();
    details.network_url = horizon.url();
    details.soroban_rpc_url = Some(rpc.url());
    details
}

fn mock_sender(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", format!("/accounts/{}", sender()).as_str())
        .with_status(200)
        .with_body(format!(r#"{{"id":"{}","sequence":"4294967296"}}"#, sender()))
        .create()
}

fn mock_time(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/")
        .with_status(200)
        .with_header("date", "Tue, 14 Nov 2023 22:13:20 GMT")
        .with_body("{}")
        .create()
}

fn horizon_client(server: &ServerGuard) -> HorizonClient {
    HorizonClient::new(server.url(), HttpClient::new(5).unwrap())
}

fn rpc_client(server: &ServerGuard) -> SorobanRpcClient {
    SorobanRpcClient::new(server.url(), HttpClient::new(5).unwrap())
}

fn no_backoff(retries: u32) -> BroadcastConfig {
    BroadcastConfig {
        retries,
        backoff: Duration::ZERO,
    }
}

#[test]
fn unfunded_destination_is_created_signed_and_submitted() {
    let mut horizon = Server::new();
    let rpc = Server::new();
    let _sender = mock_sender(&mut horizon);
    let _time = mock_time(&mut horizon);
    let _destination = horizon
        .mock("GET", format!("/accounts/{}", DESTINATION).as_str())
        .with_status(404)
        .with_body(r#"{"status":404}"#)
        .create();
    let submit = horizon
        .mock("POST", "/transactions")
        .match_body(Matcher::Regex("^tx=".to_string()))
        .with_status(200)
        .with_body(format!(r#"{{"hash":"{}","ledger":77,"successful":true}}"#, HASH))
        .expect(1)
        .create();

    let client = horizon_client(&horizon);
    let mut session = TransactionSession::new();
    let xdr = session
        .build(&client, &rpc_client(&rpc), &details(&horizon, &rpc), params(DESTINATION, "5"))
        .unwrap();

    let envelope = TransactionEnvelope::from_xdr_base64(&xdr).unwrap();
    let tx = envelope.transaction();
    assert_eq!(tx.seq_num, 4294967297);
    assert_eq!(tx.fee, 100);
    assert_eq!(tx.time_bounds().unwrap().max_time, 1_700_000_180);
    assert!(matches!(
        tx.operations[0].body,
        OperationBody::CreateAccount { starting_balance: 50_000_000, .. }
    ));

    session.sign(SECRET, Network::Testnet).unwrap();
    let hash = session.submit(&client, &no_backoff(0)).unwrap();
    assert_eq!(hash, HASH);
    assert_eq!(session.transaction_hash(), Some(HASH));
    submit.assert();
}

#[test]
fn unfunded_destination_needs_one_xlm() {
    let mut horizon = Server::new();
    let rpc = Server::new();
    let _sender = mock_sender(&mut horizon);
    let _time = mock_time(&mut horizon);
    let _destination = horizon
        .mock("GET", format!("/accounts/{}", DESTINATION).as_str())
        .with_status(404)
        .create();

    let mut session = TransactionSession::new();
    let err = session
        .build(
            &horizon_client(&horizon),
            &rpc_client(&rpc),
            &details(&horizon, &rpc),
            params(DESTINATION, "0.5"),
        )
        .unwrap_err();
    assert_eq!(err.details.as_deref(), Some("transaction.errors.minimumXlmForNewAccount"));
    assert!(err.message.starts_with("Failed to build payment transaction"));
    assert_eq!(session.error(), Some(&err));
    assert!(session.transaction_xdr().is_none());
}

#[test]
fn contract_destination_is_simulated_before_signing() {
    let mut horizon = Server::new();
    let mut rpc = Server::new();
    let _sender = mock_sender(&mut horizon);
    let _time = mock_time(&mut horizon);
    let simulate = rpc
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"method":"simulateTransaction"}"#.to_string()))
        .with_status(200)
        .with_body(
            r#"{"jsonrpc":"2.0","id":1,"result":{"transactionData":"AAAAAAAAAAAAAAAAAAAAZAAAAMgAAAEsAAAAAAAAE4g=","minResourceFee":"5000","results":[{"auth":[],"xdr":"AAAAAQ=="}],"latestLedger":1000}}"#,
        )
        .expect(1)
        .create();

    let mut session = TransactionSession::new();
    let xdr = session
        .build(
            &horizon_client(&horizon),
            &rpc_client(&rpc),
            &details(&horizon, &rpc),
            params(CONTRACT, "2.5"),
        )
        .unwrap();
    simulate.assert();

    let envelope = TransactionEnvelope::from_xdr_base64(&xdr).unwrap();
    let tx = envelope.transaction();
    assert_eq!(tx.fee, 5_100);
    assert_eq!(tx.soroban_data.as_ref().unwrap().resource_fee(), 5_000);
    assert!(tx.is_soroban());

    let signed = session.sign(SECRET, Network::Testnet).unwrap();
    assert_eq!(TransactionEnvelope::from_xdr_base64(&signed).unwrap().signatures().len(), 1);
}

#[test]
fn gateway_timeouts_are_retried_then_reported() {
    let mut horizon = Server::new();
    let submit = horizon
        .mock("POST", "/transactions")
        .with_status(504)
        .with_body(r#"{"status":504,"title":"Timeout"}"#)
        .expect(3)
        .create();

    let keypair = Keypair::from_secret(SECRET).unwrap();
    let envelope = signed_payment(&keypair);

    let err = stellar_wallet_core::tx::submit_transaction(&horizon_client(&horizon), &envelope, &no_backoff(2))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::GatewayTimeout);
    submit.assert();
}

#[test]
fn rejected_submission_carries_result_codes() {
    let mut horizon = Server::new();
    let _submit = horizon
        .mock("POST", "/transactions")
        .with_status(400)
        .with_body(
            r#"{"title":"Transaction Failed","extras":{"result_codes":{"transaction":"tx_bad_seq"}}}"#,
        )
        .create();

    let keypair = Keypair::from_secret(SECRET).unwrap();
    let err = stellar_wallet_core::tx::submit_transaction(
        &horizon_client(&horizon),
        &signed_payment(&keypair),
        &no_backoff(3),
    )
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransactionRejected);
    assert!(err.details.unwrap().contains("tx_bad_seq"));
}

#[test]
fn network_fees_follow_fee_stats_and_fall_back() {
    let mut horizon = Server::new();
    let _stats = horizon
        .mock("GET", "/fee_stats")
        .with_status(200)
        .with_body(r#"{"ledger_capacity_usage":"0.97","max_fee":{"mode":"250","p90":"5000"}}"#)
        .create();
    let fees = get_network_fees(&horizon_client(&horizon));
    assert_eq!(fees.recommended_fee, "0.000025");
    assert_eq!(fees.network_congestion, NetworkCongestion::High);

    let mut down = Server::new();
    let _error = down.mock("GET", "/fee_stats").with_status(500).create();
    let fees = get_network_fees(&horizon_client(&down));
    assert_eq!(fees.recommended_fee, "0.00001");
    assert_eq!(fees.network_congestion, NetworkCongestion::Low);
}

fn signed_payment(keypair: &Keypair) -> String {
    use stellar_wallet_core::stellar::{Asset, MuxedAccount, Operation, TransactionBuilder};

    let tx = TransactionBuilder::new(MuxedAccount::from_address(&keypair.public_key()).unwrap(), 2, 100)
        .timeout(1_700_000_000, 180)
        .add_operation(Operation::payment(
            MuxedAccount::from_address(DESTINATION).unwrap(),
            Asset::Native,
            1,
        ))
        .build()
        .unwrap();
    let mut envelope = TransactionEnvelope::unsigned(tx);
    let hash = envelope.hash(Network::Testnet.passphrase());
    envelope.add_signature(keypair.sign_decorated(&hash)).unwrap();
    envelope.to_xdr_base64()
}
