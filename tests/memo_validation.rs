//! Memo-required detection against mocked directory and Horizon servers

use std::time::Duration;

use mockito::{Server, ServerGuard};
use stellar_wallet_core::api::HorizonClient;
use stellar_wallet_core::memo::{
    CachedMemoDirectory, MemoCheckInput, MemoValidator, StellarExpertDirectory,
};
use stellar_wallet_core::stellar::{
    Asset, Memo, MuxedAccount, Operation, TransactionBuilder, TransactionEnvelope, XdrCodec,
};
use stellar_wallet_core::utils::HttpClient;
use stellar_wallet_core::Network;

const SOURCE: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
const EXCHANGE: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";
const WALLET: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

fn payment_xdr(destination: &str, memo: Memo) -> String {
    let tx = TransactionBuilder::new(MuxedAccount::from_address(SOURCE).unwrap(), 1, 100)
        .memo(memo)
        .add_operation(Operation::payment(
            MuxedAccount::from_address(destination).unwrap(),
            Asset::Native,
            10,
        ))
        .build()
        .unwrap();
    TransactionEnvelope::unsigned(tx).to_xdr_base64()
}

fn check(xdr: String) -> MemoCheckInput {
    MemoCheckInput {
        xdr: Some(xdr),
        transaction_memo: None,
        network: Some(Network::Public),
        validation_enabled: true,
    }
}

fn validator(server: &ServerGuard) -> MemoValidator<StellarExpertDirectory> {
    let source = StellarExpertDirectory::new(
        format!("{}/explorer/directory", server.url()),
        HttpClient::new(5).unwrap(),
    );
    MemoValidator::new(CachedMemoDirectory::new(source, Duration::from_secs(3600)))
}

fn mock_directory(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
    server
        .mock("GET", "/explorer/directory")
        .with_status(200)
        .with_body(format!(
            r#"{{"_embedded":{{"records":[{{"address":"{}","name":"Exchange","domain":"exchange.example","tags":["exchange","memo-required"]}}]}}}}"#,
            EXCHANGE
        ))
        .expect(hits)
        .create()
}

fn horizon(server: &ServerGuard) -> HorizonClient {
    HorizonClient::new(server.url(), HttpClient::new(5).unwrap())
}

#[test]
fn listed_exchange_without_memo_is_flagged_and_directory_is_cached() {
    let mut directory = Server::new();
    let horizon_server = Server::new();
    let listing = mock_directory(&mut directory, 1);

    let validator = validator(&directory);
    let client = horizon(&horizon_server);

    assert!(validator.validate(&client, &check(payment_xdr(EXCHANGE, Memo::None))).is_memo_missing);
    assert!(!validator
        .validate(&client, &check(payment_xdr(EXCHANGE, Memo::Id(7))))
        .is_memo_missing);

    let mut session_memo = check(payment_xdr(EXCHANGE, Memo::None));
    session_memo.transaction_memo = Some("1234".to_string());
    assert!(!validator.validate(&client, &session_memo).is_memo_missing);

    // Same destination again, still served from the cache
    let mut other = check(payment_xdr(EXCHANGE, Memo::None));
    other.transaction_memo = Some(String::new());
    assert!(validator.validate(&client, &other).is_memo_missing);
    listing.assert();
}

#[test]
fn unlisted_destination_falls_back_to_account_data() {
    let mut directory = Server::new();
    let mut horizon_server = Server::new();
    let _listing = mock_directory(&mut directory, 1);
    let account = horizon_server
        .mock("GET", format!("/accounts/{}", WALLET).as_str())
        .with_status(200)
        .with_body(format!(
            r#"{{"id":"{}","sequence":"1","data":{{"config.memo_required":"MQ=="}}}}"#,
            WALLET
        ))
        .expect(1)
        .create();

    let validator = validator(&directory);
    let result = validator.validate(&horizon(&horizon_server), &check(payment_xdr(WALLET, Memo::None)));
    assert!(result.is_memo_missing);
    assert!(!result.is_validating_memo);
    account.assert();
}

#[test]
fn horizon_failure_is_treated_as_missing_memo() {
    let mut directory = Server::new();
    let mut horizon_server = Server::new();
    let _listing = directory.mock("GET", "/explorer/directory").with_status(503).create();
    let _account = horizon_server
        .mock("GET", format!("/accounts/{}", WALLET).as_str())
        .with_status(500)
        .create();

    let validator = validator(&directory);
    assert!(validator
        .validate(&horizon(&horizon_server), &check(payment_xdr(WALLET, Memo::None)))
        .is_memo_missing);
}

#[test]
fn testnet_and_disabled_checks_make_no_requests() {
    let mut directory = Server::new();
    let horizon_server = Server::new();
    let listing = mock_directory(&mut directory, 0);

    let validator = validator(&directory);
    let client = horizon(&horizon_server);

    let mut testnet = check(payment_xdr(EXCHANGE, Memo::None));
    testnet.network = Some(Network::Testnet);
    assert!(!validator.validate(&client, &testnet).is_memo_missing);

    let mut disabled = check(payment_xdr(EXCHANGE, Memo::None));
    disabled.validation_enabled = false;
    assert!(!validator.validate(&client, &disabled).is_memo_missing);
    listing.assert();
}
