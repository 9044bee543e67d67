//! Soroban token contract helpers

use sha2::{Digest, Sha256};

use super::asset::Asset;
use super::invocation::InvokeContractArgs;
use super::scval::{ScAddress, ScVal};
use super::strkey;
use super::transaction::network_id;
use super::xdr::{XdrCodec, XdrWriter};
use crate::error::{WalletError, WalletResult};
use crate::types::Network;

const ENVELOPE_TYPE_CONTRACT_ID: u32 = 8;
const CONTRACT_ID_PREIMAGE_FROM_ASSET: u32 = 1;

/// Native asset contract on the public network
pub const PUBLIC_NATIVE_CONTRACT_ID: &str =
    "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA";
/// Native asset contract on testnet
pub const TESTNET_NATIVE_CONTRACT_ID: &str =
    "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC";

pub const TRANSFER_FN: &str = "transfer";

/// True for a well-formed C... contract address
pub fn is_contract_id(address: &str) -> bool {
    strkey::decode_contract(address).is_ok()
}

/// Native token contract for a network, if one is published
pub fn native_contract_id(network: Network) -> Option<&'static str> {
    match network {
        Network::Public => Some(PUBLIC_NATIVE_CONTRACT_ID),
        Network::Testnet => Some(TESTNET_NATIVE_CONTRACT_ID),
        Network::Futurenet => None,
    }
}

pub fn get_contract_id_for_native_token(network: Network) -> WalletResult<String> {
    native_contract_id(network)
        .map(str::to_string)
        .ok_or_else(|| {
            WalletError::invalid_input(format!(
                "Native token contract is not available on {}",
                network
            ))
        })
}

/// Stellar Asset Contract id derived from a classic asset
pub fn contract_id_for_asset(asset: &Asset, network_passphrase: &str) -> String {
    let mut w = XdrWriter::new();
    w.u32(ENVELOPE_TYPE_CONTRACT_ID);
    w.fixed(&network_id(network_passphrase));
    w.u32(CONTRACT_ID_PREIMAGE_FROM_ASSET);
    asset.encode(&mut w);

    let hash: [u8; 32] = Sha256::digest(w.into_bytes()).into();
    strkey::encode_contract(&hash)
}

/// `transfer(from, to, amount)` call on a token contract
pub fn transfer_invocation(
    contract_id: &str,
    from: &str,
    to: &str,
    amount: i128,
) -> WalletResult<InvokeContractArgs> {
    let contract = strkey::decode_contract(contract_id)
        .map_err(|e| e.context("Invalid token contract"))?;
    Ok(InvokeContractArgs {
        contract_address: ScAddress::Contract(contract),
        function_name: TRANSFER_FN.to_string(),
        args: vec![ScVal::address(from)?, ScVal::address(to)?, ScVal::I128(amount)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_contract_matches_derivation() {
        for network in [Network::Public, Network::Testnet] {
            let derived = contract_id_for_asset(&Asset::Native, network.passphrase());
            assert_eq!(Some(derived.as_str()), native_contract_id(network));
        }
        assert!(get_contract_id_for_native_token(Network::Futurenet).is_err());
    }

    #[test]
    fn test_is_contract_id() {
        assert!(is_contract_id(PUBLIC_NATIVE_CONTRACT_ID));
        assert!(!is_contract_id("GDMTVHLWJTHSUDMZVVMXXH6VJHA2ZV3HNG5LYNAZ6RTWB7GISM6PGTUV"));
        assert!(!is_contract_id("C123"));
    }

    #[test]
    fn test_transfer_invocation() {
        let args = transfer_invocation(
            TESTNET_NATIVE_CONTRACT_ID,
            "GDMTVHLWJTHSUDMZVVMXXH6VJHA2ZV3HNG5LYNAZ6RTWB7GISM6PGTUV",
            PUBLIC_NATIVE_CONTRACT_ID,
            15_000_000,
        )
        .unwrap();
        assert_eq!(args.function_name, "transfer");
        assert_eq!(args.args.len(), 3);
        assert_eq!(args.args[2], ScVal::I128(15_000_000));
    }
}
