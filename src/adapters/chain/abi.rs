//! ABI Encoding - Selectors and Calldata for the Protocol Surface
//!
//! Builds calldata as `keccak256(signature)[..4]` plus ABI-encoded
//! parameters, and decodes the single-word responses the read surface
//! returns. Parameter order is fixed by the contracts; the encoding of
//! each call shape is pinned by unit tests below.

use alloy::primitives::{keccak256, Address, Bytes, U256};
use alloy::sol_types::SolValue;
use anyhow::{ensure, Result};

use crate::domain::deploy::DeployParams;
use crate::domain::intent::ReactorCall;

pub const DEPLOY_REACTOR_SIGNATURE: &str = "deployReactor(string,string,string,string,string,\
address,address,bytes32,string,string,address,uint256,uint256,uint256)";

/// Four-byte function selector for a Solidity signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn with_selector(signature: &str, params: Vec<u8>) -> Vec<u8> {
    let mut calldata = Vec::with_capacity(4 + params.len());
    calldata.extend_from_slice(&selector(signature));
    calldata.extend_from_slice(&params);
    calldata
}

/// Calldata for a zero-argument view function.
pub fn encode_no_args(signature: &str) -> Vec<u8> {
    selector(signature).to_vec()
}

/// Calldata for a single-`uint256` view function (the price feeds take
/// an index argument).
pub fn encode_u256_arg(signature: &str, value: U256) -> Vec<u8> {
    with_selector(signature, (value,).abi_encode_params())
}

/// `approve(spender, amount)` calldata.
pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    with_selector("approve(address,uint256)", (spender, amount).abi_encode_params())
}

/// `balanceOf(owner)` calldata.
pub fn encode_balance_of(owner: Address) -> Vec<u8> {
    with_selector("balanceOf(address)", (owner,).abi_encode_params())
}

/// `allowance(owner, spender)` calldata.
pub fn encode_allowance(owner: Address, spender: Address) -> Vec<u8> {
    with_selector("allowance(address,address)", (owner, spender).abi_encode_params())
}

/// Calldata for one of the five reactor trade calls.
pub fn encode_reactor_call(call: &ReactorCall) -> Vec<u8> {
    let params = match call {
        ReactorCall::BuyStablecoins { receiver, fee_ui, ui_address, amount }
        | ReactorCall::BuyReserveCoins { receiver, fee_ui, ui_address, amount } => {
            (*receiver, *fee_ui, *ui_address, *amount).abi_encode_params()
        }
        ReactorCall::SellStablecoins { amount, receiver, fee_ui, ui_address }
        | ReactorCall::SellReserveCoins { amount, receiver, fee_ui, ui_address } => {
            (*amount, *receiver, *fee_ui, *ui_address).abi_encode_params()
        }
        ReactorCall::SellBothCoins {
            stable_amount,
            reserve_amount,
            receiver,
            fee_ui,
            ui_address,
        } => (*stable_amount, *reserve_amount, *receiver, *fee_ui, *ui_address)
            .abi_encode_params(),
    };
    with_selector(call.signature(), params)
}

/// `deployReactor(...)` calldata, 14 parameters in factory ABI order.
pub fn encode_deploy(params: &DeployParams) -> Vec<u8> {
    let args = (
        params.stablecoin_name.clone(),
        params.base_asset_name.clone(),
        params.base_asset_symbol.clone(),
        params.pegged_asset_name.clone(),
        params.pegged_asset_symbol.clone(),
        params.base_token,
        params.oracle_address,
        params.price_feed_id,
        params.reserve_token_name.clone(),
        params.reserve_token_symbol.clone(),
        params.treasury,
        params.fission_fee_wad,
        params.fusion_fee_wad,
        params.critical_reserve_ratio_wad,
    )
        .abi_encode_params();
    with_selector(DEPLOY_REACTOR_SIGNATURE, args)
}

/// Decode a single `uint256` return word.
pub fn decode_u256(data: &Bytes) -> Result<U256> {
    ensure!(data.len() >= 32, "short response: {} bytes", data.len());
    Ok(U256::from_be_slice(&data[..32]))
}

/// Decode a single `address` return word.
pub fn decode_address(data: &Bytes) -> Result<Address> {
    ensure!(data.len() >= 32, "short response: {} bytes", data.len());
    Ok(Address::from_slice(&data[12..32]))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::FixedBytes;

    use super::*;

    fn word(data: &[u8], index: usize) -> &[u8] {
        &data[4 + index * 32..4 + (index + 1) * 32]
    }

    fn addr_word(address: Address) -> [u8; 32] {
        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(address.as_slice());
        padded
    }

    #[test]
    fn test_buy_stablecoins_orders_receiver_fee_ui_amount() {
        let receiver = Address::repeat_byte(0x01);
        let ui = Address::repeat_byte(0x02);
        let call = ReactorCall::BuyStablecoins {
            receiver,
            fee_ui: U256::from(7u64),
            ui_address: ui,
            amount: U256::from(100u64),
        };
        let data = encode_reactor_call(&call);

        assert_eq!(data.len(), 4 + 4 * 32);
        assert_eq!(word(&data, 0), addr_word(receiver));
        assert_eq!(word(&data, 1), U256::from(7u64).to_be_bytes::<32>());
        assert_eq!(word(&data, 2), addr_word(ui));
        assert_eq!(word(&data, 3), U256::from(100u64).to_be_bytes::<32>());
    }

    #[test]
    fn test_sell_stablecoins_puts_amount_first() {
        let receiver = Address::repeat_byte(0x01);
        let call = ReactorCall::SellStablecoins {
            amount: U256::from(9u64),
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
        };
        let data = encode_reactor_call(&call);

        assert_eq!(word(&data, 0), U256::from(9u64).to_be_bytes::<32>());
        assert_eq!(word(&data, 1), addr_word(receiver));
    }

    #[test]
    fn test_sell_both_orders_stable_then_reserve() {
        let receiver = Address::repeat_byte(0x01);
        let call = ReactorCall::SellBothCoins {
            stable_amount: U256::from(50u64),
            reserve_amount: U256::from(25u64),
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
        };
        let data = encode_reactor_call(&call);

        assert_eq!(data.len(), 4 + 5 * 32);
        assert_eq!(word(&data, 0), U256::from(50u64).to_be_bytes::<32>());
        assert_eq!(word(&data, 1), U256::from(25u64).to_be_bytes::<32>());
        assert_eq!(word(&data, 2), addr_word(receiver));
    }

    #[test]
    fn test_buy_and_sell_selectors_differ() {
        let receiver = Address::repeat_byte(0x01);
        let buy = ReactorCall::BuyStablecoins {
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
            amount: U256::from(1u64),
        };
        let sell = ReactorCall::SellStablecoins {
            amount: U256::from(1u64),
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
        };
        assert_ne!(
            encode_reactor_call(&buy)[..4],
            encode_reactor_call(&sell)[..4]
        );
    }

    #[test]
    fn test_approve_encodes_spender_then_amount() {
        let spender = Address::repeat_byte(0xAA);
        let data = encode_approve(spender, U256::from(42u64));

        assert_eq!(data.len(), 4 + 2 * 32);
        assert_eq!(word(&data, 0), addr_word(spender));
        assert_eq!(word(&data, 1), U256::from(42u64).to_be_bytes::<32>());
    }

    #[test]
    fn test_deploy_head_layout() {
        let params = DeployParams {
            stablecoin_name: "Digital Dollar".to_string(),
            base_asset_name: "Wrapped Ether".to_string(),
            base_asset_symbol: "WETH".to_string(),
            pegged_asset_name: "Digital Dollar Token".to_string(),
            pegged_asset_symbol: "DDT".to_string(),
            base_token: Address::repeat_byte(0x11),
            oracle_address: Address::repeat_byte(0x22),
            price_feed_id: FixedBytes::repeat_byte(0xAB),
            reserve_token_name: "Reserve Coin".to_string(),
            reserve_token_symbol: "RC".to_string(),
            treasury: Address::repeat_byte(0x33),
            fission_fee_wad: U256::from(5_000_000_000_000_000u64),
            fusion_fee_wad: U256::from(5_000_000_000_000_000u64),
            critical_reserve_ratio_wad: U256::from(4u64) * U256::from(10u64).pow(U256::from(18)),
        };
        let data = encode_deploy(&params);

        // 14 head words; the first is the offset of the first string's
        // tail, which sits right after the head.
        assert_eq!(word(&data, 0), U256::from(14 * 32).to_be_bytes::<32>());
        // Static params sit in place: base token at slot 5, oracle at 6,
        // price feed id at 7, treasury at 10, fees and ratio at 11-13.
        assert_eq!(word(&data, 5), addr_word(params.base_token));
        assert_eq!(word(&data, 6), addr_word(params.oracle_address));
        assert_eq!(word(&data, 7), params.price_feed_id.as_slice());
        assert_eq!(word(&data, 10), addr_word(params.treasury));
        assert_eq!(word(&data, 12), params.fusion_fee_wad.to_be_bytes::<32>());
    }

    #[test]
    fn test_decode_u256_rejects_short_responses() {
        assert!(decode_u256(&Bytes::from(vec![0u8; 16])).is_err());
        let word = U256::from(5u64).to_be_bytes::<32>();
        assert_eq!(
            decode_u256(&Bytes::from(word.to_vec())).unwrap(),
            U256::from(5u64)
        );
    }

    #[test]
    fn test_decode_address_takes_low_20_bytes() {
        let address = Address::repeat_byte(0x44);
        let data = Bytes::from(addr_word(address).to_vec());
        assert_eq!(decode_address(&data).unwrap(), address);
    }
}
