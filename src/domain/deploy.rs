//! Factory deployment parameters and validation.
//!
//! Every field is checked before the factory call is built; a request that
//! fails validation never reaches the chain. Addresses must be 20-byte hex
//! with a `0x` prefix, the price feed ID must be a 32-byte hex value, and
//! the critical reserve ratio is a percentage of at least 100 converted to
//! an 18-decimal fixed-point multiplier.

use alloy::primitives::{Address, FixedBytes, U256};
use serde::Deserialize;

use super::error::ValidationError;
use super::wad::{parse_wad, WAD};

/// Raw deployment input as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub stablecoin_name: String,
    pub base_asset_name: String,
    pub base_asset_symbol: String,
    pub pegged_asset_name: String,
    pub pegged_asset_symbol: String,
    pub base_token: String,
    pub oracle_address: String,
    pub price_feed_id: String,
    pub treasury: String,
    /// Percentage, e.g. `"400"` for a 400% critical ratio.
    pub critical_reserve_ratio: String,
}

/// Operator-configured values merged into every deployment.
#[derive(Debug, Clone)]
pub struct DeployDefaults {
    pub reserve_token_name: String,
    pub reserve_token_symbol: String,
    pub fission_fee_wad: U256,
    pub fusion_fee_wad: U256,
}

/// Fully validated `deployReactor` arguments, in ABI parameter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub stablecoin_name: String,
    pub base_asset_name: String,
    pub base_asset_symbol: String,
    pub pegged_asset_name: String,
    pub pegged_asset_symbol: String,
    pub base_token: Address,
    pub oracle_address: Address,
    pub price_feed_id: FixedBytes<32>,
    pub reserve_token_name: String,
    pub reserve_token_symbol: String,
    pub treasury: Address,
    pub fission_fee_wad: U256,
    pub fusion_fee_wad: U256,
    pub critical_reserve_ratio_wad: U256,
}

impl DeployRequest {
    pub fn validate(&self, defaults: &DeployDefaults) -> Result<DeployParams, ValidationError> {
        let stablecoin_name = required(&self.stablecoin_name, "stablecoin name")?;
        let base_asset_name = required(&self.base_asset_name, "base asset name")?;
        let base_asset_symbol = required(&self.base_asset_symbol, "base asset symbol")?;
        let pegged_asset_name = required(&self.pegged_asset_name, "stable token name")?;
        let pegged_asset_symbol = required(&self.pegged_asset_symbol, "stable token symbol")?;

        let base_token = strict_address(&self.base_token, "base token address")?;
        let oracle_address = strict_address(&self.oracle_address, "oracle address")?;
        let treasury = strict_address(&self.treasury, "treasury address")?;
        let price_feed_id = price_feed_id(&self.price_feed_id)?;
        let critical_reserve_ratio_wad = ratio_wad(&self.critical_reserve_ratio)?;

        Ok(DeployParams {
            stablecoin_name,
            base_asset_name,
            base_asset_symbol,
            pegged_asset_name,
            pegged_asset_symbol,
            base_token,
            oracle_address,
            price_feed_id,
            reserve_token_name: defaults.reserve_token_name.clone(),
            reserve_token_symbol: defaults.reserve_token_symbol.clone(),
            treasury,
            fission_fee_wad: defaults.fission_fee_wad,
            fusion_fee_wad: defaults.fusion_fee_wad,
            critical_reserve_ratio_wad,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn strict_address(value: &str, field: &'static str) -> Result<Address, ValidationError> {
    let trimmed = value.trim();
    let err = ValidationError::MalformedAddress { field };
    let Some(hex) = trimmed.strip_prefix("0x") else {
        return Err(err);
    };
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(err);
    }
    trimmed.parse::<Address>().map_err(|_| err)
}

fn price_feed_id(value: &str) -> Result<FixedBytes<32>, ValidationError> {
    let trimmed = value.trim();
    let Some(hex) = trimmed.strip_prefix("0x") else {
        return Err(ValidationError::MalformedPriceId);
    };
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::MalformedPriceId);
    }
    trimmed
        .parse::<FixedBytes<32>>()
        .map_err(|_| ValidationError::MalformedPriceId)
}

/// Percentage string → 18-decimal multiplier, floor at 100%.
fn ratio_wad(value: &str) -> Result<U256, ValidationError> {
    let percent_wad =
        parse_wad(value, "critical reserve ratio").map_err(|_| ValidationError::RatioTooLow)?;
    if percent_wad < U256::from(100u64) * WAD {
        return Err(ValidationError::RatioTooLow);
    }
    let ratio = percent_wad / U256::from(100u64);
    if ratio < WAD {
        return Err(ValidationError::RatioTooLow);
    }
    Ok(ratio)
}
