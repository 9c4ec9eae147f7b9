//! Trade intents and the typed reactor call shapes.
//!
//! A [`TradeIntent`] is raw user input (strings); resolving it against a
//! wallet context validates everything up front and produces a
//! [`ResolvedIntent`] of typed values. The five reactor entry points each
//! get their own [`ReactorCall`] variant with named fields — the argument
//! order baked into each variant is part of the on-chain ABI and must not
//! be reshuffled.

use std::fmt;

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::wad::{parse_fee_amount, parse_wad};
use super::wallet::WalletContext;

/// The five supported trade directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeDirection {
    /// Spend base asset, receive stablecoins.
    MintStable,
    /// Redeem stablecoins for base asset.
    RedeemStable,
    /// Spend base asset, receive reserve coins.
    MintReserve,
    /// Redeem reserve coins for base asset.
    RedeemReserve,
    /// Redeem stablecoins and reserve coins in one transaction.
    RedeemBoth,
}

impl TradeDirection {
    /// Directions that spend the base asset.
    pub fn is_mint(self) -> bool {
        matches!(self, Self::MintStable | Self::MintReserve)
    }

    /// Token the trader receives.
    pub fn output_symbol(self) -> CoinSymbol {
        match self {
            Self::MintStable => CoinSymbol::SC,
            Self::MintReserve => CoinSymbol::RC,
            Self::RedeemStable | Self::RedeemReserve | Self::RedeemBoth => CoinSymbol::BC,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MintStable => "mint-stable",
            Self::RedeemStable => "redeem-stable",
            Self::MintReserve => "mint-reserve",
            Self::RedeemReserve => "redeem-reserve",
            Self::RedeemBoth => "redeem-both",
        };
        write!(f, "{s}")
    }
}

/// Token symbols of the three protocol assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinSymbol {
    /// Base (collateral) asset.
    BC,
    /// Stablecoin.
    SC,
    /// Reserve coin.
    RC,
}

impl fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BC => write!(f, "BC"),
            Self::SC => write!(f, "SC"),
            Self::RC => write!(f, "RC"),
        }
    }
}

/// Opaque handle for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(pub B256);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw trade input as submitted by the caller.
///
/// Optional fields default from the wallet context at resolve time. The
/// fee-recipient amount is lenient (any parse failure becomes zero); every
/// other field is validated strictly.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeIntent {
    pub direction: TradeDirection,
    /// Primary amount as a decimal string, at most 18 fractional digits.
    pub amount: String,
    /// Reserve-coin amount for the dual redemption; empty means zero.
    #[serde(default)]
    pub reserve_amount: Option<String>,
    /// Recipient of the output tokens; defaults to the wallet address.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Fee amount forwarded to the front-end operator. Lenient.
    #[serde(default)]
    pub fee_ui: Option<String>,
    /// Address collecting the operator fee; defaults to the wallet address.
    #[serde(default)]
    pub ui_address: Option<String>,
}

impl TradeIntent {
    /// Validate and resolve this intent against the connected wallet.
    pub fn resolve(&self, wallet: &WalletContext) -> Result<ResolvedIntent, ValidationError> {
        let amount = parse_wad(&self.amount, "amount")?;

        let reserve_amount = match self.reserve_amount.as_deref() {
            None => U256::ZERO,
            Some(s) if s.trim().is_empty() => U256::ZERO,
            Some(s) => parse_wad(s, "reserve amount")?,
        };

        let receiver = parse_optional_address(
            self.receiver.as_deref(),
            wallet.address,
            "receiver address",
        )?;
        let ui_address = parse_optional_address(
            self.ui_address.as_deref(),
            wallet.address,
            "UI address",
        )?;

        let fee_ui = parse_fee_amount(self.fee_ui.as_deref().unwrap_or(""));

        Ok(ResolvedIntent {
            direction: self.direction,
            amount,
            reserve_amount,
            receiver,
            fee_ui,
            ui_address,
        })
    }
}

fn parse_optional_address(
    input: Option<&str>,
    default: Address,
    field: &'static str,
) -> Result<Address, ValidationError> {
    match input.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<Address>()
            .map_err(|_| ValidationError::MalformedAddress { field }),
    }
}

/// A fully validated trade, all values typed and scaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIntent {
    pub direction: TradeDirection,
    pub amount: U256,
    pub reserve_amount: U256,
    pub receiver: Address,
    pub fee_ui: U256,
    pub ui_address: Address,
}

impl ResolvedIntent {
    /// Build the reactor call for this trade. Field order within each
    /// variant matches the contract function's parameter order exactly.
    pub fn to_call(&self) -> ReactorCall {
        match self.direction {
            TradeDirection::MintStable => ReactorCall::BuyStablecoins {
                receiver: self.receiver,
                fee_ui: self.fee_ui,
                ui_address: self.ui_address,
                amount: self.amount,
            },
            TradeDirection::RedeemStable => ReactorCall::SellStablecoins {
                amount: self.amount,
                receiver: self.receiver,
                fee_ui: self.fee_ui,
                ui_address: self.ui_address,
            },
            TradeDirection::MintReserve => ReactorCall::BuyReserveCoins {
                receiver: self.receiver,
                fee_ui: self.fee_ui,
                ui_address: self.ui_address,
                amount: self.amount,
            },
            TradeDirection::RedeemReserve => ReactorCall::SellReserveCoins {
                amount: self.amount,
                receiver: self.receiver,
                fee_ui: self.fee_ui,
                ui_address: self.ui_address,
            },
            TradeDirection::RedeemBoth => ReactorCall::SellBothCoins {
                stable_amount: self.amount,
                reserve_amount: self.reserve_amount,
                receiver: self.receiver,
                fee_ui: self.fee_ui,
                ui_address: self.ui_address,
            },
        }
    }
}

/// The five reactor trade entry points, one variant per ABI function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorCall {
    BuyStablecoins {
        receiver: Address,
        fee_ui: U256,
        ui_address: Address,
        amount: U256,
    },
    SellStablecoins {
        amount: U256,
        receiver: Address,
        fee_ui: U256,
        ui_address: Address,
    },
    BuyReserveCoins {
        receiver: Address,
        fee_ui: U256,
        ui_address: Address,
        amount: U256,
    },
    SellReserveCoins {
        amount: U256,
        receiver: Address,
        fee_ui: U256,
        ui_address: Address,
    },
    SellBothCoins {
        stable_amount: U256,
        reserve_amount: U256,
        receiver: Address,
        fee_ui: U256,
        ui_address: Address,
    },
}

impl ReactorCall {
    /// Solidity function signature, the selector source.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::BuyStablecoins { .. } => "buyStablecoins(address,uint256,address,uint256)",
            Self::SellStablecoins { .. } => "sellStablecoins(uint256,address,uint256,address)",
            Self::BuyReserveCoins { .. } => "buyReserveCoins(address,uint256,address,uint256)",
            Self::SellReserveCoins { .. } => "sellReserveCoins(uint256,address,uint256,address)",
            Self::SellBothCoins { .. } => {
                "sellBothCoins(uint256,uint256,address,uint256,address)"
            }
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::BuyStablecoins { .. } => "buyStablecoins",
            Self::SellStablecoins { .. } => "sellStablecoins",
            Self::BuyReserveCoins { .. } => "buyReserveCoins",
            Self::SellReserveCoins { .. } => "sellReserveCoins",
            Self::SellBothCoins { .. } => "sellBothCoins",
        }
    }

    /// Whether this call spends the base asset (the mint path).
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::BuyStablecoins { .. } | Self::BuyReserveCoins { .. })
    }
}
