//! Trade estimate calculator.
//!
//! Converts a human-entered amount plus the latest on-chain price feeds
//! into the displayed counter-asset estimate. Pure function of its inputs,
//! safe to recompute on every keystroke; all arithmetic is integer
//! fixed-point and the display value is truncated, never rounded.
//!
//! Any missing ingredient — empty input, unparsable input, absent feed,
//! zero stablecoin price — yields the literal zero quote `"0"` instead of
//! an error. Estimation must not be able to fail.

use alloy::primitives::U256;
use serde::Serialize;

use super::intent::{CoinSymbol, TradeDirection};
use super::wad::{format_wad, parse_wad, WAD};

/// The quote shown when no estimate can be computed.
pub const ZERO_QUOTE: &str = "0";

/// Latest observed price feeds, both 18-decimal fixed point.
///
/// `sc_price` prices one stablecoin in base-asset units; `rc_target_price`
/// prices one reserve coin. Reserve-coin redemption quotes use the target
/// feed, not the stablecoin feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceFeeds {
    pub sc_price: Option<U256>,
    pub rc_target_price: Option<U256>,
}

/// A displayed estimate: amount string plus the token it is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub amount: String,
    pub token: CoinSymbol,
}

/// Estimate the counter-asset amount for a prospective trade.
pub fn estimate(direction: TradeDirection, amount: &str, feeds: &PriceFeeds) -> Quote {
    Quote {
        amount: estimate_amount(direction, amount, feeds),
        token: direction.output_symbol(),
    }
}

fn estimate_amount(direction: TradeDirection, amount: &str, feeds: &PriceFeeds) -> String {
    if amount.trim().is_empty() {
        return ZERO_QUOTE.to_string();
    }
    let Ok(amount_scaled) = parse_wad(amount, "amount") else {
        return ZERO_QUOTE.to_string();
    };
    // A missing or zero stablecoin price disables estimation for every
    // direction; zero must never reach the division below.
    let sc_price = match feeds.sc_price {
        Some(p) if p > U256::ZERO => p,
        _ => return ZERO_QUOTE.to_string(),
    };

    let scaled = match direction {
        // Buying: base-asset units ÷ price = tokens received.
        TradeDirection::MintStable | TradeDirection::MintReserve => {
            match amount_scaled.checked_mul(WAD) {
                Some(product) => product / sc_price,
                None => return ZERO_QUOTE.to_string(),
            }
        }
        // Selling stablecoins: tokens × price = base-asset units.
        TradeDirection::RedeemStable => match amount_scaled.checked_mul(sc_price) {
            Some(product) => product / WAD,
            None => return ZERO_QUOTE.to_string(),
        },
        // Reserve coins redeem against the target price feed.
        TradeDirection::RedeemReserve => {
            let Some(target) = feeds.rc_target_price else {
                return ZERO_QUOTE.to_string();
            };
            match amount_scaled.checked_mul(target) {
                Some(product) => product / WAD,
                None => return ZERO_QUOTE.to_string(),
            }
        }
        // No combined estimate for the dual redemption.
        TradeDirection::RedeemBoth => U256::ZERO,
    };

    format_wad(scaled, 6)
}
