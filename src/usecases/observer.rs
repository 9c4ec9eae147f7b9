//! Protocol Observer - Market and Account Snapshots
//!
//! Gathers the reactor's public read surface into one snapshot per poll:
//! health ratio, reserve and liabilities, the two price feeds, fees, and
//! token supplies; plus per-account portfolios (balances and standing
//! allowances). Raw values stay as fixed-point integers; views carry
//! display decimals only and never feed back into trade arithmetic.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::domain::wad::format_wad;
use crate::ports::protocol_reader::ProtocolReader;

/// Raw reactor state, 18-decimal fixed point throughout.
#[derive(Debug, Clone)]
pub struct ProtocolSnapshot {
    pub ratio: U256,
    pub reserve: U256,
    pub liabilities: U256,
    pub sc_price: U256,
    pub rc_target_price: U256,
    pub oracle_price: U256,
    pub trade_fee: U256,
    pub treasury_fee: U256,
    pub tx_limit: U256,
    pub base_coin: Address,
    pub stable_supply: U256,
    pub reserve_supply: U256,
}

/// Human-facing rendering of a snapshot: percentages at 2 decimals,
/// amounts and prices at 4.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolView {
    pub ratio_percent: Decimal,
    pub reserve: Decimal,
    pub liabilities: Decimal,
    pub sc_price: Decimal,
    pub rc_target_price: Decimal,
    pub oracle_price: Decimal,
    pub trade_fee_percent: Decimal,
    pub treasury_fee_percent: Decimal,
    pub tx_limit: Decimal,
    pub base_coin: Address,
    pub stable_supply: Decimal,
    pub reserve_supply: Decimal,
}

impl ProtocolSnapshot {
    pub fn view(&self) -> ProtocolView {
        ProtocolView {
            ratio_percent: percent(self.ratio),
            reserve: display(self.reserve, 4),
            liabilities: display(self.liabilities, 4),
            sc_price: display(self.sc_price, 4),
            rc_target_price: display(self.rc_target_price, 4),
            oracle_price: display(self.oracle_price, 4),
            trade_fee_percent: percent(self.trade_fee),
            treasury_fee_percent: percent(self.treasury_fee),
            tx_limit: display(self.tx_limit, 4),
            base_coin: self.base_coin,
            stable_supply: display(self.stable_supply, 4),
            reserve_supply: display(self.reserve_supply, 4),
        }
    }
}

/// One account's holdings and standing reactor allowances.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub owner: Address,
    pub base_coin: Address,
    pub base_balance: U256,
    pub stable_balance: U256,
    pub reserve_balance: U256,
    pub base_allowance: U256,
    pub stable_allowance: U256,
    pub reserve_allowance: U256,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub owner: Address,
    pub base_coin: Address,
    pub base_balance: Decimal,
    pub stable_balance: Decimal,
    pub reserve_balance: Decimal,
    pub base_allowance: Decimal,
    pub stable_allowance: Decimal,
    pub reserve_allowance: Decimal,
}

impl Portfolio {
    pub fn view(&self) -> PortfolioView {
        PortfolioView {
            owner: self.owner,
            base_coin: self.base_coin,
            base_balance: display(self.base_balance, 4),
            stable_balance: display(self.stable_balance, 4),
            reserve_balance: display(self.reserve_balance, 4),
            base_allowance: display(self.base_allowance, 4),
            stable_allowance: display(self.stable_allowance, 4),
            reserve_allowance: display(self.reserve_allowance, 4),
        }
    }
}

/// WAD → display decimal, truncated to `dp` digits.
fn display(value: U256, dp: u32) -> Decimal {
    Decimal::from_str(&format_wad(value, dp)).unwrap_or(Decimal::MAX)
}

/// WAD fraction/multiplier → percentage with 2 decimals.
fn percent(value: U256) -> Decimal {
    display(value.saturating_mul(U256::from(100u64)), 2)
}

/// Polls the protocol read surface on demand.
pub struct ProtocolObserver<R> {
    reader: Arc<R>,
    reactor: Address,
    stable_coin: Address,
    reserve_coin: Address,
}

impl<R: ProtocolReader> ProtocolObserver<R> {
    pub fn new(
        reader: Arc<R>,
        reactor: Address,
        stable_coin: Address,
        reserve_coin: Address,
    ) -> Self {
        Self { reader, reactor, stable_coin, reserve_coin }
    }

    /// Read the full market snapshot.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> anyhow::Result<ProtocolSnapshot> {
        let r = self.reader.as_ref();
        let (ratio, reserve, liabilities, sc_price, rc_target_price) = tokio::try_join!(
            r.reserve_ratio(),
            r.reserve(),
            r.liabilities(),
            r.sc_price(),
            r.rc_target_price(),
        )?;
        let (oracle_price, trade_fee, treasury_fee, tx_limit, base_coin) = tokio::try_join!(
            r.oracle_price(),
            r.trade_fee(),
            r.treasury_fee(),
            r.tx_limit(),
            r.base_coin(),
        )?;
        let (stable_supply, reserve_supply) = tokio::try_join!(
            r.total_supply(self.stable_coin),
            r.total_supply(self.reserve_coin),
        )?;

        Ok(ProtocolSnapshot {
            ratio,
            reserve,
            liabilities,
            sc_price,
            rc_target_price,
            oracle_price,
            trade_fee,
            treasury_fee,
            tx_limit,
            base_coin,
            stable_supply,
            reserve_supply,
        })
    }

    /// Read one account's balances and reactor allowances.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn portfolio(&self, owner: Address) -> anyhow::Result<Portfolio> {
        let r = self.reader.as_ref();
        let base_coin = r.base_coin().await?;

        let (base_balance, stable_balance, reserve_balance) = tokio::try_join!(
            r.balance_of(base_coin, owner),
            r.balance_of(self.stable_coin, owner),
            r.balance_of(self.reserve_coin, owner),
        )?;
        let (base_allowance, stable_allowance, reserve_allowance) = tokio::try_join!(
            r.allowance(base_coin, owner, self.reactor),
            r.allowance(self.stable_coin, owner, self.reactor),
            r.allowance(self.reserve_coin, owner, self.reactor),
        )?;

        Ok(Portfolio {
            owner,
            base_coin,
            base_balance,
            stable_balance,
            reserve_balance,
            base_allowance,
            stable_allowance,
            reserve_allowance,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::wad::WAD;

    fn snapshot() -> ProtocolSnapshot {
        ProtocolSnapshot {
            ratio: U256::from(4u64) * WAD,
            reserve: U256::from(1_250u64) * WAD,
            liabilities: U256::from(300u64) * WAD,
            sc_price: WAD / U256::from(2u64),
            rc_target_price: U256::from(3u64) * WAD,
            oracle_price: WAD,
            trade_fee: U256::from(5_000_000_000_000_000u64), // 0.5%
            treasury_fee: U256::from(2_500_000_000_000_000u64),
            tx_limit: U256::from(10_000u64) * WAD,
            base_coin: Address::repeat_byte(0xB0),
            stable_supply: U256::from(300u64) * WAD,
            reserve_supply: U256::from(80u64) * WAD,
        }
    }

    #[test]
    fn test_view_renders_ratio_as_percent() {
        let view = snapshot().view();
        assert_eq!(view.ratio_percent, dec!(400.00));
        assert_eq!(view.trade_fee_percent, dec!(0.50));
        assert_eq!(view.treasury_fee_percent, dec!(0.25));
    }

    #[test]
    fn test_view_truncates_amounts_to_four_decimals() {
        let view = snapshot().view();
        assert_eq!(view.sc_price, dec!(0.5000));
        assert_eq!(view.rc_target_price, dec!(3.0000));
        assert_eq!(view.reserve, dec!(1250.0000));
    }
}
