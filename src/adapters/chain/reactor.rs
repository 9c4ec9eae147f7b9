//! Reactor Chain Adapter - Protocol, Token, Oracle, and Factory Bindings
//!
//! Implements both ports against the live contracts: the read surface
//! via `eth_call` with selector-built calldata, and the write surface via
//! signed transactions from the provider's local wallet. Contract
//! addresses come from `config.toml`; the base token address is the one
//! exception — it is owned by the reactor and read on-chain.
//!
//! `await_confirmation` polls for the receipt indefinitely. There is no
//! timeout by design: once a transaction is submitted, its fate is
//! decided by the chain, and the caller's only recourse is external.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::{ChainConfig, ContractsConfig};
use crate::domain::deploy::DeployParams;
use crate::domain::intent::{ReactorCall, TxHandle};
use crate::ports::protocol_reader::ProtocolReader;
use crate::ports::tx_submitter::{TxReceiptInfo, TxSubmitter};

use super::abi;
use super::gas::GasPolicy;
use super::provider::EvmProvider;

/// Protocol contract addresses resolved from config.
#[derive(Debug, Clone, Copy)]
pub struct ChainAddresses {
    pub reactor: Address,
    pub stable_coin: Address,
    pub reserve_coin: Address,
    pub oracle: Address,
    pub factory: Option<Address>,
}

impl ChainAddresses {
    pub fn from_config(config: &ContractsConfig) -> Result<Self> {
        let parse = |name: &str, value: &str| -> Result<Address> {
            value
                .parse::<Address>()
                .with_context(|| format!("Invalid address for {name}: {value}"))
        };
        Ok(Self {
            reactor: parse("contracts.reactor", &config.reactor)?,
            stable_coin: parse("contracts.stable_coin", &config.stable_coin)?,
            reserve_coin: parse("contracts.reserve_coin", &config.reserve_coin)?,
            oracle: parse("contracts.oracle", &config.oracle)?,
            factory: config
                .factory
                .as_deref()
                .map(|f| parse("contracts.factory", f))
                .transpose()?,
        })
    }
}

/// Live implementation of the read and write ports.
pub struct ReactorContracts {
    provider: Arc<EvmProvider>,
    gas: GasPolicy,
    addresses: ChainAddresses,
    confirmation_poll: Duration,
}

impl ReactorContracts {
    pub fn new(
        provider: Arc<EvmProvider>,
        gas: GasPolicy,
        addresses: ChainAddresses,
        chain: &ChainConfig,
    ) -> Self {
        Self {
            provider,
            gas,
            addresses,
            confirmation_poll: Duration::from_millis(chain.confirmation_poll_ms),
        }
    }

    pub fn addresses(&self) -> &ChainAddresses {
        &self.addresses
    }

    async fn read(&self, to: Address, calldata: Vec<u8>) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(calldata).into());
        self.provider
            .inner()
            .call(&tx)
            .await
            .with_context(|| format!("eth_call to {to} failed"))
    }

    async fn read_u256(&self, to: Address, calldata: Vec<u8>) -> Result<U256> {
        abi::decode_u256(&self.read(to, calldata).await?)
    }

    /// Sign and broadcast a transaction; returns once the node accepts it.
    async fn send(
        &self,
        to: Address,
        calldata: Vec<u8>,
        gas_limit: Option<u64>,
    ) -> Result<TxHandle> {
        let Some(from) = self.provider.sender() else {
            bail!("no signing key configured — set {}", super::provider::PRIVATE_KEY_ENV);
        };

        let mut tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(calldata).into())
            .with_from(from);
        if let Some(gas) = gas_limit {
            tx = tx.with_gas_limit(gas);
        }

        let pending = self
            .provider
            .inner()
            .send_transaction(tx)
            .await
            .context("transaction submission failed")?;

        Ok(TxHandle(*pending.tx_hash()))
    }
}

#[async_trait]
impl ProtocolReader for ReactorContracts {
    async fn sc_price(&self) -> Result<U256> {
        self.read_u256(
            self.addresses.reactor,
            abi::encode_u256_arg("scPrice(uint256)", U256::ZERO),
        )
        .await
    }

    async fn rc_target_price(&self) -> Result<U256> {
        self.read_u256(
            self.addresses.reactor,
            abi::encode_u256_arg("rcTargetPrice(uint256)", U256::ZERO),
        )
        .await
    }

    async fn reserve_ratio(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("ratio()"))
            .await
    }

    async fn reserve(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("R()"))
            .await
    }

    async fn liabilities(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("L()"))
            .await
    }

    async fn trade_fee(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("fee()"))
            .await
    }

    async fn treasury_fee(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("treasuryFee()"))
            .await
    }

    async fn tx_limit(&self) -> Result<U256> {
        self.read_u256(self.addresses.reactor, abi::encode_no_args("txLimit()"))
            .await
    }

    async fn base_coin(&self) -> Result<Address> {
        let data = self
            .read(self.addresses.reactor, abi::encode_no_args("baseCoin()"))
            .await?;
        abi::decode_address(&data)
    }

    async fn oracle_price(&self) -> Result<U256> {
        self.read_u256(self.addresses.oracle, abi::encode_no_args("readData()"))
            .await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.read_u256(token, abi::encode_balance_of(owner)).await
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        self.read_u256(token, abi::encode_allowance(owner, spender))
            .await
    }

    async fn total_supply(&self, token: Address) -> Result<U256> {
        self.read_u256(token, abi::encode_no_args("totalSupply()"))
            .await
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}

#[async_trait]
impl TxSubmitter for ReactorContracts {
    #[instrument(skip(self), fields(token = %token, amount = %amount))]
    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHandle> {
        let handle = self
            .send(
                token,
                abi::encode_approve(spender, amount),
                Some(self.gas.approve_gas()),
            )
            .await?;
        info!(tx = %handle, "approval broadcast");
        Ok(handle)
    }

    #[instrument(skip(self, call), fields(function = call.function_name()))]
    async fn submit_trade(&self, call: &ReactorCall) -> Result<TxHandle> {
        let handle = self
            .send(
                self.addresses.reactor,
                abi::encode_reactor_call(call),
                self.gas.trade_gas(call),
            )
            .await?;
        info!(tx = %handle, "trade broadcast");
        Ok(handle)
    }

    #[instrument(skip(self, params), fields(stablecoin = %params.stablecoin_name))]
    async fn submit_deploy(&self, params: &DeployParams) -> Result<TxHandle> {
        let Some(factory) = self.addresses.factory.filter(|a| *a != Address::ZERO) else {
            bail!("no factory configured for this chain");
        };
        let handle = self.send(factory, abi::encode_deploy(params), None).await?;
        info!(tx = %handle, "deployment broadcast");
        Ok(handle)
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxReceiptInfo> {
        loop {
            let receipt = self
                .provider
                .inner()
                .get_transaction_receipt(handle.0)
                .await
                .context("receipt query failed")?;

            match receipt {
                Some(receipt) => {
                    let succeeded = receipt.status();
                    debug!(tx = %handle, succeeded, "receipt observed");
                    return Ok(TxReceiptInfo {
                        handle: *handle,
                        block_number: receipt.block_number,
                        succeeded,
                    });
                }
                None => tokio::time::sleep(self.confirmation_poll).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_from_config() {
        let config = ContractsConfig {
            reactor: format!("0x{}", "11".repeat(20)),
            stable_coin: format!("0x{}", "22".repeat(20)),
            reserve_coin: format!("0x{}", "33".repeat(20)),
            oracle: format!("0x{}", "44".repeat(20)),
            factory: None,
        };
        let addresses = ChainAddresses::from_config(&config).unwrap();
        assert_eq!(addresses.reactor, Address::repeat_byte(0x11));
        assert!(addresses.factory.is_none());
    }

    #[test]
    fn test_bad_address_in_config_is_rejected() {
        let config = ContractsConfig {
            reactor: "0xzzz".to_string(),
            stable_coin: format!("0x{}", "22".repeat(20)),
            reserve_coin: format!("0x{}", "33".repeat(20)),
            oracle: format!("0x{}", "44".repeat(20)),
            factory: None,
        };
        assert!(ChainAddresses::from_config(&config).is_err());
    }
}
