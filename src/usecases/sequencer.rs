//! Trade Sequencer - Allowance Gate and Submission State Machine
//!
//! Owns the approve-then-trade flow for all five trade directions:
//! - Evaluates whether the reactor already holds a sufficient allowance
//!   for the token being spent; if not, submits an approval for exactly
//!   the required amount and defers the trade.
//! - Resubmits the original intent exactly once per confirmed approval;
//!   confirmations for stale or unrelated handles are ignored.
//! - For the dual redemption, gates the stablecoin leg first and only
//!   considers the reserve leg once the stable allowance clears, so at
//!   most one approval is ever in flight (two pending approvals from one
//!   account would contend for sequential nonces).
//!
//! Nothing here retries. Every failure resets the machine to `Idle` and
//! surfaces the error; trying again is a fresh caller action.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::TradeError;
use crate::domain::intent::{ResolvedIntent, TradeDirection, TradeIntent, TxHandle};
use crate::domain::wallet::WalletContext;
use crate::ports::protocol_reader::ProtocolReader;
use crate::ports::tx_submitter::{TxReceiptInfo, TxSubmitter};

/// Lifecycle of a single trade attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// An approval is pending; the trade is deferred until it confirms.
    AwaitingApproval { handle: TxHandle },
    /// The pending approval confirmed; the gate is about to re-run.
    ApprovalConfirmed,
    /// The trade call is being submitted.
    Submitting,
    /// The trade transaction is pending on-chain.
    AwaitingConfirmation { handle: TxHandle },
    /// Terminal success.
    Confirmed { handle: TxHandle },
}

/// Outcome of the allowance gate for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Allowance sufficient — proceed to trade submission.
    Open,
    /// Allowance insufficient — approve exactly `amount` on `token` first.
    NeedsApproval { token: Address, amount: U256 },
}

/// The approval currently awaiting confirmation. At most one exists.
#[derive(Debug, Clone, Copy)]
struct PendingApproval {
    handle: TxHandle,
}

/// Result of a completed attempt.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub attempt_id: Uuid,
    pub direction: TradeDirection,
    pub trade_tx: TxHandle,
    /// Approvals confirmed along the way, in submission order.
    pub approvals: Vec<TxHandle>,
}

/// Drives one trade intent from idle to confirmation.
///
/// A sequencer instance covers a single attempt; construct a fresh one
/// per trade.
pub struct TradeSequencer<R, S> {
    reader: Arc<R>,
    submitter: Arc<S>,
    wallet: WalletContext,
    reactor: Address,
    stable_coin: Address,
    reserve_coin: Address,
    attempt_id: Uuid,
    state: SequencerState,
    resolved: Option<ResolvedIntent>,
    pending: Option<PendingApproval>,
    confirmed_approvals: Vec<TxHandle>,
}

impl<R: ProtocolReader, S: TxSubmitter> TradeSequencer<R, S> {
    pub fn new(
        reader: Arc<R>,
        submitter: Arc<S>,
        wallet: WalletContext,
        reactor: Address,
        stable_coin: Address,
        reserve_coin: Address,
    ) -> Self {
        Self {
            reader,
            submitter,
            wallet,
            reactor,
            stable_coin,
            reserve_coin,
            attempt_id: Uuid::new_v4(),
            state: SequencerState::Idle,
            resolved: None,
            pending: None,
            confirmed_approvals: Vec::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Evaluate the allowance gate against freshly read chain state.
    ///
    /// Mint directions spend the base token (its address is owned by the
    /// reactor and re-read here, never configured). The dual redemption
    /// checks the stablecoin leg first; the reserve leg is only evaluated
    /// once the stable allowance is sufficient.
    pub async fn evaluate_gate(
        &self,
        intent: &ResolvedIntent,
    ) -> Result<GateDecision, TradeError> {
        match intent.direction {
            TradeDirection::MintStable | TradeDirection::MintReserve => {
                let base = self
                    .reader
                    .base_coin()
                    .await
                    .map_err(|e| TradeError::ReadFailed(e.to_string()))?;
                self.check_allowance(base, intent.amount).await
            }
            TradeDirection::RedeemStable => {
                self.check_allowance(self.stable_coin, intent.amount).await
            }
            TradeDirection::RedeemReserve => {
                self.check_allowance(self.reserve_coin, intent.amount).await
            }
            TradeDirection::RedeemBoth => {
                match self.check_allowance(self.stable_coin, intent.amount).await? {
                    GateDecision::Open => {
                        self.check_allowance(self.reserve_coin, intent.reserve_amount)
                            .await
                    }
                    closed => Ok(closed),
                }
            }
        }
    }

    async fn check_allowance(
        &self,
        token: Address,
        required: U256,
    ) -> Result<GateDecision, TradeError> {
        let current = self
            .reader
            .allowance(token, self.wallet.address, self.reactor)
            .await
            .map_err(|e| TradeError::ReadFailed(e.to_string()))?;
        if current < required {
            Ok(GateDecision::NeedsApproval { token, amount: required })
        } else {
            Ok(GateDecision::Open)
        }
    }

    /// One invocation of the trade flow: run the gate, then submit at most
    /// one transaction — either the blocking approval or the trade itself.
    ///
    /// When the gate is closed this returns `AwaitingApproval` and the
    /// caller must observe the confirmation before invoking again; the
    /// trade is never submitted in the same invocation as its approval.
    #[instrument(skip(self, intent), fields(attempt = %self.attempt_id, direction = %intent.direction))]
    pub async fn handle_trade(
        &mut self,
        intent: &TradeIntent,
    ) -> Result<SequencerState, TradeError> {
        if let Err(e) = self.wallet.ensure_connected() {
            return Err(self.fail(e));
        }

        let resolved = match &self.resolved {
            Some(r) => r.clone(),
            None => {
                let r = match intent.resolve(&self.wallet) {
                    Ok(r) => r,
                    Err(e) => return Err(self.fail(e.into())),
                };
                self.resolved = Some(r.clone());
                r
            }
        };

        let decision = match self.evaluate_gate(&resolved).await {
            Ok(d) => d,
            Err(e) => return Err(self.fail(e)),
        };

        match decision {
            GateDecision::NeedsApproval { token, amount } => {
                let submitter = Arc::clone(&self.submitter);
                let handle = match submitter.submit_approval(token, self.reactor, amount).await {
                    Ok(h) => h,
                    Err(e) => return Err(self.fail(TradeError::CallRejected(e.to_string()))),
                };
                info!(token = %token, amount = %amount, tx = %handle, "approval submitted, trade deferred");
                // Latest approval wins; a confirmation for a replaced
                // handle no longer matches.
                self.pending = Some(PendingApproval { handle });
                self.state = SequencerState::AwaitingApproval { handle };
                Ok(self.state)
            }
            GateDecision::Open => self.submit_trade(&resolved).await,
        }
    }

    async fn submit_trade(
        &mut self,
        resolved: &ResolvedIntent,
    ) -> Result<SequencerState, TradeError> {
        self.state = SequencerState::Submitting;
        let call = resolved.to_call();
        debug!(function = call.function_name(), "submitting trade call");

        let submitter = Arc::clone(&self.submitter);
        let handle = match submitter.submit_trade(&call).await {
            Ok(h) => h,
            Err(e) => return Err(self.fail(TradeError::CallRejected(e.to_string()))),
        };
        info!(function = call.function_name(), tx = %handle, "trade submitted");
        self.state = SequencerState::AwaitingConfirmation { handle };
        Ok(self.state)
    }

    /// Observe an approval confirmation.
    ///
    /// Returns true only when `handle` matches the recorded pending
    /// approval; the caller then re-invokes `handle_trade` exactly once.
    /// Clearing the record here is what makes that resubmission
    /// idempotent — a duplicate or stale confirmation finds nothing to
    /// match and is ignored.
    pub fn on_approval_confirmed(&mut self, handle: &TxHandle) -> bool {
        match self.pending {
            Some(p) if p.handle == *handle => {
                self.pending = None;
                self.confirmed_approvals.push(*handle);
                self.state = SequencerState::ApprovalConfirmed;
                debug!(tx = %handle, "approval confirmed, re-running gate");
                true
            }
            _ => {
                debug!(tx = %handle, "ignoring confirmation for unrelated handle");
                false
            }
        }
    }

    /// Drive the attempt to a terminal state.
    ///
    /// Suspends on every confirmation wait. The trade is never submitted
    /// before its pending approval has been observed confirmed.
    pub async fn run(&mut self, intent: &TradeIntent) -> Result<TradeOutcome, TradeError> {
        let mut state = self.handle_trade(intent).await?;
        loop {
            state = match state {
                SequencerState::AwaitingApproval { handle } => {
                    let receipt = self.await_receipt(&handle).await?;
                    if !self.on_approval_confirmed(&receipt.handle) {
                        return Err(self.fail(TradeError::Confirmation(format!(
                            "confirmation for unexpected transaction {}",
                            receipt.handle
                        ))));
                    }
                    // Re-run the gate: a dual redemption may still need
                    // its reserve-leg approval.
                    self.handle_trade(intent).await?
                }
                SequencerState::AwaitingConfirmation { handle } => {
                    let receipt = self.await_receipt(&handle).await?;
                    self.state = SequencerState::Confirmed { handle: receipt.handle };
                    self.state
                }
                SequencerState::Confirmed { handle } => {
                    let direction = self
                        .resolved
                        .as_ref()
                        .map_or(intent.direction, |r| r.direction);
                    info!(tx = %handle, %direction, "trade confirmed");
                    return Ok(TradeOutcome {
                        attempt_id: self.attempt_id,
                        direction,
                        trade_tx: handle,
                        approvals: self.confirmed_approvals.clone(),
                    });
                }
                other => {
                    return Err(self.fail(TradeError::Confirmation(format!(
                        "sequencer left in unexpected state {other:?}"
                    ))));
                }
            };
        }
    }

    async fn await_receipt(&mut self, handle: &TxHandle) -> Result<TxReceiptInfo, TradeError> {
        let submitter = Arc::clone(&self.submitter);
        let receipt = match submitter.await_confirmation(handle).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(TradeError::Confirmation(e.to_string()))),
        };
        if !receipt.succeeded {
            return Err(self.fail(TradeError::Reverted(receipt.handle)));
        }
        Ok(receipt)
    }

    /// Escape hatch: every error path lands back in `Idle` with no
    /// pending approval. No automatic retry follows.
    fn fail(&mut self, err: TradeError) -> TradeError {
        self.state = SequencerState::Idle;
        self.pending = None;
        err
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use alloy::primitives::B256;
    use anyhow::bail;

    use super::*;
    use crate::domain::intent::ReactorCall;
    use crate::domain::wad::WAD;

    const CHAIN_ID: u64 = 2001;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn reactor() -> Address {
        addr(0xAA)
    }

    fn base() -> Address {
        addr(0xB0)
    }

    fn stable() -> Address {
        addr(0xB1)
    }

    fn reserve() -> Address {
        addr(0xB2)
    }

    /// Allowance book shared between the fake reader and submitter so a
    /// mined approval becomes visible to the next gate evaluation.
    #[derive(Default)]
    struct Ledger {
        allowances: Mutex<HashMap<Address, U256>>,
    }

    struct FakeReader {
        ledger: Arc<Ledger>,
    }

    #[async_trait::async_trait]
    impl ProtocolReader for FakeReader {
        async fn sc_price(&self) -> anyhow::Result<U256> {
            Ok(WAD)
        }
        async fn rc_target_price(&self) -> anyhow::Result<U256> {
            Ok(WAD)
        }
        async fn reserve_ratio(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn reserve(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn liabilities(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn trade_fee(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn treasury_fee(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn tx_limit(&self) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn base_coin(&self) -> anyhow::Result<Address> {
            Ok(base())
        }
        async fn oracle_price(&self) -> anyhow::Result<U256> {
            Ok(WAD)
        }
        async fn balance_of(&self, _token: Address, _owner: Address) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn allowance(
            &self,
            token: Address,
            _owner: Address,
            _spender: Address,
        ) -> anyhow::Result<U256> {
            Ok(*self
                .ledger
                .allowances
                .lock()
                .unwrap()
                .get(&token)
                .unwrap_or(&U256::ZERO))
        }
        async fn total_supply(&self, _token: Address) -> anyhow::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn is_healthy(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct FakeSubmitter {
        ledger: Arc<Ledger>,
        /// When false, submitted approvals never reach the ledger, so the
        /// gate stays closed.
        apply_approvals: bool,
        fail_trade_with: Option<String>,
        revert_confirmations: bool,
        approvals: Mutex<Vec<(Address, Address, U256, TxHandle)>>,
        trades: Mutex<Vec<ReactorCall>>,
        counter: Mutex<u8>,
    }

    impl FakeSubmitter {
        fn next_handle(&self) -> TxHandle {
            let mut c = self.counter.lock().unwrap();
            *c += 1;
            TxHandle(B256::repeat_byte(*c))
        }
    }

    #[async_trait::async_trait]
    impl TxSubmitter for FakeSubmitter {
        async fn submit_approval(
            &self,
            token: Address,
            spender: Address,
            amount: U256,
        ) -> anyhow::Result<TxHandle> {
            let handle = self.next_handle();
            if self.apply_approvals {
                self.ledger.allowances.lock().unwrap().insert(token, amount);
            }
            self.approvals
                .lock()
                .unwrap()
                .push((token, spender, amount, handle));
            Ok(handle)
        }

        async fn submit_trade(&self, call: &ReactorCall) -> anyhow::Result<TxHandle> {
            if let Some(msg) = &self.fail_trade_with {
                bail!("{msg}");
            }
            self.trades.lock().unwrap().push(call.clone());
            Ok(self.next_handle())
        }

        async fn submit_deploy(
            &self,
            _params: &crate::domain::deploy::DeployParams,
        ) -> anyhow::Result<TxHandle> {
            Ok(self.next_handle())
        }

        async fn await_confirmation(&self, handle: &TxHandle) -> anyhow::Result<TxReceiptInfo> {
            Ok(TxReceiptInfo {
                handle: *handle,
                block_number: Some(1),
                succeeded: !self.revert_confirmations,
            })
        }
    }

    fn harness(
        apply_approvals: bool,
    ) -> (Arc<FakeReader>, Arc<FakeSubmitter>, WalletContext) {
        let ledger = Arc::new(Ledger::default());
        let reader = Arc::new(FakeReader { ledger: Arc::clone(&ledger) });
        let submitter = Arc::new(FakeSubmitter {
            ledger,
            apply_approvals,
            ..FakeSubmitter::default()
        });
        let wallet = WalletContext::connected(addr(0x01), CHAIN_ID);
        (reader, submitter, wallet)
    }

    fn sequencer(
        reader: &Arc<FakeReader>,
        submitter: &Arc<FakeSubmitter>,
        wallet: WalletContext,
    ) -> TradeSequencer<FakeReader, FakeSubmitter> {
        TradeSequencer::new(
            Arc::clone(reader),
            Arc::clone(submitter),
            wallet,
            reactor(),
            stable(),
            reserve(),
        )
    }

    fn intent(direction: TradeDirection, amount: &str) -> TradeIntent {
        TradeIntent {
            direction,
            amount: amount.to_string(),
            reserve_amount: None,
            receiver: None,
            fee_ui: None,
            ui_address: None,
        }
    }

    #[tokio::test]
    async fn test_mint_stable_approves_exact_amount_then_trades_once() {
        let (reader, submitter, wallet) = harness(true);
        let mut seq = sequencer(&reader, &submitter, wallet);

        let outcome = seq
            .run(&intent(TradeDirection::MintStable, "100"))
            .await
            .unwrap();

        let approvals = submitter.approvals.lock().unwrap();
        assert_eq!(approvals.len(), 1);
        let (token, spender, amount, _) = approvals[0];
        assert_eq!(token, base());
        assert_eq!(spender, reactor());
        assert_eq!(amount, U256::from(100u64) * WAD);

        let trades = submitter.trades.lock().unwrap();
        assert_eq!(trades.len(), 1);
        match &trades[0] {
            ReactorCall::BuyStablecoins { amount, receiver, .. } => {
                assert_eq!(*amount, U256::from(100u64) * WAD);
                assert_eq!(*receiver, wallet.address);
            }
            other => panic!("wrong call: {other:?}"),
        }

        assert_eq!(outcome.approvals.len(), 1);
        assert!(matches!(seq.state(), SequencerState::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_sufficient_allowance_skips_approval() {
        let (reader, submitter, wallet) = harness(true);
        reader
            .ledger
            .allowances
            .lock()
            .unwrap()
            .insert(stable(), U256::from(1_000u64) * WAD);
        let mut seq = sequencer(&reader, &submitter, wallet);

        seq.run(&intent(TradeDirection::RedeemStable, "10"))
            .await
            .unwrap();

        assert!(submitter.approvals.lock().unwrap().is_empty());
        assert_eq!(submitter.trades.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dual_redeem_approves_stable_then_reserve_serially() {
        let (reader, submitter, wallet) = harness(true);
        let mut seq = sequencer(&reader, &submitter, wallet);
        let mut i = intent(TradeDirection::RedeemBoth, "50");
        i.reserve_amount = Some("25".to_string());

        seq.run(&i).await.unwrap();

        let approvals = submitter.approvals.lock().unwrap();
        assert_eq!(approvals.len(), 2);
        assert_eq!(approvals[0].0, stable());
        assert_eq!(approvals[0].2, U256::from(50u64) * WAD);
        assert_eq!(approvals[1].0, reserve());
        assert_eq!(approvals[1].2, U256::from(25u64) * WAD);

        let trades = submitter.trades.lock().unwrap();
        assert_eq!(trades.len(), 1);
        assert!(matches!(trades[0], ReactorCall::SellBothCoins { .. }));
    }

    #[tokio::test]
    async fn test_closed_gate_submits_one_approval_per_invocation_and_never_the_trade() {
        let (reader, submitter, wallet) = harness(false);
        let mut seq = sequencer(&reader, &submitter, wallet);
        let i = intent(TradeDirection::MintStable, "5");

        let state = seq.handle_trade(&i).await.unwrap();
        assert!(matches!(state, SequencerState::AwaitingApproval { .. }));
        assert_eq!(submitter.approvals.lock().unwrap().len(), 1);
        assert!(submitter.trades.lock().unwrap().is_empty());

        // Same insufficient allowance, second invocation: one more
        // approval, still no trade.
        seq.handle_trade(&i).await.unwrap();
        assert_eq!(submitter.approvals.lock().unwrap().len(), 2);
        assert!(submitter.trades.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_confirmation_does_not_trigger_resubmission() {
        let (reader, submitter, wallet) = harness(false);
        let mut seq = sequencer(&reader, &submitter, wallet);

        let state = seq
            .handle_trade(&intent(TradeDirection::MintStable, "5"))
            .await
            .unwrap();
        let SequencerState::AwaitingApproval { handle } = state else {
            panic!("expected pending approval");
        };

        let stale = TxHandle(B256::repeat_byte(0xEE));
        assert!(!seq.on_approval_confirmed(&stale));
        assert!(matches!(seq.state(), SequencerState::AwaitingApproval { .. }));

        assert!(seq.on_approval_confirmed(&handle));
        assert_eq!(seq.state(), SequencerState::ApprovalConfirmed);

        // Duplicate confirmation of the same handle is a no-op.
        assert!(!seq.on_approval_confirmed(&handle));
    }

    #[tokio::test]
    async fn test_rejected_trade_resets_to_idle_with_gas_hint() {
        let (reader, _, wallet) = harness(true);
        let ledger = Arc::clone(&reader.ledger);
        ledger
            .allowances
            .lock()
            .unwrap()
            .insert(stable(), U256::from(100u64) * WAD);
        let submitter = Arc::new(FakeSubmitter {
            ledger,
            apply_approvals: true,
            fail_trade_with: Some("intrinsic gas limit too high".to_string()),
            ..FakeSubmitter::default()
        });
        let mut seq = sequencer(&reader, &submitter, wallet);

        let err = seq
            .run(&intent(TradeDirection::RedeemStable, "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::CallRejected(_)));
        assert!(err.gas_ceiling_hint().is_some());
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[tokio::test]
    async fn test_reverted_approval_fails_the_attempt() {
        let (reader, _, wallet) = harness(false);
        let submitter = Arc::new(FakeSubmitter {
            ledger: Arc::clone(&reader.ledger),
            apply_approvals: true,
            revert_confirmations: true,
            ..FakeSubmitter::default()
        });
        let mut seq = sequencer(&reader, &submitter, wallet);

        let err = seq
            .run(&intent(TradeDirection::MintStable, "5"))
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Reverted(_)));
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(submitter.trades.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_wallet_is_blocked_before_submission() {
        let (reader, submitter, _) = harness(true);
        let mut seq = sequencer(&reader, &submitter, WalletContext::read_only(CHAIN_ID));

        let err = seq
            .handle_trade(&intent(TradeDirection::MintStable, "5"))
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::WalletNotConnected));
        assert!(submitter.approvals.lock().unwrap().is_empty());
        assert!(submitter.trades.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_amount_is_rejected_before_any_submission() {
        let (reader, submitter, wallet) = harness(true);
        let mut seq = sequencer(&reader, &submitter, wallet);

        let err = seq
            .handle_trade(&intent(TradeDirection::MintStable, "not-a-number"))
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
        assert!(submitter.approvals.lock().unwrap().is_empty());
    }
}
