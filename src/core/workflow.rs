//! Multi-stage decision workflow for one admitted transfer
//!
//! This module implements the finite-state process that runs exactly one
//! admitted [`Context`] through risk evaluation and policy checks to a
//! terminal verdict, mutating the context in place and issuing exactly one
//! persistence call per run.
//!
//! # Design
//!
//! The states are an explicit [`DecisionState`] enum. All side-effecting
//! collaborator calls (external lookup, score load, save) happen at
//! state-entry boundaries inside [`DecisionWorkflow::run`]; everything else
//! is a pure transition function over the context, so the decision logic is
//! deterministic and unit-testable without any collaborator in play.
//!
//! # Failure policy
//!
//! Collaborator failures are fail-closed: a lookup or load failure routes
//! straight to the reject terminal (no retries), and a save failure never
//! leaves the submission unresolved — the verdict degrades to rejected.

use crate::config::RiskLimits;
use crate::core::traits::{RiskLookup, ScoreStore, WalletScores};
use crate::types::{Context, RiskError, Verdict};

/// Rejection reason recorded when the external lookup's combined risk
/// reaches the internal risk limit.
pub const INTERNAL_RISK_LIMIT_REASON: &str = "Internal risk limit exceeded";

/// Rejection reason recorded by the combined policy check.
pub const COMBINED_POLICY_REASON: &str =
    "Combined wallet risk at or above the internal-to-internal limit, or a wallet is blocked";

/// Fallback reason for rejections that carry no more specific one.
pub const DEFAULT_REJECTION_REASON: &str = "Transaction rejected";

/// States of the decision workflow
///
/// `Reject` and `Approve` are the only terminal states; every run reaches
/// exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    /// Entry point; routes on external custody and receiver blocking
    Start,
    /// Blocks the sender for transferring to a blocked receiver
    BlockSender,
    /// Fetches externally asserted risk figures
    ExternalRiskLookup,
    /// Re-reads authoritative stored scores and applies the combined policy
    RefreshRiskScores,
    /// Routes the computed outcome to a terminal
    CheckApproval,
    /// Blocks the sender for tripping the block limit
    BlockWallet,
    /// Terminal: applies the rejection penalty and persists
    Reject,
    /// Terminal: persists unchanged
    Approve,
}

/// Route out of the entry state
///
/// External custody takes precedence over the blocked-receiver check;
/// purely internal, unblocked transfers go straight to the score refresh.
fn route_start(ctx: &Context) -> DecisionState {
    if ctx.sender.is_external || ctx.receiver.is_external {
        DecisionState::ExternalRiskLookup
    } else if ctx.receiver.blocked {
        DecisionState::BlockSender
    } else {
        DecisionState::RefreshRiskScores
    }
}

/// Apply the external lookup result to the context
///
/// Sets both wallet scores and `total_risk`, then cross-assigns: when
/// exactly one wallet is external, the internal wallet inherits the
/// combined figure (the external side is assumed to have contributed all
/// measurable risk). If the combined figure reaches the internal risk
/// limit, the transaction is pre-marked rejected; the flag is consulted by
/// the combined policy check, not acted on immediately.
fn apply_external_scores(ctx: &mut Context, scores: WalletScores, limits: &RiskLimits) {
    ctx.sender.risk_score = Some(scores.sender);
    ctx.receiver.risk_score = Some(scores.receiver);

    let total = scores.total();
    ctx.total_risk = Some(total);

    if ctx.sender.is_external && !ctx.receiver.is_external {
        ctx.receiver.risk_score = Some(total);
    } else if ctx.receiver.is_external && !ctx.sender.is_external {
        ctx.sender.risk_score = Some(total);
    }

    if total >= limits.internal_risk_limit {
        ctx.transaction.rejected = true;
        ctx.transaction.rejection_reason = Some(INTERNAL_RISK_LIMIT_REASON.to_string());
    }
}

/// Overwrite both wallet scores with the authoritative stored values
///
/// Anything asserted by the external lookup stage is deliberately
/// superseded here; the lookup's role was only to seed `total_risk` for
/// its threshold test.
fn apply_stored_scores(ctx: &mut Context, scores: WalletScores) {
    ctx.sender.risk_score = Some(scores.sender);
    ctx.receiver.risk_score = Some(scores.receiver);
}

/// Evaluate the combined policy over the refreshed scores
///
/// The transfer is approved unless the external-lookup stage already
/// pre-marked it rejected, the combined stored risk reaches the
/// internal-to-internal limit (inclusive), or either wallet is blocked.
fn apply_combined_policy(ctx: &mut Context, limits: &RiskLimits) {
    let mut rejected = ctx.transaction.rejected;

    let combined = ctx.sender.risk_or_zero() + ctx.receiver.risk_or_zero();
    let one_is_blocked = ctx.sender.blocked || ctx.receiver.blocked;

    if combined >= limits.internal_to_internal_risk_limit || one_is_blocked {
        ctx.transaction.rejection_reason = Some(COMBINED_POLICY_REASON.to_string());
        rejected = true;
    }

    ctx.transaction.rejected = rejected;
    ctx.transaction.approved = !rejected;
}

/// Route out of the approval check
///
/// An approved transfer goes straight to the approve terminal. A rejected
/// one first consults the block limit: either wallet's score at or above
/// it routes through the sender-blocking state.
fn route_approval(ctx: &Context, limits: &RiskLimits) -> DecisionState {
    if ctx.transaction.approved {
        DecisionState::Approve
    } else if ctx.sender.risk_or_zero() >= limits.block_limit
        || ctx.receiver.risk_or_zero() >= limits.block_limit
    {
        DecisionState::BlockWallet
    } else {
        DecisionState::Reject
    }
}

/// Block the sending wallet (in memory; persisted at the terminal)
///
/// Only the sender is ever blocked here, regardless of which wallet
/// tripped the condition that led in.
fn block_sender(ctx: &mut Context) {
    ctx.sender.blocked = true;
}

/// Apply the rejection penalty exactly once
///
/// - exactly one wallet external: the internal wallet's score grows by
///   `score * rejection_penalty`
/// - both internal: both scores grow by
///   `score * internal_to_internal_rejection_penalty`
/// - both external: no penalty (no internal party to penalize)
///
/// A wallet with no score accumulated yet is left untouched.
fn apply_rejection_penalty(ctx: &mut Context, limits: &RiskLimits) {
    fn bump(score: &mut Option<rust_decimal::Decimal>, penalty: rust_decimal::Decimal) {
        if let Some(value) = score {
            *value += *value * penalty;
        }
    }

    match (ctx.sender.is_external, ctx.receiver.is_external) {
        (true, false) => bump(&mut ctx.receiver.risk_score, limits.rejection_penalty),
        (false, true) => bump(&mut ctx.sender.risk_score, limits.rejection_penalty),
        (false, false) => {
            bump(
                &mut ctx.sender.risk_score,
                limits.internal_to_internal_rejection_penalty,
            );
            bump(
                &mut ctx.receiver.risk_score,
                limits.internal_to_internal_rejection_penalty,
            );
        }
        (true, true) => {}
    }
}

/// Force the terminal rejected outcome onto the transaction
///
/// Guarantees the exactly-one-verdict invariant on every reject path,
/// including the ones that never reached the combined policy check.
fn finalize_rejection(ctx: &mut Context) {
    ctx.transaction.rejected = true;
    ctx.transaction.approved = false;
    if ctx.transaction.rejection_reason.is_none() {
        ctx.transaction.rejection_reason = Some(DEFAULT_REJECTION_REASON.to_string());
    }
}

/// Record a collaborator failure as the rejection reason, if none is set
fn note_collaborator_failure(ctx: &mut Context, error: &RiskError) {
    if ctx.transaction.rejection_reason.is_none() {
        ctx.transaction.rejection_reason = Some(error.to_string());
    }
}

/// One decision workflow run over an admitted context
///
/// Borrows the two collaborators and the policy limits; owns no state of
/// its own. The caller (the engine) is responsible for holding the
/// admission gate for both addresses while `run` executes.
#[derive(Debug)]
pub struct DecisionWorkflow<'a, L, S> {
    lookup: &'a L,
    store: &'a S,
    limits: &'a RiskLimits,
}

impl<'a, L, S> DecisionWorkflow<'a, L, S>
where
    L: RiskLookup,
    S: ScoreStore,
{
    /// Create a workflow over the given collaborators and limits
    pub fn new(lookup: &'a L, store: &'a S, limits: &'a RiskLimits) -> Self {
        Self {
            lookup,
            store,
            limits,
        }
    }

    /// Run the admitted context to a terminal verdict
    ///
    /// Mutates the context in place; on return, exactly one of
    /// `transaction.approved` / `transaction.rejected` is set. Issues
    /// exactly one `save` call (terminal persistence); collaborator
    /// failures resolve to a rejected verdict, never a hung run.
    pub async fn run(&self, ctx: &mut Context) -> Verdict {
        let mut state = DecisionState::Start;

        loop {
            state = match state {
                DecisionState::Start => route_start(ctx),

                DecisionState::BlockSender => {
                    block_sender(ctx);
                    DecisionState::Reject
                }

                DecisionState::ExternalRiskLookup => {
                    match self
                        .lookup
                        .external_risk(&ctx.sender.address, &ctx.receiver.address)
                        .await
                    {
                        Ok(scores) => {
                            apply_external_scores(ctx, scores, self.limits);
                            DecisionState::RefreshRiskScores
                        }
                        Err(error) => {
                            tracing::warn!(%error, "external risk lookup failed, rejecting");
                            note_collaborator_failure(ctx, &error);
                            DecisionState::Reject
                        }
                    }
                }

                DecisionState::RefreshRiskScores => {
                    match self
                        .store
                        .load_scores(&ctx.sender.address, &ctx.receiver.address)
                        .await
                    {
                        Ok(scores) => {
                            apply_stored_scores(ctx, scores);
                            apply_combined_policy(ctx, self.limits);
                            DecisionState::CheckApproval
                        }
                        Err(error) => {
                            tracing::warn!(%error, "stored score refresh failed, rejecting");
                            note_collaborator_failure(ctx, &error);
                            DecisionState::Reject
                        }
                    }
                }

                DecisionState::CheckApproval => route_approval(ctx, self.limits),

                DecisionState::BlockWallet => {
                    block_sender(ctx);
                    DecisionState::Reject
                }

                DecisionState::Reject => {
                    apply_rejection_penalty(ctx, self.limits);
                    finalize_rejection(ctx);
                    if let Err(error) = self.store.save(ctx).await {
                        // The verdict stands; the stale stored state is the
                        // host's recovery problem, not an unresolved run.
                        tracing::error!(%error, "failed to persist rejected context");
                    }
                    return Verdict::Rejected;
                }

                DecisionState::Approve => {
                    match self.store.save(ctx).await {
                        Ok(()) => return Verdict::Approved,
                        Err(error) => {
                            // Fail-closed: an unpersistable approval degrades
                            // to a rejection, without penalty arithmetic and
                            // without a second write against a failing store.
                            tracing::error!(
                                %error,
                                "failed to persist approved context, rejecting"
                            );
                            ctx.transaction.rejection_reason = Some(error.to_string());
                            ctx.transaction.rejected = true;
                            ctx.transaction.approved = false;
                            return Verdict::Rejected;
                        }
                    }
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Wallet;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn internal_pair() -> Context {
        Context::new(Wallet::internal("a"), Wallet::internal("b"), dec!(10))
    }

    #[rstest]
    #[case::both_internal_unblocked(false, false, false, DecisionState::RefreshRiskScores)]
    #[case::sender_external(true, false, false, DecisionState::ExternalRiskLookup)]
    #[case::receiver_external(false, true, false, DecisionState::ExternalRiskLookup)]
    #[case::receiver_blocked(false, false, true, DecisionState::BlockSender)]
    #[case::external_wins_over_blocked(false, true, true, DecisionState::ExternalRiskLookup)]
    fn test_route_start(
        #[case] sender_external: bool,
        #[case] receiver_external: bool,
        #[case] receiver_blocked: bool,
        #[case] expected: DecisionState,
    ) {
        let ctx = Context::new(
            Wallet::new("a", sender_external),
            Wallet::new("b", receiver_external).with_blocked(receiver_blocked),
            dec!(1),
        );

        assert_eq!(route_start(&ctx), expected);
    }

    #[test]
    fn test_external_scores_cross_assign_to_internal_sender() {
        let mut ctx = Context::new(Wallet::internal("a"), Wallet::external("b"), dec!(1));

        let limits = RiskLimits::default();
        apply_external_scores(&mut ctx, WalletScores::new(dec!(80), dec!(40)), &limits);

        // The internal sender inherits the combined figure.
        assert_eq!(ctx.sender.risk_score, Some(dec!(120)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(40)));
        assert_eq!(ctx.total_risk, Some(dec!(120)));
    }

    #[test]
    fn test_external_scores_cross_assign_to_internal_receiver() {
        let mut ctx = Context::new(Wallet::external("a"), Wallet::internal("b"), dec!(1));

        let limits = RiskLimits::default();
        apply_external_scores(&mut ctx, WalletScores::new(dec!(80), dec!(40)), &limits);

        assert_eq!(ctx.sender.risk_score, Some(dec!(80)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(120)));
    }

    #[test]
    fn test_external_scores_no_cross_assign_when_both_external() {
        let mut ctx = Context::new(Wallet::external("a"), Wallet::external("b"), dec!(1));

        let limits = RiskLimits::default();
        apply_external_scores(&mut ctx, WalletScores::new(dec!(80), dec!(40)), &limits);

        assert_eq!(ctx.sender.risk_score, Some(dec!(80)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(40)));
    }

    #[rstest]
    #[case::below_limit(dec!(100), dec!(99), false)]
    #[case::at_limit_inclusive(dec!(60), dec!(140), true)]
    #[case::above_limit(dec!(150), dec!(150), true)]
    fn test_external_scores_internal_risk_limit(
        #[case] sender_score: Decimal,
        #[case] receiver_score: Decimal,
        #[case] expect_premarked: bool,
    ) {
        let limits = RiskLimits::default(); // internal_risk_limit = 200
        let mut ctx = Context::new(Wallet::external("a"), Wallet::internal("b"), dec!(1));

        apply_external_scores(
            &mut ctx,
            WalletScores::new(sender_score, receiver_score),
            &limits,
        );

        assert_eq!(ctx.transaction.rejected, expect_premarked);
        if expect_premarked {
            assert_eq!(
                ctx.transaction.rejection_reason.as_deref(),
                Some(INTERNAL_RISK_LIMIT_REASON)
            );
        }
    }

    #[test]
    fn test_stored_scores_supersede_lookup_scores() {
        let mut ctx = Context::new(Wallet::external("a"), Wallet::internal("b"), dec!(1));
        let limits = RiskLimits::default();
        apply_external_scores(&mut ctx, WalletScores::new(dec!(80), dec!(40)), &limits);

        apply_stored_scores(&mut ctx, WalletScores::new(dec!(5), dec!(6)));

        assert_eq!(ctx.sender.risk_score, Some(dec!(5)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(6)));
        // total_risk keeps the lookup-seeded figure; it served its purpose.
        assert_eq!(ctx.total_risk, Some(dec!(120)));
    }

    #[rstest]
    #[case::approved(dec!(10), dec!(20), false, false, false)]
    #[case::combined_at_limit_inclusive(dec!(100), dec!(200), false, false, true)]
    #[case::combined_above_limit(dec!(200), dec!(200), false, false, true)]
    #[case::sender_blocked(dec!(1), dec!(1), true, false, true)]
    #[case::receiver_blocked(dec!(1), dec!(1), false, true, true)]
    fn test_combined_policy(
        #[case] sender_score: Decimal,
        #[case] receiver_score: Decimal,
        #[case] sender_blocked: bool,
        #[case] receiver_blocked: bool,
        #[case] expect_rejected: bool,
    ) {
        let limits = RiskLimits::default(); // internal_to_internal_risk_limit = 300
        let mut ctx = Context::new(
            Wallet::internal("a").with_blocked(sender_blocked),
            Wallet::internal("b").with_blocked(receiver_blocked),
            dec!(1),
        );
        apply_stored_scores(&mut ctx, WalletScores::new(sender_score, receiver_score));

        apply_combined_policy(&mut ctx, &limits);

        assert_eq!(ctx.transaction.rejected, expect_rejected);
        assert_eq!(ctx.transaction.approved, !expect_rejected);
    }

    #[test]
    fn test_combined_policy_honors_premarked_rejection() {
        let limits = RiskLimits::default();
        let mut ctx = internal_pair();
        apply_stored_scores(&mut ctx, WalletScores::new(dec!(1), dec!(1)));
        ctx.transaction.rejected = true;

        apply_combined_policy(&mut ctx, &limits);

        assert!(ctx.transaction.rejected);
        assert!(!ctx.transaction.approved);
    }

    #[rstest]
    #[case::approved_goes_to_approve(true, dec!(600), DecisionState::Approve)]
    #[case::rejected_below_block_limit(false, dec!(100), DecisionState::Reject)]
    #[case::rejected_at_block_limit(false, dec!(500), DecisionState::BlockWallet)]
    fn test_route_approval(
        #[case] approved: bool,
        #[case] sender_score: Decimal,
        #[case] expected: DecisionState,
    ) {
        let limits = RiskLimits::default(); // block_limit = 500
        let mut ctx = internal_pair();
        ctx.sender.risk_score = Some(sender_score);
        ctx.receiver.risk_score = Some(dec!(1));
        ctx.transaction.approved = approved;
        ctx.transaction.rejected = !approved;

        assert_eq!(route_approval(&ctx, &limits), expected);
    }

    #[test]
    fn test_route_approval_receiver_score_also_trips_block_limit() {
        let limits = RiskLimits::default();
        let mut ctx = internal_pair();
        ctx.sender.risk_score = Some(dec!(1));
        ctx.receiver.risk_score = Some(dec!(500));
        ctx.transaction.rejected = true;

        assert_eq!(route_approval(&ctx, &limits), DecisionState::BlockWallet);
    }

    #[test]
    fn test_penalty_one_external_penalizes_internal_side_only() {
        let limits = RiskLimits::default(); // rejection_penalty = 0.5
        let mut ctx = Context::new(
            Wallet::external("a").with_risk_score(dec!(100)),
            Wallet::internal("b").with_risk_score(dec!(40)),
            dec!(1),
        );

        apply_rejection_penalty(&mut ctx, &limits);

        assert_eq!(ctx.sender.risk_score, Some(dec!(100)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(60)));
    }

    #[test]
    fn test_penalty_both_internal_penalizes_both() {
        let limits = RiskLimits::default(); // internal_to_internal penalty = 0.1
        let mut ctx = Context::new(
            Wallet::internal("a").with_risk_score(dec!(100)),
            Wallet::internal("b").with_risk_score(dec!(40)),
            dec!(1),
        );

        apply_rejection_penalty(&mut ctx, &limits);

        assert_eq!(ctx.sender.risk_score, Some(dec!(110)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(44)));
    }

    #[test]
    fn test_penalty_both_external_penalizes_neither() {
        let limits = RiskLimits::default();
        let mut ctx = Context::new(
            Wallet::external("a").with_risk_score(dec!(100)),
            Wallet::external("b").with_risk_score(dec!(40)),
            dec!(1),
        );

        apply_rejection_penalty(&mut ctx, &limits);

        assert_eq!(ctx.sender.risk_score, Some(dec!(100)));
        assert_eq!(ctx.receiver.risk_score, Some(dec!(40)));
    }

    #[test]
    fn test_penalty_skips_absent_scores() {
        let limits = RiskLimits::default();
        let mut ctx = internal_pair();

        apply_rejection_penalty(&mut ctx, &limits);

        assert_eq!(ctx.sender.risk_score, None);
        assert_eq!(ctx.receiver.risk_score, None);
    }

    #[test]
    fn test_finalize_rejection_sets_default_reason() {
        let mut ctx = internal_pair();

        finalize_rejection(&mut ctx);

        assert!(ctx.transaction.rejected);
        assert!(!ctx.transaction.approved);
        assert_eq!(
            ctx.transaction.rejection_reason.as_deref(),
            Some(DEFAULT_REJECTION_REASON)
        );
    }

    #[test]
    fn test_finalize_rejection_keeps_existing_reason() {
        let mut ctx = internal_pair();
        ctx.transaction.rejection_reason = Some(INTERNAL_RISK_LIMIT_REASON.to_string());

        finalize_rejection(&mut ctx);

        assert_eq!(
            ctx.transaction.rejection_reason.as_deref(),
            Some(INTERNAL_RISK_LIMIT_REASON)
        );
    }
}
