use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Atto;

/// Wallet identifier as supplied by the vote/stake ledger.
pub type WalletId = String;

// ---------------------------------------------------------------------------
// Content classes
// ---------------------------------------------------------------------------

/// The six pricing contexts the engine distinguishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    /// Initial story from a standard account.
    InitialStandard,
    /// Initial story from an agency-managed account.
    InitialAgency,
    /// Initial story from an individual account.
    InitialIndividual,
    CompletionPaid,
    CompletionFree,
    /// Completion submitted under an individual campaign.
    CompletionIndividual,
}

impl ContentClass {
    pub const ALL: [ContentClass; 6] = [
        ContentClass::InitialStandard,
        ContentClass::InitialAgency,
        ContentClass::InitialIndividual,
        ContentClass::CompletionPaid,
        ContentClass::CompletionFree,
        ContentClass::CompletionIndividual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentClass::InitialStandard => "initial_standard",
            ContentClass::InitialAgency => "initial_agency",
            ContentClass::InitialIndividual => "initial_individual",
            ContentClass::CompletionPaid => "completion_paid",
            ContentClass::CompletionFree => "completion_free",
            ContentClass::CompletionIndividual => "completion_individual",
        }
    }

    /// Completions have ranked completers with entry prices; initial stories
    /// only have a creator.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            ContentClass::CompletionPaid
                | ContentClass::CompletionFree
                | ContentClass::CompletionIndividual
        )
    }
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Votes and participants
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDecision {
    Accept,
    Reject,
    Abstain,
}

impl VoteDecision {
    pub fn is_cast(&self) -> bool {
        !matches!(self, VoteDecision::Abstain)
    }
}

/// Derived staker class.  See `modr_settlement::classify`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Active,
    Passive,
    Ineligible,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Active => "active",
            Classification::Passive => "passive",
            Classification::Ineligible => "ineligible",
        }
    }
}

/// One staker/reviewer as reported by the ledger for this evaluation cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub wallet: WalletId,
    pub stake_amount: Atto,
    pub stake_age_days: u32,
    pub vote: VoteDecision,
    /// 1..=100, only meaningful on Accept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl Participant {
    pub fn new<S: Into<WalletId>>(
        wallet: S,
        stake_amount: Atto,
        stake_age_days: u32,
        vote: VoteDecision,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            stake_amount,
            stake_age_days,
            vote,
            score: None,
        }
    }

    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Resolution state machine:
/// `PendingRequirements → InProgress → {Validated, Rejected, RequiresEscalation}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    PendingRequirements,
    InProgress,
    Validated,
    Rejected,
    RequiresEscalation,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::PendingRequirements => "PENDING_REQUIREMENTS",
            ResolutionStatus::InProgress => "IN_PROGRESS",
            ResolutionStatus::Validated => "VALIDATED",
            ResolutionStatus::Rejected => "REJECTED",
            ResolutionStatus::RequiresEscalation => "REQUIRES_ESCALATION",
        }
    }

    /// Only Validated and Rejected can be settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionStatus::Validated | ResolutionStatus::Rejected)
    }

    /// The vote that matches this outcome, for terminal statuses.
    pub fn winning_vote(&self) -> Option<VoteDecision> {
        match self {
            ResolutionStatus::Validated => Some(VoteDecision::Accept),
            ResolutionStatus::Rejected => Some(VoteDecision::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a decision came from.  Settlement treats both identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Community,
    Override,
}

/// Why an evaluation is (still) pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingReason {
    QuorumNotReached {
        votes: u64,
        required: u32,
    },
    StakeBelowMintValue {
        staked: Atto,
        required: Atto,
    },
    QuorumAndStakeNotReached {
        votes: u64,
        required_votes: u32,
        staked: Atto,
        required_stake: Atto,
    },
    /// The deadline passed undecided; the caller should move it to
    /// `new_deadline`.
    DeadlineExtended {
        hours: u32,
        new_deadline: i64,
    },
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::QuorumNotReached { votes, required } => {
                write!(f, "{votes} of {required} required votes cast")
            }
            PendingReason::StakeBelowMintValue { staked, required } => {
                write!(f, "staked {staked} below mint value {required}")
            }
            PendingReason::QuorumAndStakeNotReached {
                votes,
                required_votes,
                staked,
                required_stake,
            } => write!(
                f,
                "{votes} of {required_votes} required votes cast; staked {staked} below mint value {required_stake}"
            ),
            PendingReason::DeadlineExtended {
                hours,
                new_deadline,
            } => write!(f, "deadline extended by {hours}h to {new_deadline}"),
        }
    }
}

/// Output of the consensus evaluator (or of the override path).
///
/// `score_accept + score_reject == 1` exactly; `victory_factor` is their
/// absolute difference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: ResolutionStatus,
    pub score_accept: Atto,
    pub score_reject: Atto,
    pub victory_factor: Atto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<PendingReason>,
    /// The minimum-voter requirement was met by the vote count alone.
    pub quorum_met: bool,
    pub provenance: Provenance,
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// A ranked completer (rank 1 = top contributor).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completer {
    pub wallet: WalletId,
    pub entry_price: Atto,
    pub rank: u32,
}

impl Completer {
    pub fn new<S: Into<WalletId>>(wallet: S, entry_price: Atto, rank: u32) -> Self {
        Self {
            wallet: wallet.into(),
            entry_price,
            rank,
        }
    }
}

/// Who, besides stakers, is settled from the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementParties {
    pub creator: WalletId,
    #[serde(default)]
    pub completers: Vec<Completer>,
    /// Conversion from the reference unit to the pool token.
    pub winc_per_reference_unit: Atto,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    pub wallet: WalletId,
    pub classification: Classification,
    pub vote: VoteDecision,
    pub payout: Atto,
    pub penalty: Atto,
    pub xp: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleterOutcome {
    pub wallet: WalletId,
    pub rank: u32,
    pub entry_price: Atto,
    pub payout: Atto,
    /// Payout is a refund of the entry price (quorum failure).
    pub refunded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorOutcome {
    pub wallet: WalletId,
    pub payout: Atto,
    /// The creator's share was cut at the configured cap.
    pub capped: bool,
}

/// Output of the settlement calculator.
///
/// Balance: `total_paid + platform_pool == total_pool + total_penalties`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub class: ContentClass,
    pub status: ResolutionStatus,
    pub provenance: Provenance,
    pub total_pool: Atto,
    pub reward_pool: Atto,
    /// Final platform take, after refunds, floors, caps and rounding surplus.
    pub platform_pool: Atto,
    pub active_pool_total: Atto,
    pub passive_pool_total: Atto,
    /// Everything credited to stakers, creator, and completers.
    pub total_paid: Atto,
    pub total_penalties: Atto,
    /// Guarantees (refunds, completer floor) that could not be funded.
    pub shortfall: Atto,
    pub participants: Vec<ParticipantOutcome>,
    pub creator: CreatorOutcome,
    pub completers: Vec<CompleterOutcome>,
}

impl SettlementResult {
    pub fn participant(&self, wallet: &str) -> Option<&ParticipantOutcome> {
        self.participants.iter().find(|p| p.wallet == wallet)
    }

    pub fn completer(&self, wallet: &str) -> Option<&CompleterOutcome> {
        self.completers.iter().find(|c| c.wallet == wallet)
    }
}

// ---------------------------------------------------------------------------
// User-facing projection
// ---------------------------------------------------------------------------

/// What the notification/UI layer may show.  Internal error kinds never
/// reach this surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFacingStatus {
    Pending,
    Escalated,
    Accepted,
    Rejected,
}

impl UserFacingStatus {
    pub fn message(&self) -> &'static str {
        match self {
            UserFacingStatus::Pending => "moderation still pending",
            UserFacingStatus::Escalated => "escalated for review",
            UserFacingStatus::Accepted => "accepted",
            UserFacingStatus::Rejected => "rejected",
        }
    }
}

impl From<ResolutionStatus> for UserFacingStatus {
    fn from(s: ResolutionStatus) -> Self {
        match s {
            ResolutionStatus::PendingRequirements | ResolutionStatus::InProgress => {
                UserFacingStatus::Pending
            }
            ResolutionStatus::RequiresEscalation => UserFacingStatus::Escalated,
            ResolutionStatus::Validated => UserFacingStatus::Accepted,
            ResolutionStatus::Rejected => UserFacingStatus::Rejected,
        }
    }
}
