//! modr-settlement
//!
//! Turns a terminal moderation decision into money and XP:
//! - pool sizing (`mint_price * winc_per_reference_unit`, reward/platform split)
//! - staker payouts per pool: slashing, minority bonus, penalty
//!   redistribution, passive dampening
//! - creator and completer payouts: refunds on quorum failure, contributor
//!   share, creator cap, top-completer floor
//! - exact balance: `total_paid + platform_pool == total_pool + total_penalties`
//!
//! Pure: callers supply the roster and config and persist the result.  A
//! result must be applied to a ledger exactly once.

mod classify;
mod engine;
mod payouts;
mod pools;
mod stakers;

pub use classify::partition_roster;
pub use modr_consensus::classify;
pub use engine::{override_and_settle, settle};
pub use pools::PoolSplit;
