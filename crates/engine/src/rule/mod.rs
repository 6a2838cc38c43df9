//! Call rules and their registry.
//!
//! # Mental Model
//!
//! A [`CallRule`] is a [`CallMatcher`] bound to a behavior: optional side
//! effects, a [`ReturnValueStrategy`], and an optional repeat budget. Rules are
//! appended to a per-fake [`RuleRegistry`] and matched newest-first.
//!
//! # Eligibility
//!
//! A rule that matches a call may still decline it:
//! - its repeat budget is spent, or
//! - its sequence strategy has no values left.
//!
//! Declining is permanent and never removes the rule, so introspection keeps
//! seeing it. Resolution then moves on to older rules. A declined call never
//! consumes budget: [`CallRule::remaining`] counts only calls the rule
//! answered.
//!
//! # Concurrency
//!
//! - Budget decrement and sequence advance are single atomic updates; two calls
//!   racing for the last slot cannot both win.
//! - A budget slot claimed for a call the strategy then declines is returned
//!   before [`CallRule::apply`] reports the decline.

mod registry;
mod strategy;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use registry::{RuleRegistry, RuleSnapshot};
pub use strategy::{Outcome, ReturnValueStrategy};
pub(crate) use strategy::{ErrorProducer, Producer};

use crate::history::RecordedCall;
use crate::matcher::CallMatcher;

pub(crate) type SideEffect = Arc<dyn Fn(&RecordedCall) + Send + Sync>;

static NEXT_RULE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
	fn next() -> Self {
		Self(NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed))
	}
}

pub struct CallRule {
	id: RuleId,
	matcher: CallMatcher,
	side_effects: Vec<SideEffect>,
	strategy: ReturnValueStrategy,
	/// Remaining applications; `None` is unlimited.
	remaining: Option<AtomicUsize>,
	applied: AtomicUsize,
}

impl CallRule {
	pub fn new(matcher: CallMatcher, strategy: ReturnValueStrategy) -> Self {
		Self {
			id: RuleId::next(),
			matcher,
			side_effects: Vec::new(),
			strategy,
			remaining: None,
			applied: AtomicUsize::new(0),
		}
	}

	pub(crate) fn with_side_effects(mut self, effects: Vec<SideEffect>) -> Self {
		self.side_effects = effects;
		self
	}

	/// Limits how many calls this rule may answer.
	pub fn with_repeat(mut self, times: usize) -> Self {
		self.remaining = Some(AtomicUsize::new(times));
		self
	}

	pub fn id(&self) -> RuleId {
		self.id
	}

	pub fn matcher(&self) -> &CallMatcher {
		&self.matcher
	}

	pub fn strategy(&self) -> &ReturnValueStrategy {
		&self.strategy
	}

	/// Number of calls this rule has answered.
	pub fn times_applied(&self) -> usize {
		self.applied.load(Ordering::Acquire)
	}

	pub fn remaining(&self) -> Option<usize> {
		self.remaining.as_ref().map(|r| r.load(Ordering::Acquire))
	}

	/// Whether the rule can still answer calls.
	pub fn is_eligible(&self) -> bool {
		self.remaining() != Some(0) && !self.strategy.is_exhausted()
	}

	fn claim_budget(&self) -> bool {
		match &self.remaining {
			None => true,
			Some(remaining) => remaining
				.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
				.is_ok(),
		}
	}

	fn release_budget(&self) {
		if let Some(remaining) = &self.remaining {
			remaining.fetch_add(1, Ordering::AcqRel);
		}
	}

	/// Answers `call` if the rule matches and is still eligible.
	///
	/// Side effects run only when an outcome is produced.
	pub fn apply(&self, call: &RecordedCall) -> Option<Outcome> {
		if !self.matcher.matches(call) || !self.claim_budget() {
			return None;
		}
		let Some(claim) = self.strategy.claim() else {
			self.release_budget();
			return None;
		};
		for effect in &self.side_effects {
			effect(call);
		}
		self.applied.fetch_add(1, Ordering::AcqRel);
		Some(self.strategy.produce(claim, call))
	}
}

impl fmt::Debug for CallRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CallRule")
			.field("id", &self.id)
			.field("matcher", &self.matcher.to_string())
			.field("strategy", &self.strategy)
			.field("side_effects", &self.side_effects.len())
			.field("remaining", &self.remaining())
			.finish()
	}
}

impl fmt::Display for CallRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.matcher, self.strategy)?;
		if let Some(n) = self.remaining() {
			write!(f, " ({n} remaining)")?;
		}
		Ok(())
	}
}
