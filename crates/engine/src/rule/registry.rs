//! Rule registry with atomic publication.
//!
//! # Role
//!
//! Holds the ordered rules of one fake. Writers build the extended list off to
//! the side and swap it in; readers load the current list once and iterate it
//! without locks.
//!
//! # Invariants
//!
//! - An enumeration sees exactly the rules published before it loaded its snapshot.
//! - A rule is fully constructed before it becomes visible.
//! - Concurrent appends are linearizable; none is lost.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::CallRule;

#[derive(Default)]
pub struct RuleRegistry {
	rules: ArcSwap<Vec<Arc<CallRule>>>,
}

impl RuleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes a fully built rule after every existing one.
	pub fn add(&self, rule: CallRule) -> Arc<CallRule> {
		let rule = Arc::new(rule);
		self.rules.rcu(|old| {
			let mut next = Vec::with_capacity(old.len() + 1);
			next.extend(old.iter().cloned());
			next.push(rule.clone());
			next
		});
		rule
	}

	/// Pins the currently published rules.
	pub fn snapshot(&self) -> RuleSnapshot {
		RuleSnapshot {
			rules: self.rules.load_full(),
		}
	}

	pub fn len(&self) -> usize {
		self.rules.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every rule. Snapshots taken earlier stay valid.
	pub fn clear(&self) {
		self.rules.store(Arc::new(Vec::new()));
	}
}

/// Stable view of a registry at the moment it was taken.
#[derive(Clone)]
pub struct RuleSnapshot {
	rules: Arc<Vec<Arc<CallRule>>>,
}

impl RuleSnapshot {
	/// Rules in registration order.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<CallRule>> + '_ {
		self.rules.iter()
	}

	/// Rules in matching order, newest first.
	pub fn by_precedence(&self) -> impl Iterator<Item = &Arc<CallRule>> + '_ {
		self.rules.iter().rev()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn to_vec(&self) -> Vec<Arc<CallRule>> {
		self.rules.as_ref().clone()
	}
}
