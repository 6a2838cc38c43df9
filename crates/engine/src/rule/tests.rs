use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use decoy_meta::{Args, MemberKey, TypeArgs, TypeExpr, Value};

use super::{CallRule, Outcome, ReturnValueStrategy, RuleRegistry, SideEffect};
use crate::history::RecordedCall;
use crate::matcher::CallMatcher;

fn bar_call() -> RecordedCall {
	RecordedCall::new(
		MemberKey::method("Bar"),
		TypeArgs::new(),
		Args::new(),
		TypeExpr::INT,
	)
}

fn value_of(outcome: Option<Outcome>) -> Option<Value> {
	match outcome {
		Some(Outcome::Value(v)) => Some(v),
		_ => None,
	}
}

#[test]
fn test_fixed_rule_answers_matching_calls() {
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::Fixed(Value::Int(7)),
	);
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(7)));
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(7)));
	assert_eq!(rule.times_applied(), 2);

	let other = RecordedCall::new(
		MemberKey::method("Baz"),
		TypeArgs::new(),
		Args::new(),
		TypeExpr::INT,
	);
	assert!(rule.apply(&other).is_none());
}

#[test]
fn test_repeat_budget_exhausts_without_removal() {
	let registry = RuleRegistry::new();
	let rule = registry.add(
		CallRule::new(
			CallMatcher::member("Bar"),
			ReturnValueStrategy::Fixed(Value::Int(1)),
		)
		.with_repeat(2),
	);

	assert!(rule.apply(&bar_call()).is_some());
	assert!(rule.apply(&bar_call()).is_some());
	assert!(rule.apply(&bar_call()).is_none());
	assert!(!rule.is_eligible());
	assert_eq!(registry.len(), 1);
}

#[test]
fn test_sequence_yields_in_order_then_declines() {
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::sequence([Value::Int(1), Value::Int(2)]),
	);
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(1)));
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(2)));
	assert!(rule.apply(&bar_call()).is_none());
	assert!(rule.strategy().is_exhausted());
}

#[test]
fn test_lazy_producer_runs_once_per_call() {
	let counter = Arc::new(AtomicUsize::new(0));
	let c = counter.clone();
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::Lazy(Arc::new(move |_: &RecordedCall| {
			Value::Int(c.fetch_add(1, Ordering::SeqCst) as i64 + 10)
		})),
	);
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(10)));
	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(11)));
	assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_side_effects_skip_declined_calls() {
	let hits = Arc::new(AtomicUsize::new(0));
	let h = hits.clone();
	let effect: SideEffect = Arc::new(move |_: &RecordedCall| {
		h.fetch_add(1, Ordering::SeqCst);
	});
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::sequence([Value::Int(1)]),
	)
	.with_side_effects(vec![effect]);

	assert!(rule.apply(&bar_call()).is_some());
	assert!(rule.apply(&bar_call()).is_none());
	assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_declined_calls_keep_budget() {
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::sequence([Value::Int(1)]),
	)
	.with_repeat(3);

	assert_eq!(value_of(rule.apply(&bar_call())), Some(Value::Int(1)));
	assert!(rule.apply(&bar_call()).is_none());
	assert!(rule.apply(&bar_call()).is_none());
	assert_eq!(rule.remaining(), Some(2));
	assert_eq!(rule.times_applied(), 1);
	assert!(!rule.is_eligible());
}

#[test]
fn test_snapshot_is_stable_across_append() {
	let registry = RuleRegistry::new();
	registry.add(CallRule::new(
		CallMatcher::any_call(),
		ReturnValueStrategy::DoNothing,
	));
	let snap = registry.snapshot();
	registry.add(CallRule::new(
		CallMatcher::any_call(),
		ReturnValueStrategy::CallBase,
	));

	assert_eq!(snap.len(), 1);
	assert_eq!(registry.snapshot().len(), 2);
}

#[test]
fn test_precedence_is_newest_first() {
	let registry = RuleRegistry::new();
	let first = registry.add(CallRule::new(
		CallMatcher::any_call(),
		ReturnValueStrategy::DoNothing,
	));
	let second = registry.add(CallRule::new(
		CallMatcher::any_call(),
		ReturnValueStrategy::DoNothing,
	));
	let order: Vec<_> = registry.snapshot().by_precedence().map(|r| r.id()).collect();
	assert_eq!(order, vec![second.id(), first.id()]);
}

#[test]
fn test_clear_keeps_old_snapshots_alive() {
	let registry = RuleRegistry::new();
	registry.add(CallRule::new(
		CallMatcher::any_call(),
		ReturnValueStrategy::DoNothing,
	));
	let snap = registry.snapshot();
	registry.clear();
	assert!(registry.is_empty());
	assert_eq!(snap.len(), 1);
}

#[test]
fn test_budget_is_atomic_under_contention() {
	let rule = CallRule::new(
		CallMatcher::member("Bar"),
		ReturnValueStrategy::Fixed(Value::Int(1)),
	)
	.with_repeat(50);
	let answered = AtomicUsize::new(0);
	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				for _ in 0..20 {
					if rule.apply(&bar_call()).is_some() {
						answered.fetch_add(1, Ordering::SeqCst);
					}
				}
			});
		}
	});
	assert_eq!(answered.load(Ordering::SeqCst), 50);
	assert_eq!(rule.remaining(), Some(0));
}
