//! Return value strategies.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use decoy_meta::Value;

use crate::error::CallError;
use crate::history::RecordedCall;

pub(crate) type Producer = Arc<dyn Fn(&RecordedCall) -> Value + Send + Sync>;
pub(crate) type ErrorProducer = Arc<dyn Fn(&RecordedCall) -> CallError + Send + Sync>;

/// What a rule produces once it has matched.
pub enum ReturnValueStrategy {
	Fixed(Value),
	/// Evaluated once per matching call.
	Lazy(Producer),
	/// One value per call; the rule becomes ineligible once exhausted.
	Sequence {
		values: Vec<Value>,
		cursor: AtomicUsize,
	},
	CallBase,
	/// Produces the default for the return type without touching property state.
	DoNothing,
	Throws(ErrorProducer),
}

/// Slot claimed from a strategy before side effects run.
pub(crate) enum Claim {
	Ready,
	Slot(usize),
}

/// Result of applying a strategy.
#[derive(Debug)]
pub enum Outcome {
	Value(Value),
	CallBase,
	Default,
	Throw(CallError),
}

impl ReturnValueStrategy {
	pub fn sequence(values: impl IntoIterator<Item = Value>) -> Self {
		Self::Sequence {
			values: values.into_iter().collect(),
			cursor: AtomicUsize::new(0),
		}
	}

	/// Reserves this call's share of the strategy, or `None` once exhausted.
	pub(crate) fn claim(&self) -> Option<Claim> {
		match self {
			Self::Sequence { values, cursor } => {
				let idx = cursor
					.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
						(n < values.len()).then_some(n + 1)
					})
					.ok()?;
				Some(Claim::Slot(idx))
			}
			_ => Some(Claim::Ready),
		}
	}

	pub(crate) fn produce(&self, claim: Claim, call: &RecordedCall) -> Outcome {
		match (self, claim) {
			(Self::Fixed(value), _) => Outcome::Value(value.clone()),
			(Self::Lazy(producer), _) => Outcome::Value(producer(call)),
			(Self::Sequence { values, .. }, Claim::Slot(idx)) => match values.get(idx) {
				Some(value) => Outcome::Value(value.clone()),
				None => Outcome::Default,
			},
			(Self::Sequence { .. }, Claim::Ready) => Outcome::Default,
			(Self::CallBase, _) => Outcome::CallBase,
			(Self::DoNothing, _) => Outcome::Default,
			(Self::Throws(make), _) => Outcome::Throw(make(call)),
		}
	}

	pub fn is_exhausted(&self) -> bool {
		match self {
			Self::Sequence { values, cursor } => cursor.load(Ordering::Acquire) >= values.len(),
			_ => false,
		}
	}
}

impl fmt::Debug for ReturnValueStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
			Self::Lazy(_) => f.write_str("Lazy"),
			Self::Sequence { values, cursor } => f
				.debug_struct("Sequence")
				.field("values", values)
				.field("cursor", &cursor.load(Ordering::Relaxed))
				.finish(),
			Self::CallBase => f.write_str("CallBase"),
			Self::DoNothing => f.write_str("DoNothing"),
			Self::Throws(_) => f.write_str("Throws"),
		}
	}
}

impl fmt::Display for ReturnValueStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fixed(value) => write!(f, "returns {value}"),
			Self::Lazy(_) => f.write_str("returns lazily"),
			Self::Sequence { values, .. } => write!(f, "returns {} value(s) in sequence", values.len()),
			Self::CallBase => f.write_str("calls base"),
			Self::DoNothing => f.write_str("does nothing"),
			Self::Throws(_) => f.write_str("throws"),
		}
	}
}
