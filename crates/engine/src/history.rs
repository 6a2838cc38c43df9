//! Append-only call history.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use decoy_meta::{Args, MemberKey, TypeArgs, TypeExpr, Value};
use parking_lot::RwLock;

/// Process-wide ordering of recorded calls across all fakes.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One intercepted call. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	/// Assigned by [`CallHistory::append`]; zero until then.
	pub sequence: u64,
	pub member: MemberKey,
	pub type_args: TypeArgs,
	pub args: Args,
	/// Declared return type specialized for `type_args`.
	pub return_type: TypeExpr,
}

impl RecordedCall {
	pub(crate) fn new(
		member: MemberKey,
		type_args: TypeArgs,
		args: Args,
		return_type: TypeExpr,
	) -> Self {
		Self {
			sequence: 0,
			member,
			type_args,
			args,
			return_type,
		}
	}

	pub fn arg(&self, idx: usize) -> Option<&Value> {
		self.args.get(idx)
	}
}

impl fmt::Display for RecordedCall {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.member)?;
		if !self.type_args.is_empty() {
			f.write_str("<")?;
			for (i, ty) in self.type_args.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{ty}")?;
			}
			f.write_str(">")?;
		}
		f.write_str("(")?;
		for (i, arg) in self.args.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{arg}")?;
		}
		f.write_str(")")
	}
}

/// Recorded calls of one fake.
///
/// Sequence numbers are taken under the write guard, so recording order and
/// sequence order agree for every history.
#[derive(Default)]
pub struct CallHistory {
	calls: RwLock<Vec<Arc<RecordedCall>>>,
}

impl CallHistory {
	/// Stamps `call` with the next sequence number and records it.
	pub fn append(&self, mut call: RecordedCall) -> Arc<RecordedCall> {
		let mut calls = self.calls.write();
		call.sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
		let call = Arc::new(call);
		calls.push(call.clone());
		call
	}

	/// Calls recorded so far, in recording order.
	pub fn snapshot(&self) -> Vec<Arc<RecordedCall>> {
		self.calls.read().clone()
	}

	pub fn len(&self) -> usize {
		self.calls.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
