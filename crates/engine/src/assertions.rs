//! Call-history assertions.

use std::fmt;
use std::sync::Arc;

use crate::error::ExpectationError;
use crate::history::RecordedCall;
use crate::matcher::CallMatcher;
use crate::proxy::Fake;

/// How often a call is expected to have happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeated {
	Never,
	Once,
	Exactly(usize),
	AtLeast(usize),
	AtMost(usize),
}

impl Repeated {
	pub fn matches(self, count: usize) -> bool {
		match self {
			Self::Never => count == 0,
			Self::Once => count == 1,
			Self::Exactly(n) => count == n,
			Self::AtLeast(n) => count >= n,
			Self::AtMost(n) => count <= n,
		}
	}
}

impl fmt::Display for Repeated {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Never => f.write_str("never"),
			Self::Once => f.write_str("exactly once"),
			Self::Exactly(n) => write!(f, "exactly {n} time(s)"),
			Self::AtLeast(n) => write!(f, "at least {n} time(s)"),
			Self::AtMost(n) => write!(f, "at most {n} time(s)"),
		}
	}
}

impl Fake {
	/// Recorded calls accepted by `matcher`, in recording order.
	pub fn calls_matching(&self, matcher: &CallMatcher) -> Vec<Arc<RecordedCall>> {
		self.manager()
			.calls()
			.into_iter()
			.filter(|call| matcher.matches(call))
			.collect()
	}

	/// Checks how many recorded calls `matcher` accepts.
	pub fn assert_called(
		&self,
		matcher: &CallMatcher,
		expected: Repeated,
	) -> Result<(), ExpectationError> {
		let calls = self.manager().calls();
		let actual = calls.iter().filter(|call| matcher.matches(call)).count();
		if expected.matches(actual) {
			return Ok(());
		}
		Err(ExpectationError {
			matcher: matcher.to_string(),
			expected,
			actual,
			calls: render_calls(&calls),
		})
	}
}

fn render_calls(calls: &[Arc<RecordedCall>]) -> String {
	if calls.is_empty() {
		return "  (none)".to_owned();
	}
	calls
		.iter()
		.enumerate()
		.map(|(i, call)| format!("  {}: {call}", i + 1))
		.collect::<Vec<_>>()
		.join("\n")
}
