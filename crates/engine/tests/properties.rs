use decoy_engine::{Fake, Runtime, Value};
use decoy_meta::{Primitive, TypeCatalog, TypeDesc, TypeExpr};
use proptest::prelude::*;

fn fake() -> Fake {
	let catalog = TypeCatalog::builder()
		.add(
			TypeDesc::interface("IFoo")
				.method("Int", TypeExpr::INT)
				.method("Flag", TypeExpr::BOOL)
				.method("Ratio", TypeExpr::Primitive(Primitive::Float))
				.method("Letter", TypeExpr::Primitive(Primitive::Char)),
		)
		.build()
		.unwrap();
	Runtime::new(catalog).fake("IFoo").unwrap()
}

fn arb_member() -> impl Strategy<Value = (&'static str, Value)> {
	prop_oneof![
		Just(("Int", Value::Int(0))),
		Just(("Flag", Value::Bool(false))),
		Just(("Ratio", Value::Float(0.0))),
		Just(("Letter", Value::Char('\0'))),
	]
}

proptest! {
	/// Unconfigured value-type members always produce the zero of their type.
	#[test]
	fn prop_unconfigured_value_returns_are_zero(
		(member, zero) in arb_member(),
		calls in 1usize..32,
	) {
		let foo = fake();
		for _ in 0..calls {
			prop_assert_eq!(foo.call(member, []).unwrap(), zero.clone());
		}
		prop_assert_eq!(foo.manager().call_count(), calls);
	}

	/// A sequence yields its values once each, then falls through to the older rule.
	#[test]
	fn prop_sequence_then_fall_through(
		values in prop::collection::vec(any::<i64>(), 0..16),
		fallback in any::<i64>(),
		extra in 1usize..4,
	) {
		let foo = fake();
		foo.call_to("Int").returns(fallback).unwrap();
		foo.call_to("Int")
			.returns_sequence(values.iter().copied().map(Value::Int))
			.unwrap();

		for v in &values {
			prop_assert_eq!(foo.call("Int", []).unwrap(), Value::Int(*v));
		}
		for _ in 0..extra {
			prop_assert_eq!(foo.call("Int", []).unwrap(), Value::Int(fallback));
		}
	}

	/// With several matching rules the most recently added one answers.
	#[test]
	fn prop_newest_rule_wins(values in prop::collection::vec(any::<i64>(), 1..16)) {
		let foo = fake();
		for v in &values {
			foo.call_to("Int").returns(*v).unwrap();
		}
		let newest = *values.last().unwrap();
		prop_assert_eq!(foo.call("Int", []).unwrap(), Value::Int(newest));
	}
}
