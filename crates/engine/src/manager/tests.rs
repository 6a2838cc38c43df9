use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use decoy_meta::{
	ConstructorDesc, MemberDesc, MemberKey, TypeCatalog, TypeDesc, TypeExpr, Value, WrapperKind,
};
use pretty_assertions::assert_eq;

use crate::{CallError, ConfigError, Fake, FakeOptions, Invocation, Runtime};

fn catalog() -> TypeCatalog {
	TypeCatalog::builder()
		.add(
			TypeDesc::interface("IFoo")
				.method("Bar", TypeExpr::INT)
				.method("Name", TypeExpr::String)
				.method("Fetch", TypeExpr::task_of(TypeExpr::INT))
				.method("Run", TypeExpr::Task(None))
				.method("Child", TypeExpr::named("IBar"))
				.method("Handle", TypeExpr::named("Handle"))
				.member(MemberDesc::method("Put", TypeExpr::Void).param("x", TypeExpr::INT))
				.member(MemberDesc::method("Get", TypeExpr::Param(0)).generic(1))
				.property("Count", TypeExpr::INT)
				.event("Changed", TypeExpr::named("object")),
		)
		.add(TypeDesc::interface("IBar").method("Ping", TypeExpr::BOOL))
		.add(
			TypeDesc::class("Handle")
				.sealed()
				.constructor(ConstructorDesc::parameterless().private()),
		)
		.add(
			TypeDesc::class("Widget")
				.constructor(ConstructorDesc::parameterless())
				.member(
					MemberDesc::method("Describe", TypeExpr::String)
						.virtual_with(|_| Ok(Value::str("widget"))),
				)
				.member(MemberDesc::method("Id", TypeExpr::INT).sealed_with(|_| Ok(Value::Int(9))))
				.method("Compute", TypeExpr::INT),
		)
		.add(
			TypeDesc::interface("IGreeter")
				.member(
					MemberDesc::method("Greet", TypeExpr::String)
						.default_body(false, |_| Ok(Value::str("hello"))),
				)
				.member(
					MemberDesc::method("Motto", TypeExpr::String)
						.default_body(true, |_| Ok(Value::str("fixed"))),
				),
		)
		.build()
		.unwrap()
}

fn foo() -> Fake {
	Runtime::new(catalog()).fake("IFoo").unwrap()
}

#[test]
fn test_unconfigured_value_return_is_zero() {
	let foo = foo();
	for _ in 0..3 {
		assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(0));
	}
	assert_eq!(foo.call("Name", []).unwrap(), Value::str(""));
	assert_eq!(foo.call("Put", [Value::Int(1)]).unwrap(), Value::Unit);
}

#[test]
fn test_unconstructible_reference_return_is_null() {
	assert_eq!(foo().call("Handle", []).unwrap(), Value::Null);
}

#[test]
fn test_interface_return_is_usable_fake() {
	let foo = foo();
	let child = foo.call("Child", []).unwrap();
	let bar = Fake::from_value(&child).unwrap();
	assert_eq!(bar.type_name(), "IBar");
	assert_eq!(bar.call("Ping", []).unwrap(), Value::Bool(false));
	assert_eq!(bar.manager().call_count(), 1);
}

#[test]
fn test_call_recorded_before_resolution() {
	let foo = foo();
	foo.call_to("Bar").throws(CallError::thrown("boom")).unwrap();

	let err = foo.call("Bar", []).unwrap_err();
	assert_eq!(err, CallError::thrown("boom"));
	let calls = foo.manager().calls();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].member, MemberKey::method("Bar"));
}

#[test]
fn test_property_behaves_as_backing_field() {
	let foo = foo();
	assert_eq!(foo.get("Count").unwrap(), Value::Int(0));
	foo.set("Count", 5).unwrap();
	assert_eq!(foo.get("Count").unwrap(), Value::Int(5));
}

#[test]
fn test_configured_getter_wins_over_set() {
	let foo = foo();
	foo.call_to_getter("Count").returns(123).unwrap();
	foo.set("Count", 456).unwrap();
	assert_eq!(foo.get("Count").unwrap(), Value::Int(123));
}

#[test]
fn test_configured_setter_bypasses_backing_field() {
	let foo = foo();
	foo.set("Count", 7).unwrap();
	foo.call_to_setter("Count").does_nothing().unwrap();
	foo.set("Count", 9).unwrap();
	assert_eq!(foo.get("Count").unwrap(), Value::Int(7));
}

#[test]
fn test_newest_rule_wins() {
	let foo = foo();
	foo.call_to("Bar").returns(1).unwrap();
	foo.call_to("Bar").returns(2).unwrap();
	assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(2));
	assert_eq!(foo.manager().rules().len(), 2);
}

#[test]
fn test_sequence_falls_through_to_older_rule() {
	let foo = foo();
	foo.call_to("Bar").returns(5).unwrap();
	foo.call_to("Bar")
		.returns_sequence([Value::Int(1), Value::Int(2)])
		.unwrap();

	let got: Vec<Value> = (0..4).map(|_| foo.call("Bar", []).unwrap()).collect();
	assert_eq!(got, [1, 2, 5, 5].map(Value::Int).to_vec());
	assert_eq!(foo.manager().rules().len(), 2);
}

#[test]
fn test_sequence_falls_through_to_default() {
	let foo = foo();
	foo.call_to("Bar").returns_sequence([Value::Int(1)]).unwrap();
	assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(1));
	assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(0));
}

#[test]
fn test_repeat_budget_then_older_rule() {
	let foo = foo();
	foo.call_to("Bar").returns(1).unwrap();
	foo.call_to("Bar").twice().returns(2).unwrap();
	let got: Vec<Value> = (0..3).map(|_| foo.call("Bar", []).unwrap()).collect();
	assert_eq!(got, [2, 2, 1].map(Value::Int).to_vec());
}

#[test]
fn test_task_returns_are_completed() {
	let foo = foo();
	assert_eq!(
		foo.call("Fetch", []).unwrap(),
		Value::completed(WrapperKind::Task, Value::Int(0))
	);
	assert_eq!(
		foo.call("Run", []).unwrap(),
		Value::completed(WrapperKind::Task, Value::Unit)
	);

	foo.call_to("Fetch").returns(3).unwrap();
	assert_eq!(
		foo.call("Fetch", []).unwrap(),
		Value::completed(WrapperKind::Task, Value::Int(3))
	);
}

#[test]
fn test_lazy_task_value_produced_at_call_time() {
	let foo = foo();
	let counter = Arc::new(AtomicI64::new(0));
	let c = counter.clone();
	foo.call_to("Fetch")
		.returns_lazily(move || Value::Int(c.fetch_add(1, Ordering::SeqCst) + 1))
		.unwrap();
	assert_eq!(counter.load(Ordering::SeqCst), 0);

	assert_eq!(
		foo.call("Fetch", []).unwrap(),
		Value::completed(WrapperKind::Task, Value::Int(1))
	);
	assert_eq!(
		foo.call("Fetch", []).unwrap(),
		Value::completed(WrapperKind::Task, Value::Int(2))
	);
	assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_default_string_representation() {
	let runtime = Runtime::new(catalog());
	assert_eq!(runtime.fake("IFoo").unwrap().to_string(), "Faked IFoo");

	let named = runtime
		.fake_with("IFoo", FakeOptions::new().named("primary"))
		.unwrap();
	assert_eq!(named.to_string(), "primary");

	named.call_to("to_string").returns("custom").unwrap();
	assert_eq!(named.to_string(), "custom");
}

#[test]
fn test_identity_members() {
	let runtime = Runtime::new(catalog());
	let a = runtime.fake("IFoo").unwrap();
	let b = runtime.fake("IFoo").unwrap();

	assert!(a.equals(&a.clone().into_value()).unwrap());
	assert!(!a.equals(&b.clone().into_value()).unwrap());
	assert_eq!(a.hash_code().unwrap(), a.hash_code().unwrap());
	assert_ne!(a, b);

	a.call_to("equals").returns(true).unwrap();
	assert!(a.equals(&b.into_value()).unwrap());
}

#[test]
fn test_reset_drops_rules_and_properties_but_keeps_history() {
	let foo = foo();
	foo.call_to("Bar").returns(1).unwrap();
	foo.set("Count", 3).unwrap();
	assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(1));

	foo.manager().reset();
	assert!(foo.manager().rules().is_empty());
	assert_eq!(foo.call("Bar", []).unwrap(), Value::Int(0));
	assert_eq!(foo.get("Count").unwrap(), Value::Int(0));
	assert_eq!(foo.manager().call_count(), 4);
}

#[test]
fn test_side_effects_run_before_value() {
	let foo = foo();
	let seen = Arc::new(AtomicI64::new(0));
	let s = seen.clone();
	foo.call_to("Put")
		.invokes(move |call| {
			s.store(call.arg(0).and_then(Value::as_int).unwrap_or(-1), Ordering::SeqCst);
		})
		.register()
		.unwrap();

	foo.call("Put", [Value::Int(11)]).unwrap();
	assert_eq!(seen.load(Ordering::SeqCst), 11);
}

#[test]
fn test_argument_constraints_select_rule() {
	let foo = foo();
	foo.call_to("Put")
		.when_args("negative", |args| args[0].as_int().is_some_and(|n| n < 0))
		.throws(CallError::thrown("negative"))
		.unwrap();

	assert!(foo.call("Put", [Value::Int(1)]).is_ok());
	assert!(foo.call("Put", [Value::Int(-1)]).is_err());
}

#[test]
fn test_generic_rule_matches_exact_instantiation() {
	let foo = foo();
	foo.call_to("Get")
		.with_type_args([TypeExpr::INT])
		.returns(5)
		.unwrap();

	assert_eq!(foo.call_generic("Get", [TypeExpr::INT], []).unwrap(), Value::Int(5));
	assert_eq!(
		foo.call_generic("Get", [TypeExpr::String], []).unwrap(),
		Value::str("")
	);

	foo.calls_with_return_type(TypeExpr::String)
		.returns("s")
		.unwrap();
	assert_eq!(
		foo.call_generic("Get", [TypeExpr::String], []).unwrap(),
		Value::str("s")
	);
	assert_eq!(foo.call("Name", []).unwrap(), Value::str("s"));
}

#[test]
fn test_configuration_errors() {
	let foo = foo();
	assert!(matches!(
		foo.call_to("Missing").returns(1),
		Err(ConfigError::UnknownMember { .. })
	));
	assert!(matches!(
		foo.call_to("Get").returns(1),
		Err(ConfigError::GenericArity {
			expected: 1,
			actual: 0,
			..
		})
	));
	assert!(matches!(
		foo.call_to("Put").with_args([]).returns(1),
		Err(ConfigError::ArgumentCount {
			expected: 1,
			actual: 0,
			..
		})
	));
	assert!(foo.manager().rules().is_empty());
}

#[test]
fn test_events_resolve_to_unit() {
	let foo = foo();
	let out = foo
		.invoke(MemberKey::event_add("Changed"), Invocation::new([Value::Null]))
		.unwrap();
	assert_eq!(out, Value::Unit);
	assert_eq!(foo.manager().call_count(), 1);
}

#[test]
fn test_call_base_forwards_to_virtual_body() {
	let runtime = Runtime::new(catalog());
	let widget = runtime.fake("Widget").unwrap();
	assert_eq!(widget.call("Describe", []).unwrap(), Value::str(""));

	widget.call_to("Describe").calls_base().unwrap();
	assert_eq!(widget.call("Describe", []).unwrap(), Value::str("widget"));

	let through = runtime
		.fake_with("Widget", FakeOptions::new().calls_base_methods())
		.unwrap();
	assert_eq!(through.call("Describe", []).unwrap(), Value::str("widget"));
	assert_eq!(through.call("Compute", []).unwrap(), Value::Int(0));
}

#[test]
fn test_call_base_requires_overridable_body() {
	let widget = Runtime::new(catalog()).fake("Widget").unwrap();
	assert!(matches!(
		widget.call_to("Compute").calls_base(),
		Err(ConfigError::NoBaseImplementation { .. })
	));
	assert!(matches!(
		widget.call_to("Id").returns(1),
		Err(ConfigError::NotInterceptable { .. })
	));

	assert_eq!(widget.call("Id", []).unwrap(), Value::Int(9));
	assert_eq!(widget.manager().call_count(), 0);
}

#[test]
fn test_sealed_default_interface_method_is_not_configurable() {
	let greeter = Runtime::new(catalog()).fake("IGreeter").unwrap();
	assert!(matches!(
		greeter.call_to("Motto").returns("other"),
		Err(ConfigError::NotInterceptable { .. })
	));
	assert!(greeter.manager().rules().is_empty());

	assert_eq!(greeter.call("Motto", []).unwrap(), Value::str("fixed"));
	assert_eq!(greeter.manager().call_count(), 0);
}

#[test]
fn test_default_interface_method_forwards_to_body() {
	let runtime = Runtime::new(catalog());

	let greeter = runtime.fake("IGreeter").unwrap();
	assert_eq!(greeter.call("Greet", []).unwrap(), Value::str(""));
	greeter.call_to("Greet").calls_base().unwrap();
	assert_eq!(greeter.call("Greet", []).unwrap(), Value::str("hello"));
	assert_eq!(greeter.manager().call_count(), 2);

	let forwarding = runtime
		.fake_with("IGreeter", FakeOptions::new().calls_base_methods())
		.unwrap();
	assert!(forwarding.manager().rules().is_empty());
	assert_eq!(forwarding.call("Greet", []).unwrap(), Value::str("hello"));
	assert_eq!(forwarding.manager().call_count(), 1);
}
