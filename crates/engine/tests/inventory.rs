use decoy_engine::dummy::FactorySource;
use decoy_engine::{DummyRegistry, Runtime, Value, dummy_factory};
use decoy_meta::{TypeCatalog, TypeDesc, TypeExpr};

fn is_clock(ty: &TypeExpr) -> bool {
	matches!(ty, TypeExpr::Named(name) if &**name == "Clock")
}

dummy_factory!(
	CLOCK_EPOCH,
	priority: 0,
	applies: is_clock,
	create: |_| Value::Int(0),
);

dummy_factory!(
	CLOCK_NOON,
	priority: 5,
	applies: is_clock,
	create: |_| Value::Int(12),
);

fn catalog() -> TypeCatalog {
	TypeCatalog::builder()
		.add(TypeDesc::interface("Clock").method("Now", TypeExpr::INT))
		.build()
		.unwrap()
}

#[test]
fn test_inventory_factories_are_collected() {
	let registry = DummyRegistry::builder().extend_inventory().build();
	let names: Vec<_> = registry
		.describe()
		.into_iter()
		.filter(|(_, _, source)| *source == FactorySource::Inventory)
		.map(|(name, priority, _)| (name, priority))
		.collect();
	assert_eq!(
		names,
		vec![("CLOCK_NOON".to_owned(), 5), ("CLOCK_EPOCH".to_owned(), 0)]
	);

	let runtime = Runtime::builder(catalog()).dummies(registry).build();
	assert_eq!(runtime.dummy(&TypeExpr::named("Clock")), Value::Int(12));
}

#[test]
fn test_explicit_factory_outranks_inventory_at_higher_priority() {
	let registry = DummyRegistry::builder()
		.extend_inventory()
		.register(decoy_engine::FnDummyFactory::for_type(
			TypeExpr::named("Clock"),
			9,
			|| Value::Int(99),
		))
		.build();
	let runtime = Runtime::builder(catalog()).dummies(registry).build();
	assert_eq!(runtime.dummy(&TypeExpr::named("Clock")), Value::Int(99));
}
