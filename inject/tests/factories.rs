use fibre_inject::{
  Arguments, ConstructError, Container, Injectable, Methods, ResolveError, Service, ServiceId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

#[derive(Debug)]
struct Engine {
  horsepower: u32,
}

#[derive(Debug)]
struct Wheels {
  count: u8,
}

#[derive(Debug)]
struct Car {
  engine: Arc<Engine>,
  wheels: Arc<Wheels>,
  serial: usize,
}

// A factory type with its own state, exposing `build` to product registrations.
struct CarFactory {
  built: AtomicUsize,
}

impl Injectable for CarFactory {
  fn construct(_args: &mut Arguments) -> Result<Self, ConstructError> {
    Ok(CarFactory {
      built: AtomicUsize::new(0),
    })
  }

  fn methods(methods: &mut Methods<Self>) {
    methods.add("build", |factory: &CarFactory, args: &mut Arguments| {
      Ok(Car {
        engine: args.take()?,
        wheels: args.take()?,
        serial: factory.built.fetch_add(1, Ordering::SeqCst),
      })
    });
  }
}

fn register_parts(container: &Container) {
  container.register(Service::<Engine>::new().factory(|_| Ok(Engine { horsepower: 150 })));
  container.register(Service::<Wheels>::new().value(Wheels { count: 4 }));
}

fn car_service() -> Service<Car> {
  Service::<Car>::new()
    .transient()
    .depends_on([ServiceId::of::<Engine>(), ServiceId::of::<Wheels>()])
    .factory_method(ServiceId::injectable::<CarFactory>(), "build")
}

// --- Factory Tests ---

#[test]
fn test_factory_function_resolves_its_own_dependencies() {
  struct Garage {
    car_count: usize,
    engine: Arc<Engine>,
  }

  let container = Container::new();
  register_parts(&container);
  container.register(Service::<Garage>::new().factory(|c| {
    Ok(Garage {
      car_count: 2,
      engine: c.resolve(ServiceId::of::<Engine>())?,
    })
  }));

  let garage = container.resolve::<Garage>(ServiceId::of::<Garage>()).unwrap();

  assert_eq!(garage.car_count, 2);
  assert_eq!(garage.engine.horsepower, 150);
  assert!(Arc::ptr_eq(
    &garage.engine,
    &container.resolve::<Engine>(ServiceId::of::<Engine>()).unwrap()
  ));
}

#[test]
fn test_factory_function_receives_the_resolving_scope() {
  let container = Container::new();
  container.register(
    Service::<String>::new()
      .id("scope_label")
      .factory(|c| Ok(c.scope_name().unwrap_or("default").to_string())),
  );

  assert_eq!(*container.resolve::<String>("scope_label").unwrap(), "default");
  assert_eq!(*container.of("request").resolve::<String>("scope_label").unwrap(), "request");
}

#[test]
fn test_factory_method_wires_product_dependencies() {
  let container = Container::new();
  register_parts(&container);
  container.register(car_service());

  let first = container.resolve::<Car>(ServiceId::of::<Car>()).unwrap();
  let second = container.resolve::<Car>(ServiceId::of::<Car>()).unwrap();

  assert_eq!(first.engine.horsepower, 150);
  assert_eq!(first.wheels.count, 4);
  // Transient products, one shared factory instance.
  assert!(!Arc::ptr_eq(&first, &second));
  assert_eq!((first.serial, second.serial), (0, 1));
  assert!(Arc::ptr_eq(&first.engine, &second.engine));
  assert_eq!(
    container
      .get::<CarFactory>()
      .unwrap()
      .built
      .load(Ordering::SeqCst),
    2
  );
}

#[test]
fn test_factory_method_on_an_explicitly_registered_factory() {
  struct Prefixer {
    prefix: String,
  }

  let container = Container::new();
  container.register(
    Service::<Prefixer>::new()
      .id("prefixer")
      .value(Prefixer {
        prefix: "svc-".into(),
      })
      .method("name", |prefixer: &Prefixer, args: &mut Arguments| {
        let base = args.take::<String>()?;
        Ok(format!("{}{}", prefixer.prefix, base))
      }),
  );
  container.register(Service::<String>::new().id("base").value("billing".into()));
  container.register(
    Service::<String>::new()
      .id("service_name")
      .depends_on(["base"])
      .factory_method("prefixer", "name"),
  );

  assert_eq!(*container.resolve::<String>("service_name").unwrap(), "svc-billing");
}

#[test]
fn test_unknown_factory_method_is_a_construction_error() {
  let container = Container::new();
  register_parts(&container);
  container.register(
    Service::<Car>::new()
      .id("car_with_typo")
      .factory_method(ServiceId::injectable::<CarFactory>(), "biuld"),
  );

  let err = container.resolve::<Car>("car_with_typo").unwrap_err();

  match err {
    ResolveError::Construct { ref id, ref source } => {
      assert_eq!(id, &ServiceId::token("car_with_typo"));
      assert!(matches!(
        source.as_ref(),
        ConstructError::MalformedFactory { method, .. } if method == "biuld"
      ));
    }
    other => panic!("unexpected error: {}", other),
  }
}

#[test]
fn test_empty_factory_method_name_is_malformed() {
  let container = Container::new();
  container.register(Service::<Car>::new().factory_method(ServiceId::injectable::<CarFactory>(), ""));

  let err = container.resolve::<Car>(ServiceId::of::<Car>()).unwrap_err();

  assert!(err.to_string().contains("method name is empty"));
  // The factory type was never needed.
  assert!(!container.has(ServiceId::of::<CarFactory>()));
}

#[test]
fn test_unregistered_factory_type_fails() {
  struct NotAFactory;

  let container = Container::new();
  container.register(Service::<Car>::new().factory_method(ServiceId::of::<NotAFactory>(), "build"));

  let err = container.resolve::<Car>(ServiceId::of::<Car>()).unwrap_err();

  assert!(err.is_not_found());
}

#[test]
fn test_registration_without_provider_fails() {
  #[derive(Debug)]
  struct Unbuildable;

  let container = Container::new();
  container.register(Service::<Unbuildable>::new());

  let err = container
    .resolve::<Unbuildable>(ServiceId::of::<Unbuildable>())
    .unwrap_err();

  assert!(matches!(
    err,
    ResolveError::Construct { ref source, .. } if matches!(source.as_ref(), ConstructError::MissingProvider)
  ));
}

#[test]
fn test_constructor_argument_type_mismatch() {
  #[derive(Debug)]
  struct Wrong;

  let container = Container::new();
  register_parts(&container);
  container.register(
    Service::<Wrong>::new()
      .depends_on([ServiceId::of::<Engine>()])
      .constructor(|args| {
        args.take::<Wheels>()?;
        Ok(Wrong)
      }),
  );

  let err = container.resolve::<Wrong>(ServiceId::of::<Wrong>()).unwrap_err();

  assert!(err.to_string().contains("argument 0"));
}

#[test]
fn test_failing_factory_is_not_cached() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  let counter = Arc::clone(&attempts);
  container.register(Service::<u64>::new().id("flaky").factory(move |_| {
    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
      return Err(ConstructError::failed("warming up"));
    }
    Ok(7)
  }));

  let err = container.resolve::<u64>("flaky").unwrap_err();
  assert_eq!(err.to_string(), "failed to construct 'flaky': warming up");

  assert_eq!(*container.resolve::<u64>("flaky").unwrap(), 7);
  assert_eq!(*container.resolve::<u64>("flaky").unwrap(), 7);
  assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
