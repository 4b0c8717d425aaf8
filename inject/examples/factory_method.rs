use fibre_inject::{Arguments, ConstructError, Container, Injectable, Methods, Service, ServiceId};

struct Credentials {
  user: String,
}

struct Connection {
  dsn: String,
}

// Builds connections; registered on demand through its `Injectable` impl.
struct ConnectionFactory {
  host: String,
}

impl Injectable for ConnectionFactory {
  fn construct(_args: &mut Arguments) -> Result<Self, ConstructError> {
    Ok(ConnectionFactory {
      host: "db.internal:5432".into(),
    })
  }

  fn methods(methods: &mut Methods<Self>) {
    methods.add("connect", |factory: &ConnectionFactory, args: &mut Arguments| {
      let credentials = args.take::<Credentials>()?;
      Ok(Connection {
        dsn: format!("postgres://{}@{}", credentials.user, factory.host),
      })
    });
  }
}

fn main() {
  let container = Container::new();
  container.register(Service::<Credentials>::new().value(Credentials { user: "app".into() }));
  container.register(
    Service::<Connection>::new()
      .depends_on([ServiceId::of::<Credentials>()])
      .factory_method(ServiceId::injectable::<ConnectionFactory>(), "connect"),
  );

  let connection = container
    .resolve::<Connection>(ServiceId::of::<Connection>())
    .unwrap();
  println!("Connected to {}", connection.dsn);
  assert_eq!(connection.dsn, "postgres://app@db.internal:5432");

  // A typo in the method name is reported, not panicked on.
  container.register(
    Service::<Connection>::new()
      .id("broken")
      .factory_method(ServiceId::injectable::<ConnectionFactory>(), "conect"),
  );
  match container.resolve::<Connection>("broken") {
    Ok(_) => panic!("Should not have built the connection!"),
    Err(err) => println!("Correctly failed: {}", err),
  }

  // The factory itself is an ordinary cached service.
  let factory = container.get::<ConnectionFactory>().unwrap();
  println!("Factory host: {}", factory.host);
}
