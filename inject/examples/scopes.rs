use fibre_inject::{of, global, Service, ServiceId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Counts every request the process has served, whichever scope handled it.
#[derive(Default)]
struct RequestCounter {
  served: AtomicUsize,
}

// Built once per scope.
struct Session {
  user: String,
}

fn handle(scope: &str) -> usize {
  let container = of(scope);
  let session = container.resolve::<Session>(ServiceId::of::<Session>()).unwrap();
  let counter = container
    .resolve::<RequestCounter>(ServiceId::of::<RequestCounter>())
    .unwrap();
  let served = counter.served.fetch_add(1, Ordering::SeqCst) + 1;
  println!("[{}] session for {} (request #{})", scope, session.user, served);
  served
}

fn main() {
  global().register(
    Service::<RequestCounter>::new()
      .global()
      .factory(|_| Ok(RequestCounter::default())),
  );
  global().register(Service::<Session>::new().factory(|container| {
    Ok(Session {
      user: container.scope_name().unwrap_or("anonymous").to_string(),
    })
  }));

  handle("alice");
  handle("bob");
  assert_eq!(handle("alice"), 3);

  let alice = of("alice").resolve::<Session>(ServiceId::of::<Session>()).unwrap();
  let bob = of("bob").resolve::<Session>(ServiceId::of::<Session>()).unwrap();
  assert!(!Arc::ptr_eq(&alice, &bob));
  println!("Scopes known to the global container: {:?}", global().scope_names());
}
