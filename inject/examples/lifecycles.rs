use fibre_inject::{global, resolve, Service};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  // --- Singleton Registration ---
  // This factory will only be called ONCE.
  global().register(Service::<RequestTracker>::new().id("singleton_tracker").factory(|_| {
    println!("Creating SINGLETON RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  }));

  // --- Transient Registration ---
  // This factory will be called EVERY time the service is resolved.
  global().register(
    Service::<RequestTracker>::new()
      .id("transient_tracker")
      .transient()
      .factory(|_| {
        println!("Creating TRANSIENT RequestTracker...");
        Ok(RequestTracker {
          id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
        })
      }),
  );

  println!("--- Resolving Singletons ---");
  let s1 = resolve!(RequestTracker, "singleton_tracker");
  let s2 = resolve!(RequestTracker, "singleton_tracker");
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Transients ---");
  let t1 = resolve!(RequestTracker, "transient_tracker");
  let t2 = resolve!(RequestTracker, "transient_tracker");
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!((t1.id, t2.id), (1, 2));
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");
}
