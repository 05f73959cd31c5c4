//! Persisted counter: run twice to see the value restored from disk.

use draftstore::{FileStorage, PersistOptions, Store, StoreOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Counter {
    counter: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir().join("draftstore-counter");
    let storage = Arc::new(FileStorage::open(&dir)?);

    let store = Store::create(
        |_, _| Counter { counter: 0 },
        StoreOptions::default().persist(PersistOptions::new("counter").storage(storage)),
    );
    println!("Starting at {}", store.get_state().counter);

    store.subscribe(|state| println!("   [Store Update] counter = {}", state.counter));

    for _ in 0..3 {
        store.set_state(|s| s.counter += 1)?;
    }

    println!("Saved under {}", dir.display());
    Ok(())
}
