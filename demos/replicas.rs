//! Example: two offline replicas of a page-view counter and a shopping cart.
//!
//! Run with `RUST_LOG=convergent=debug cargo run --example replicas` to see
//! merge logging.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use convergent::clock::MockClock;
use convergent::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> convergent::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Page views (G-Counter) ===\n");

    let eu = Arc::new(GCounter::with_identity("eu-west"));
    let us = Arc::new(GCounter::with_identity("us-east"));

    // Each region counts its own traffic on its own thread.
    let workers: Vec<_> = [(Arc::clone(&eu), 120), (Arc::clone(&us), 75)]
        .into_iter()
        .map(|(region, views)| {
            thread::spawn(move || {
                for _ in 0..views {
                    region.increment();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().expect("worker panicked");
    }

    println!("eu-west sees: {eu}");
    println!("us-east sees: {us}");

    // Anti-entropy in both directions.
    eu.merge(&us);
    us.merge(&eu);
    println!("\n--- After sync ---");
    println!("eu-west sees: {eu}");
    println!("us-east sees: {us}");

    // What would be shipped to storage or a peer.
    let wire = eu.to_json()?;
    println!("snapshot: {}", String::from_utf8_lossy(&wire));

    if let Err(e) = us.increment_by(-3) {
        println!("rejected: {e}");
    }

    println!("\n=== Shopping cart (LWW-Element-Set) ===\n");

    let clock = MockClock::new();
    let phone = LwwSet::with_bias(Bias::Add).with_clock(clock.clone());
    let laptop = LwwSet::with_bias(Bias::Add).with_clock(clock.clone());

    phone.add("coffee");
    phone.add("milk");
    clock.advance(Duration::from_secs(30));

    // Offline on the laptop: milk is removed later than the phone added it.
    laptop.remove(&"milk");
    laptop.add("bread");

    // Same instant on both devices: the add bias keeps the item.
    phone.add("sugar");
    laptop.remove(&"sugar");

    phone.merge(&laptop);
    laptop.merge(&phone);
    println!("phone:  {:?}", phone.elements());
    println!("laptop: {:?}", laptop.elements());

    let strict: LwwSet<&str> = LwwSet::with_bias_name("remove")?;
    println!("\nsecond cart bias: {}", strict.bias());
    if let Err(e) = LwwSet::<&str>::with_bias_name("first-wins") {
        println!("rejected: {e}");
    }

    Ok(())
}
