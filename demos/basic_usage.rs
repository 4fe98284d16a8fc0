//! Basic usage example of the stale-while-revalidate cache.

use stale_cache::{
    error::Result, observability::LogMetrics, store::InMemoryStore, FetchConfig, Produced,
    StaleCache,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Mock report renderer that simulates a slow query
struct ReportRenderer {
    renders: AtomicUsize,
}

impl ReportRenderer {
    async fn render(&self, report: &str) -> Result<Produced> {
        let n = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  [DB] Rendering {} (render #{})", report, n);
        sleep(Duration::from_millis(300)).await;

        // Fresh for one second
        Ok(Produced::new(
            format!("{} v{}", report, n),
            Duration::from_secs(1),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Stale Cache - Basic Example ===\n");

    // 1. Initialize cache
    println!("1. Initializing cache over an in-memory store...");
    let store = InMemoryStore::new();
    let cache = StaleCache::new(store.clone()).with_metrics(Box::new(LogMetrics));
    let renderer = ReportRenderer {
        renders: AtomicUsize::new(0),
    };
    let config = FetchConfig::default().with_regeneration_budget(Duration::from_secs(1));

    println!("   ✓ Cache ready\n");

    // 2. First request - nothing cached, producer runs
    println!("2. First request for report:sales:");
    let value = cache
        .fetch("report:sales", || renderer.render("report:sales"), &config)
        .await?;
    println!("   ✓ Got: {}\n", value);

    // 3. Second request - fresh hit
    println!("3. Second request for report:sales:");
    let value = cache
        .fetch("report:sales", || renderer.render("report:sales"), &config)
        .await?;
    println!("   ✓ Got from cache: {}\n", value);

    // 4. Let the value go stale, then fetch concurrently
    println!("4. Waiting for the value to go stale...");
    sleep(Duration::from_millis(1_100)).await;

    println!("   Two concurrent requests after expiry:");
    let (first, second) = tokio::join!(
        cache.fetch("report:sales", || renderer.render("report:sales"), &config),
        async {
            // Arrives while the first caller is regenerating
            sleep(Duration::from_millis(50)).await;
            cache
                .fetch("report:sales", || renderer.render("report:sales"), &config)
                .await
        }
    );
    println!("   ✓ Regenerating caller got: {}", first?);
    println!("   ✓ Concurrent caller got the stale value: {}\n", second?);

    // 5. Multi-get
    println!("5. Multi-get (missing keys come back empty):");
    let values = cache.get_all(&["report:sales", "report:missing"]).await?;
    for (key, value) in ["report:sales", "report:missing"].iter().zip(&values) {
        println!("   {} => {:?}", key, value);
    }
    println!();

    // 6. Per-call bypass
    println!("6. Per-call bypass (producer always runs):");
    let bypass = config.clone().with_disabled(true);
    let value = cache
        .fetch("report:sales", || renderer.render("report:sales"), &bypass)
        .await?;
    println!("   ✓ Got straight from the producer: {}\n", value);

    println!("=== Example Complete ===\n");
    println!(
        "ℹ️  Producer ran {} times, store holds {} entries.\n",
        renderer.renders.load(Ordering::SeqCst),
        store.len()
    );

    Ok(())
}
