use std::sync::Arc;
use std::time::Instant;

use e2e_log_sink::memory_sink::MemorySink;
use e2e_log_sink::{Level, Logger, LoggerConfig};

#[tokio::main]
async fn main() {
    let memory = MemorySink::new();
    let config = LoggerConfig::new(Level::Info).with_sink(Arc::new(memory.clone()));
    let logger = Logger::new("load", config);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.info(format!("load test record {}", i));
    }
    let submitted = start.elapsed();
    logger.flush().await;
    let drained = start.elapsed();

    let stats = logger.stats();
    println!(
        "submitted {} records in {:?} (~{:.0} rec/s), drained after {:?}",
        n,
        submitted,
        n as f64 / submitted.as_secs_f64(),
        drained
    );
    println!(
        "stored {}, enqueued {}, dropped {}, sink failures {}",
        memory.len(),
        stats.enqueued,
        stats.dropped,
        stats.sink_failures
    );
}
