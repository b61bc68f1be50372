//! Performance benchmarks for a featureboard server
//!
//! Tests latency and throughput for read, vote, and mixed workloads

use featureboard::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

#[derive(Debug)]
struct BenchmarkResults {
    operation: String,
    total_operations: usize,
    duration: Duration,
    ops_per_second: f64,
    avg_latency_ms: f64,
    p95_latency_ms: f64,
    p99_latency_ms: f64,
}

impl BenchmarkResults {
    fn new(operation: String, total_operations: usize, duration: Duration, latencies: &mut [Duration]) -> Self {
        latencies.sort();

        let ops_per_second = total_operations as f64 / duration.as_secs_f64();
        let avg_latency_ms = latencies.iter().map(|d| d.as_secs_f64() * 1000.0).sum::<f64>() / latencies.len() as f64;

        let p95_index = (latencies.len() as f64 * 0.95) as usize;
        let p99_index = (latencies.len() as f64 * 0.99) as usize;

        let p95_latency_ms = latencies.get(p95_index).unwrap_or(&Duration::ZERO).as_secs_f64() * 1000.0;
        let p99_latency_ms = latencies.get(p99_index).unwrap_or(&Duration::ZERO).as_secs_f64() * 1000.0;

        Self {
            operation,
            total_operations,
            duration,
            ops_per_second,
            avg_latency_ms,
            p95_latency_ms,
            p99_latency_ms,
        }
    }

    fn print(&self) {
        println!("=== {} Benchmark Results ===", self.operation);
        println!("Total operations: {}", self.total_operations);
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
        println!("Average latency: {:.2}ms", self.avg_latency_ms);
        println!("P95 latency: {:.2}ms", self.p95_latency_ms);
        println!("P99 latency: {:.2}ms", self.p99_latency_ms);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = "127.0.0.1:8080";

    println!("featureboard Performance Benchmarks");
    println!("===================================");
    println!("Server: {}", server_addr);
    println!();

    // Wait for server to be ready
    println!("Waiting for server to be ready...");
    loop {
        if let Ok(client) = Client::connect(server_addr).await {
            let _ = client.close().await;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    println!("Server is ready!");
    println!();

    // Populate a pool of features the workloads run against
    let feature_ids = setup_features(server_addr, 100).await?;

    run_single_client_benchmarks(server_addr, &feature_ids).await?;
    run_concurrent_benchmarks(server_addr, feature_ids[0]).await?;

    Ok(())
}

/// Create the benchmark feature pool and return its ids
async fn setup_features(server_addr: &str, count: usize) -> Result<Vec<u64>, Box<dyn std::error::Error>> {
    let mut client = Client::connect(server_addr).await?;
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let title = format!("bench_feature_{}", i);
        let description = format!("benchmark feature number {}", i);
        let feature = client.add(&title, &description, "").await?;
        ids.push(feature.id);
    }

    client.close().await?;
    Ok(ids)
}

async fn run_single_client_benchmarks(server_addr: &str, feature_ids: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running single client benchmarks...");

    // GET benchmark
    let get_results = benchmark_get_operations(server_addr, feature_ids, 10000).await?;
    get_results.print();

    // LIST benchmark
    let list_results = benchmark_list_operations(server_addr, 1000).await?;
    list_results.print();

    // VOTE benchmark
    let vote_results = benchmark_vote_operations(server_addr, feature_ids, 10000).await?;
    vote_results.print();

    // Mixed workload benchmark
    let mixed_results = benchmark_mixed_workload(server_addr, feature_ids, 10000).await?;
    mixed_results.print();

    Ok(())
}

async fn run_concurrent_benchmarks(server_addr: &str, contended_id: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running concurrent client benchmarks...");

    // All clients vote on the same feature, so every operation takes the
    // write lock on the same record
    for num_clients in [10, 50, 100] {
        let results = benchmark_concurrent_votes(server_addr, contended_id, num_clients, 1000).await?;
        results.print();
    }

    Ok(())
}

async fn benchmark_get_operations(
    server_addr: &str,
    feature_ids: &[u64],
    num_operations: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let mut client = Client::connect(server_addr).await?;
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for i in 0..num_operations {
        let id = feature_ids[i % feature_ids.len()];

        let op_start = Instant::now();
        let _feature = client.get(id).await?;
        let op_duration = op_start.elapsed();

        latencies.push(op_duration);
    }

    let total_duration = start.elapsed();
    client.close().await?;

    Ok(BenchmarkResults::new(
        "GET".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

async fn benchmark_list_operations(
    server_addr: &str,
    num_operations: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let mut client = Client::connect(server_addr).await?;
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for _ in 0..num_operations {
        let op_start = Instant::now();
        let _summaries = client.list().await?;
        let op_duration = op_start.elapsed();

        latencies.push(op_duration);
    }

    let total_duration = start.elapsed();
    client.close().await?;

    Ok(BenchmarkResults::new(
        "LIST".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

async fn benchmark_vote_operations(
    server_addr: &str,
    feature_ids: &[u64],
    num_operations: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let mut client = Client::connect(server_addr).await?;
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for i in 0..num_operations {
        let id = feature_ids[i % feature_ids.len()];

        let op_start = Instant::now();
        let _feature = client.vote(id).await?;
        let op_duration = op_start.elapsed();

        latencies.push(op_duration);
    }

    let total_duration = start.elapsed();
    client.close().await?;

    Ok(BenchmarkResults::new(
        "VOTE".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

async fn benchmark_mixed_workload(
    server_addr: &str,
    feature_ids: &[u64],
    num_operations: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let mut client = Client::connect(server_addr).await?;
    let mut latencies = Vec::with_capacity(num_operations);

    let start = Instant::now();

    for i in 0..num_operations {
        let id = feature_ids[i % feature_ids.len()];

        let op_start = Instant::now();

        match i % 10 {
            0..=6 => {
                // 70% GET operations
                let _feature = client.get(id).await?;
            }
            7..=8 => {
                // 20% VOTE operations
                let _feature = client.vote(id).await?;
            }
            9 => {
                // 10% LIST operations
                let _summaries = client.list().await?;
            }
            _ => unreachable!(),
        }

        let op_duration = op_start.elapsed();
        latencies.push(op_duration);
    }

    let total_duration = start.elapsed();
    client.close().await?;

    Ok(BenchmarkResults::new(
        "Mixed Workload".to_string(),
        num_operations,
        total_duration,
        &mut latencies,
    ))
}

async fn benchmark_concurrent_votes(
    server_addr: &str,
    feature_id: u64,
    num_clients: usize,
    ops_per_client: usize,
) -> Result<BenchmarkResults, Box<dyn std::error::Error>> {
    let semaphore = Arc::new(Semaphore::new(num_clients));
    let mut handles = Vec::new();
    let mut all_latencies = Vec::new();

    let start = Instant::now();

    for _client_id in 0..num_clients {
        let semaphore = Arc::clone(&semaphore);
        let server_addr = server_addr.to_string();

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire().await.unwrap();
            let mut client = Client::connect(&server_addr).await.map_err(|e| format!("Connect error: {}", e))?;
            let mut latencies = Vec::with_capacity(ops_per_client);

            for _ in 0..ops_per_client {
                let op_start = Instant::now();
                client.vote(feature_id).await.map_err(|e| format!("Vote error: {}", e))?;
                let op_duration = op_start.elapsed();

                latencies.push(op_duration);
            }

            client.close().await.map_err(|e| format!("Close error: {}", e))?;
            Ok::<Vec<Duration>, String>(latencies)
        });

        handles.push(handle);
    }

    // Collect results from all clients
    for handle in handles {
        let latencies = handle.await.map_err(|e| format!("Join error: {}", e))?.map_err(|e| format!("Task error: {}", e))?;
        all_latencies.extend(latencies);
    }

    let total_duration = start.elapsed();
    let total_operations = num_clients * ops_per_client;

    Ok(BenchmarkResults::new(
        format!("Concurrent votes ({} clients)", num_clients),
        total_operations,
        total_duration,
        &mut all_latencies,
    ))
}
