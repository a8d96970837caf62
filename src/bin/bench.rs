//! farmprint benchmark harness
//! Compares fingerprint64 against SHA-256 with fair, reproducible tests

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

struct BenchConfig {
    file: Option<PathBuf>,
    size: usize,
    keys: usize,
    key_len: usize,
    repeat: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            file: None,
            size: 100_000_000, // 100 MB default
            keys: 1_000_000,   // small-key batch run
            key_len: 24,       // typical id length
            repeat: 3,
        }
    }
}

struct BenchResult {
    algorithm: String,
    size: usize,
    mb_per_sec: f64,
    digest_hex: String,
}

fn parse_args() -> BenchConfig {
    let mut config = BenchConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                i += 1;
                config.file = Some(PathBuf::from(&args[i]));
            }
            "--size" => {
                i += 1;
                config.size = args[i].parse().expect("Invalid size");
            }
            "--keys" => {
                i += 1;
                config.keys = args[i].parse().expect("Invalid key count");
            }
            "--key-len" => {
                i += 1;
                config.key_len = args[i].parse().expect("Invalid key length");
            }
            "--repeat" => {
                i += 1;
                config.repeat = args[i].parse().expect("Invalid repeat count");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn load_or_generate_data(config: &BenchConfig) -> Vec<u8> {
    if let Some(path) = &config.file {
        println!("📂 Loading file: {}", path.display());
        let mut file = File::open(path).expect("Failed to open file");
        let mut data = Vec::new();
        file.read_to_end(&mut data).expect("Failed to read file");
        println!(
            "   Loaded {} bytes ({:.2} MB)",
            data.len(),
            data.len() as f64 / 1_000_000.0
        );
        data
    } else {
        println!(
            "🎲 Generating random data: {} bytes ({} MB)",
            config.size,
            config.size / 1_000_000
        );
        // Fast pseudo-random generation (not secure, just for benchmarking)
        let mut data = vec![0u8; config.size];
        let mut rng_state = 0x123456789abcdef0u64;
        for chunk in data.chunks_mut(8) {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let bytes = rng_state.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        data
    }
}

fn generate_keys(count: usize, key_len: usize) -> Vec<Vec<u8>> {
    let mut rng_state = 0xfeedface0badf00du64;
    (0..count)
        .map(|_| {
            let mut key = vec![0u8; key_len];
            for chunk in key.chunks_mut(8) {
                rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let bytes = rng_state.to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
            key
        })
        .collect()
}

fn bench_sha256(data: &[u8]) -> (f64, String) {
    let start = Instant::now();
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let elapsed = start.elapsed().as_secs_f64();
    let mb_per_sec = (data.len() as f64 / 1_000_000.0) / elapsed;
    let digest = hex::encode(&result[..8]); // First 8 bytes for display

    (mb_per_sec, digest)
}

fn bench_fingerprint_oneshot(data: &[u8]) -> (f64, String) {
    let start = Instant::now();
    let fp = farmprint::fingerprint64(data);
    let elapsed = start.elapsed().as_secs_f64();
    let mb_per_sec = (data.len() as f64 / 1_000_000.0) / elapsed;
    let digest = hex::encode(fp.to_be_bytes());

    (mb_per_sec, digest)
}

fn bench_fingerprint_batch(keys: &[Vec<u8>]) -> (f64, String) {
    let total_bytes: usize = keys.iter().map(|k| k.len()).sum();
    let start = Instant::now();
    let fps = farmprint::fingerprint64_batch(keys);
    let elapsed = start.elapsed().as_secs_f64();
    let mb_per_sec = (total_bytes as f64 / 1_000_000.0) / elapsed;
    // fold the batch into one display digest so runs are comparable
    let combined = fps.iter().fold(0u64, |acc, fp| acc ^ fp);
    let digest = hex::encode(combined.to_be_bytes());

    (mb_per_sec, digest)
}

fn median_of(mut speeds: Vec<f64>) -> f64 {
    speeds.sort_by(|a, b| a.partial_cmp(b).unwrap());
    speeds[speeds.len() / 2]
}

fn run_benchmark(config: &BenchConfig, data: &[u8], keys: &[Vec<u8>]) -> Vec<BenchResult> {
    let mut results = Vec::new();

    println!("\n🔥 BENCHMARK CONFIGURATION");
    println!(
        "   Data size: {} bytes ({:.2} MB)",
        data.len(),
        data.len() as f64 / 1_000_000.0
    );
    println!("   Keys: {} x {} bytes", config.keys, config.key_len);
    println!("   Repeats: {}", config.repeat);
    println!();

    // Warm-up
    print!("🔧 Warming up... ");
    std::io::stdout().flush().unwrap();
    let _ = bench_sha256(data);
    let _ = bench_fingerprint_oneshot(data);
    println!("done\n");

    // SHA-256 baseline
    println!("📊 Running SHA-256 (baseline)...");
    let mut sha_speeds = Vec::new();
    for i in 0..config.repeat {
        print!("   Run {}/{}: ", i + 1, config.repeat);
        std::io::stdout().flush().unwrap();
        let (speed, digest) = bench_sha256(data);
        sha_speeds.push(speed);
        println!("{:.2} MB/s (digest: {}...)", speed, &digest[..16]);
        if i == 0 {
            results.push(BenchResult {
                algorithm: "SHA-256".to_string(),
                size: data.len(),
                mb_per_sec: speed,
                digest_hex: digest,
            });
        }
    }
    let sha_median = median_of(sha_speeds);
    println!("   Median: {:.2} MB/s\n", sha_median);

    // fingerprint64 one-shot on the large buffer
    println!("📊 Running fingerprint64 (one-shot)...");
    let mut fp_speeds = Vec::new();
    for i in 0..config.repeat {
        print!("   Run {}/{}: ", i + 1, config.repeat);
        std::io::stdout().flush().unwrap();
        let (speed, digest) = bench_fingerprint_oneshot(data);
        fp_speeds.push(speed);
        println!("{:.2} MB/s (fp: {})", speed, digest);
        if i == 0 {
            results.push(BenchResult {
                algorithm: "fingerprint64".to_string(),
                size: data.len(),
                mb_per_sec: speed,
                digest_hex: digest,
            });
        }
    }
    let fp_median = median_of(fp_speeds);
    println!(
        "   Median: {:.2} MB/s ({:.2}x SHA-256)\n",
        fp_median,
        fp_median / sha_median
    );

    // many small keys, batched (rayon above the threshold)
    println!("📊 Running fingerprint64 (batch, {} keys)...", keys.len());
    let mut batch_speeds = Vec::new();
    for i in 0..config.repeat {
        print!("   Run {}/{}: ", i + 1, config.repeat);
        std::io::stdout().flush().unwrap();
        let (speed, digest) = bench_fingerprint_batch(keys);
        batch_speeds.push(speed);
        println!("{:.2} MB/s (xor-fold: {})", speed, digest);
        if i == 0 {
            results.push(BenchResult {
                algorithm: "fingerprint64-batch".to_string(),
                size: keys.len() * config.key_len,
                mb_per_sec: speed,
                digest_hex: digest,
            });
        }
    }
    let batch_median = median_of(batch_speeds);
    println!("   Median: {:.2} MB/s\n", batch_median);

    results
}

fn print_results_table(results: &[BenchResult]) {
    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║                  BENCHMARK RESULTS                    ║");
    println!("╠═══════════════════════════════════════════════════════╣");
    println!("║ Algorithm           │     Bytes │    MB/s │ Speedup   ║");
    println!("╠═══════════════════════════════════════════════════════╣");

    let baseline = results[0].mb_per_sec;
    for result in results {
        let speedup = result.mb_per_sec / baseline;
        println!(
            "║ {:19} │ {:9} │ {:7.2} │ {:6.2}x   ║",
            result.algorithm, result.size, result.mb_per_sec, speedup
        );
    }

    println!("╚═══════════════════════════════════════════════════════╝\n");
}

fn append_to_csv(results: &[BenchResult]) {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let file_exists = std::path::Path::new("bench_results.csv").exists();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("bench_results.csv")
        .expect("Failed to open CSV file");

    if !file_exists {
        writeln!(file, "algorithm,size,mb_s,digest,timestamp").expect("Failed to write CSV header");
    }

    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{},{}",
            result.algorithm, result.size, result.mb_per_sec, result.digest_hex, timestamp
        )
        .expect("Failed to write CSV row");
    }

    println!("✅ Results appended to bench_results.csv");
}

fn main() {
    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║                    FARMPRINT v0.1                     ║");
    println!("║        Deterministic Fingerprint Benchmark            ║");
    println!("║                                                       ║");
    println!("║   ⚠️  NOT CRYPTOGRAPHICALLY SECURE ⚠️                   ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    let config = parse_args();
    let data = load_or_generate_data(&config);
    let keys = generate_keys(config.keys, config.key_len);
    let results = run_benchmark(&config, &data, &keys);

    print_results_table(&results);
    append_to_csv(&results);

    println!("\n🎉 Benchmark complete!");
    println!("\nNext steps:");
    println!("  1. Try larger buffers: --size 1000000000 (1 GB)");
    println!("  2. Experiment with: --keys <n> --key-len <bytes>");
    println!();
}
