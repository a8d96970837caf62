//! Bucket accuracy checker
//! Recomputes experiment buckets for a CSV export and compares them against
//! the expected assignments produced by the SQL side.
//!
//! The CSV's first column is the id and its last column the expected bucket
//! (0..N-1); intermediate columns and the header row are ignored.

use std::path::PathBuf;

struct AccuracyConfig {
    csv: PathBuf,
    experiment: String,
    salt: String,
    buckets: u64,
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("test.csv"),
            experiment: "test:1".to_string(),
            salt: "salt-2025".to_string(),
            buckets: 100,
        }
    }
}

fn parse_args() -> AccuracyConfig {
    let mut config = AccuracyConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--experiment" => {
                i += 1;
                config.experiment = args[i].clone();
            }
            "--salt" => {
                i += 1;
                config.salt = args[i].clone();
            }
            "--buckets" => {
                i += 1;
                config.buckets = args[i].parse().expect("Invalid bucket count");
            }
            other if !other.starts_with("--") => {
                config.csv = PathBuf::from(other);
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

fn main() {
    let config = parse_args();

    let content = match std::fs::read_to_string(&config.csv) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read CSV at {}: {}", config.csv.display(), err);
            std::process::exit(1);
        }
    };

    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        println!("No rows to evaluate.");
        return;
    };
    println!("Using CSV header: {}", header);

    let mut total = 0usize;
    let mut matches = 0usize;

    for line in lines {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 2 {
            continue;
        }
        let id = parts[0].trim();
        let Ok(expected) = parts[parts.len() - 1].trim().parse::<u64>() else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        let predicted =
            farmprint::bucket::salted_bucket(id, &config.experiment, &config.salt, config.buckets);
        if predicted == expected {
            matches += 1;
        }
        total += 1;
        println!("id={} expected={} predicted={}", id, expected, predicted);
    }

    if total == 0 {
        println!("No valid rows processed.");
        return;
    }

    let accuracy = matches as f64 / total as f64 * 100.0;
    println!("\nMatches: {}/{}  Accuracy: {:.2}%", matches, total, accuracy);
}
