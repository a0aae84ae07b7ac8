#![forbid(unsafe_code)]
//! Proximity search and directory benchmarks for geonear.
//!
//! Scenarios:
//! - `scan`: full proximity search (box filter, distance, sort, page) over a
//!   synthetic population clustered around one origin
//! - `directory`: register + location update throughput

use std::env;
use std::process;
use std::time::{Duration, Instant};

use geonear_core::{Paginator, ProximitySearch, SearchRequest, UserDirectory};

mod directory_bench;

const DEFAULT_POPULATION: usize = 50_000;
const DEFAULT_RADIUS_KM: f64 = 100.0;
const SPREAD_DEGREES: f64 = 5.0;
const ORIGIN: (f64, f64) = (50.0, 50.0);
const WARMUP_RUNS: usize = 8;
const MEASURED_RUNS: usize = 50;
const PAGE_LIMIT: usize = 100;

fn main() {
    if cfg!(debug_assertions) && env::var("GEONEAR_ALLOW_DEBUG_BENCH").as_deref() != Ok("1") {
        eprintln!(
            "error=debug_build_not_allowed message=\"run `cargo run --release -p geonear-bench`\""
        );
        process::exit(2);
    }

    let mode = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    let scenario = env::var("GEONEAR_BENCH_SCENARIO").unwrap_or_else(|_| "all".to_string());
    let ok = match scenario.as_str() {
        "all" => run_scan_bench(mode) && directory_bench::run_directory_bench(mode),
        "scan" => run_scan_bench(mode),
        "directory" => directory_bench::run_directory_bench(mode),
        _ => {
            eprintln!(
                "error=invalid_scenario scenario=\"{}\" allowed=\"all,scan,directory\"",
                scenario
            );
            false
        }
    };

    if !ok {
        process::exit(1);
    }
}

fn run_scan_bench(mode: &str) -> bool {
    let population = read_usize_env_with_min("GEONEAR_BENCH_POPULATION", DEFAULT_POPULATION, 1);
    let radius_km = read_f64_env("GEONEAR_BENCH_RADIUS_KM", DEFAULT_RADIUS_KM);

    let Some(directory) = build_population(population) else {
        return false;
    };
    let search = ProximitySearch::new(directory, Paginator::new(PAGE_LIMIT));
    let request = SearchRequest {
        owner_id: 0,
        page: 1,
        limit: PAGE_LIMIT,
        distance_km: radius_km,
    };

    for _ in 0..WARMUP_RUNS {
        if run_scan_once(&search, request).is_none() {
            return false;
        }
    }

    let mut elapsed_samples = Vec::with_capacity(MEASURED_RUNS);
    let mut total_duration = Duration::from_secs(0);
    let mut last_total = 0usize;
    let mut last_nearest_km = f64::NAN;

    for _ in 0..MEASURED_RUNS {
        let Some((elapsed, total, nearest_km)) = run_scan_once(&search, request) else {
            return false;
        };
        elapsed_samples.push(elapsed.as_secs_f64() * 1_000.0);
        total_duration += elapsed;
        last_total = total;
        last_nearest_km = nearest_km;
    }

    let (p50_ms, p95_ms, avg_ms) = summarize_ms(&elapsed_samples);
    let qps = MEASURED_RUNS as f64 / total_duration.as_secs_f64();

    println!(
        "bench=proximity_scan mode={mode} population={population} radius_km={radius_km} warmup_runs={WARMUP_RUNS} measured_runs={MEASURED_RUNS} p50_ms={p50_ms:.6} p95_ms={p95_ms:.6} avg_ms={avg_ms:.6} qps={qps:.2} total={last_total} nearest_km={last_nearest_km:.6}"
    );

    true
}

fn run_scan_once(
    search: &ProximitySearch<UserDirectory>,
    request: SearchRequest,
) -> Option<(Duration, usize, f64)> {
    let started_at = Instant::now();
    let page = match search.search(request) {
        Ok(page) => page,
        Err(error) => {
            eprintln!("error=search_failed detail=\"{error}\"");
            return None;
        }
    };
    let nearest_km = page
        .results
        .first()
        .map_or(f64::NAN, |hit| hit.distance_km);

    Some((started_at.elapsed(), page.total, nearest_km))
}

/// Owner 0 sits at the origin; everyone else is scattered within
/// `SPREAD_DEGREES` of it.
fn build_population(population: usize) -> Option<UserDirectory> {
    let mut directory = UserDirectory::new();
    for id in 0..=population as u64 {
        let (latitude, longitude) = if id == 0 {
            ORIGIN
        } else {
            (
                ORIGIN.0 + (deterministic_unit(id * 2) - 0.5) * 2.0 * SPREAD_DEGREES,
                ORIGIN.1 + (deterministic_unit(id * 2 + 1) - 0.5) * 2.0 * SPREAD_DEGREES,
            )
        };
        if let Err(error) =
            directory.register_user(id, format!("user{id}"), format!("user{id}@bench.local"), true)
        {
            eprintln!("error=register_failed id={id} detail=\"{error}\"");
            return None;
        }
        if let Err(error) = directory.update_location(id, latitude, longitude) {
            eprintln!("error=update_location_failed id={id} detail=\"{error}\"");
            return None;
        }
    }
    Some(directory)
}

pub(crate) fn summarize_ms(samples_ms: &[f64]) -> (f64, f64, f64) {
    let p50_ms = percentile_ms(samples_ms, 0.50);
    let p95_ms = percentile_ms(samples_ms, 0.95);
    let avg_ms = samples_ms.iter().sum::<f64>() / samples_ms.len() as f64;
    (p50_ms, p95_ms, avg_ms)
}

fn percentile_ms(samples_ms: &[f64], quantile: f64) -> f64 {
    if samples_ms.is_empty() {
        return 0.0;
    }

    let mut sorted = samples_ms.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last_index = sorted.len().saturating_sub(1);
    let position = (quantile.clamp(0.0, 1.0) * last_index as f64).round() as usize;
    sorted[position]
}

/// Maps `seed` to a value in `[0, 1)` with a splitmix64 step.
pub(crate) fn deterministic_unit(seed: u64) -> f64 {
    let mut mixed = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^= mixed >> 31;
    (mixed >> 11) as f64 / (1u64 << 53) as f64
}

pub(crate) fn read_usize_env_with_min(key: &str, default: usize, min: usize) -> usize {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    let Ok(parsed) = raw.parse::<usize>() else {
        return default;
    };
    if parsed < min {
        default
    } else {
        parsed
    }
}

fn read_f64_env(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(default)
}
