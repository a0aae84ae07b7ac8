use std::time::{Duration, Instant};

use geonear_core::UserDirectory;

use crate::{deterministic_unit, read_usize_env_with_min, summarize_ms};

const DEFAULT_USERS: usize = 10_000;
const WARMUP_RUNS: usize = 3;
const MEASURED_RUNS: usize = 15;

pub(crate) fn run_directory_bench(mode: &str) -> bool {
    let users = read_usize_env_with_min("GEONEAR_BENCH_DIRECTORY_USERS", DEFAULT_USERS, 1);

    for _ in 0..WARMUP_RUNS {
        if run_directory_once(users).is_none() {
            return false;
        }
    }

    let mut register_ms = Vec::with_capacity(MEASURED_RUNS);
    let mut locate_ms = Vec::with_capacity(MEASURED_RUNS);
    let mut total_register = Duration::from_secs(0);
    let mut total_locate = Duration::from_secs(0);
    let mut located = 0usize;

    for _ in 0..MEASURED_RUNS {
        let Some((register_elapsed, locate_elapsed, sample_located)) = run_directory_once(users)
        else {
            return false;
        };
        register_ms.push(register_elapsed.as_secs_f64() * 1_000.0);
        locate_ms.push(locate_elapsed.as_secs_f64() * 1_000.0);
        total_register += register_elapsed;
        total_locate += locate_elapsed;
        located = sample_located;
    }

    let (register_p50_ms, register_p95_ms, register_avg_ms) = summarize_ms(&register_ms);
    let (locate_p50_ms, locate_p95_ms, locate_avg_ms) = summarize_ms(&locate_ms);
    let ops = (MEASURED_RUNS * users) as f64;
    let register_qps = ops / total_register.as_secs_f64();
    let locate_qps = ops / total_locate.as_secs_f64();

    println!(
        "bench=directory_writes mode={mode} users={users} warmup_runs={WARMUP_RUNS} measured_runs={MEASURED_RUNS} register_p50_ms={register_p50_ms:.6} register_p95_ms={register_p95_ms:.6} register_avg_ms={register_avg_ms:.6} register_qps={register_qps:.2} locate_p50_ms={locate_p50_ms:.6} locate_p95_ms={locate_p95_ms:.6} locate_avg_ms={locate_avg_ms:.6} locate_qps={locate_qps:.2} located={located}"
    );

    true
}

fn run_directory_once(users: usize) -> Option<(Duration, Duration, usize)> {
    let mut directory = UserDirectory::new();

    let register_started = Instant::now();
    for id in 0..users as u64 {
        if let Err(error) =
            directory.register_user(id, format!("user{id}"), format!("user{id}@bench.local"), true)
        {
            eprintln!("error=register_failed id={id} detail=\"{error}\"");
            return None;
        }
    }
    let register_elapsed = register_started.elapsed();

    let locate_started = Instant::now();
    for id in 0..users as u64 {
        let latitude = deterministic_unit(id * 2) * 180.0 - 90.0;
        let longitude = deterministic_unit(id * 2 + 1) * 360.0 - 180.0;
        if let Err(error) = directory.update_location(id, latitude, longitude) {
            eprintln!("error=update_location_failed id={id} detail=\"{error}\"");
            return None;
        }
    }
    let locate_elapsed = locate_started.elapsed();

    Some((register_elapsed, locate_elapsed, directory.located_len()))
}
