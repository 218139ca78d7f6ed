/// Benchmark runner for global resolution and chunk execution.
///
/// Compares running a precompiled chunk against compiling it every time.

extern crate lune;

use lune::runner::api::Interpreter;
use lune::runner::ds::value::Value;
use lune::runner::global::GlobalEnvironment;
use std::time::{Duration, Instant};

/// Compile and run `code` on every iteration.
fn run_benchmark_compiling(env: &GlobalEnvironment, name: &str, code: &str, iterations: u32) -> Duration {
    let start = Instant::now();

    for _ in 0..iterations {
        if let Err(e) = env.do_chunk_str(code, name, &[]) {
            panic!("benchmark {} failed: {}", name, e);
        }
    }

    start.elapsed()
}

/// Compile once, then run the same chunk on every iteration.
fn run_benchmark_precompiled(env: &GlobalEnvironment, name: &str, code: &str, iterations: u32) -> Duration {
    let chunk = env
        .compile(name, code, &[])
        .unwrap_or_else(|e| panic!("failed to compile benchmark {}: {}", name, e));

    let start = Instant::now();

    for _ in 0..iterations {
        if let Err(e) = env.execute(&chunk, vec![]) {
            panic!("benchmark {} failed: {}", name, e);
        }
    }

    start.elapsed()
}

fn fresh_env() -> GlobalEnvironment {
    let env = Interpreter::new().global();
    env.set_member("counter", Value::Integer(0)).unwrap();
    env
}

// ============================================================================
// Benchmark definitions
// ============================================================================

const BENCH_STORAGE_HIT: &str = r#"
counter = counter + 1
"#;

const BENCH_CORE_FALLBACK: &str = r#"
local a, b, c = type(1), tostring(2), select('#', 1, 2, 3)
"#;

const BENCH_LIBRARY_MEMBER: &str = r#"
local x = math.floor(3.5) + math.max(1, 2, 3) + string.len('lune')
"#;

const BENCH_INTEROP_CHAIN: &str = r#"
local n = clr.Bench.Deep.Namespace.Chain
"#;

const BENCH_TABLES: &str = r#"
local t = { 1, 2, 3, name = 'x' }
t[4] = t[1] + t[2] + t[3]
local n = rawlen(t)
"#;

fn main() {
    let iterations = 2000u32;

    let benchmarks: Vec<(&str, &str)> = vec![
        ("Storage hit", BENCH_STORAGE_HIT),
        ("Core function fallback", BENCH_CORE_FALLBACK),
        ("Library member", BENCH_LIBRARY_MEMBER),
        ("Interop chain", BENCH_INTEROP_CHAIN),
        ("Table constructor", BENCH_TABLES),
    ];

    println!("=======================================================");
    println!("  Global Environment Benchmarks ({} iterations)", iterations);
    println!("=======================================================\n");

    println!(
        "{:<30} {:>12} {:>12} {:>10}",
        "Benchmark", "Compiling", "Precompiled", "Speedup"
    );
    println!("{}", "-".repeat(70));

    let mut total_compiling = Duration::ZERO;
    let mut total_precompiled = Duration::ZERO;

    for (name, code) in &benchmarks {
        let compiling = run_benchmark_compiling(&fresh_env(), name, code, iterations);
        let precompiled = run_benchmark_precompiled(&fresh_env(), name, code, iterations);
        total_compiling += compiling;
        total_precompiled += precompiled;
        let speedup = compiling.as_secs_f64() / precompiled.as_secs_f64();
        println!(
            "{:<30} {:>12.2?} {:>12.2?} {:>9.2}x",
            name, compiling, precompiled, speedup
        );
    }

    println!("{}", "-".repeat(70));
    let total_speedup = total_compiling.as_secs_f64() / total_precompiled.as_secs_f64();
    println!(
        "{:<30} {:>12.2?} {:>12.2?} {:>9.2}x",
        "TOTAL", total_compiling, total_precompiled, total_speedup
    );

    // Verify correctness
    println!("\n=======================================================");
    println!("  Correctness Verification");
    println!("=======================================================\n");

    let env = fresh_env();
    let chunk = env.compile("verify", BENCH_STORAGE_HIT, &[]).unwrap();
    for _ in 0..iterations {
        env.execute(&chunk, vec![]).unwrap();
    }
    let counter = env.get_member("counter").unwrap();
    let status = if counter == Value::Integer(iterations as i32) { "✓" } else { "✗" };
    println!("{:<20} {:>12} {:>4} {:>12}", "Storage hit", iterations, status, counter);
    println!("{:<20} {:>12} {:>4} {:>12}", "Proxy nodes", "", "", env.interop_tree().node_count());
}
