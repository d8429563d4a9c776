use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use std::{hint, process};

use clap::Parser;
use isoalloc_cli::{App, Command, CSV_HEADER};
use isoalloc_core::template::format_template_set;
use isoalloc_core::{
    allocate, find_critical_cycle, GraphConfig, StaticDependencyGraph, TemplateSet,
};
use isoalloc_testgen::generator::WorkloadParams;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Allocate(args) => allocate_workload(args),
        Command::Benchmark(args) => benchmark(args),
        Command::Generate(args) => generate(args),
        Command::Verify(args) => verify(args),
        Command::Schema => schema(),
    }
}

fn read_workload(path: &Path) -> TemplateSet {
    let display = path.display();
    let file = fs::File::open(path).unwrap_or_else(|e| {
        eprintln!("Failed to open {display}: {e}");
        process::exit(1);
    });
    serde_json::from_reader(std::io::BufReader::new(file)).unwrap_or_else(|e| {
        eprintln!("Failed to parse {display}: {e}");
        process::exit(1);
    })
}

fn allocate_workload(args: &isoalloc_cli::AllocateArgs) {
    let templates = read_workload(&args.input);
    if templates.is_empty() {
        eprintln!("No templates found in {}", args.input.display());
        process::exit(1);
    }

    let allocated = allocate(&templates);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", parent.display());
            process::exit(1);
        });
    }
    let file = fs::File::create(&args.output).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {e}", args.output.display());
        process::exit(1);
    });
    serde_json::to_writer_pretty(file, &allocated).unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {e}", args.output.display());
        process::exit(1);
    });

    println!("Allocation completed successfully.");
    println!("  Input:  {}", args.input.display());
    println!("  Output: {}", args.output.display());
    println!("  Allocated {} templates", allocated.len());
}

fn benchmark(args: &isoalloc_cli::BenchmarkArgs) {
    let file_name = args
        .workload
        .file_name()
        .unwrap_or_default()
        .to_string_lossy();
    let params = WorkloadParams::from_file_name(&file_name).unwrap_or_else(|| {
        eprintln!("Cannot read workload parameters from file name {file_name}");
        process::exit(1);
    });
    let templates = read_workload(&args.workload);

    for _ in 0..args.warmups {
        hint::black_box(allocate(hint::black_box(&templates)));
    }

    let mut total = Duration::ZERO;
    for _ in 0..args.iterations {
        let start = Instant::now();
        hint::black_box(allocate(hint::black_box(&templates)));
        total += start.elapsed();
    }
    let avg_time_ms = total.as_secs_f64() * 1000.0 / f64::from(args.iterations);

    let is_new = !args.output_csv.exists();
    let mut csv = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.output_csv)
        .unwrap_or_else(|e| {
            eprintln!("Failed to open {}: {e}", args.output_csv.display());
            process::exit(1);
        });
    let written = if is_new {
        writeln!(csv, "{CSV_HEADER}")
    } else {
        Ok(())
    }
    .and_then(|()| writeln!(csv, "{}", isoalloc_cli::csv_row(&params, avg_time_ms)));
    written.unwrap_or_else(|e| {
        eprintln!("Failed to write {}: {e}", args.output_csv.display());
        process::exit(1);
    });

    println!("Benchmark completed: {file_name} -> {avg_time_ms:.4} ms");
}

fn generate(args: &isoalloc_cli::GenerateArgs) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let workloads =
        isoalloc_testgen::generator::generate_mult_workloads(args.cases, &args.params())
            .unwrap_or_else(|e| {
                eprintln!("Invalid workload parameters: {e}");
                process::exit(1);
            });

    for workload in &workloads {
        let path = args.output_dir.join(workload.file_name());
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::to_writer_pretty(file, workload).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
    }

    println!(
        "Generated {} workloads to {}",
        workloads.len(),
        args.output_dir.display()
    );
}

fn verify(args: &isoalloc_cli::VerifyArgs) {
    let config = GraphConfig {
        prune_read_only: args.prune_read_only,
    };
    let mut any_failed = false;

    let files = isoalloc_cli::workload_files(&args.input).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", args.input.display());
        process::exit(1);
    });

    if files.is_empty() {
        eprintln!("No .json files found in {}", args.input.display());
        process::exit(1);
    }

    for path in files {
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        let templates = read_workload(&path);
        let graph = StaticDependencyGraph::with_config(&templates, config);

        match find_critical_cycle(&graph) {
            Ok(None) => {
                if args.json {
                    let result = serde_json::json!({
                        "file": filename,
                        "ok": true,
                    });
                    println!("{result}");
                } else if args.verbose {
                    println!("{filename}: PASS");
                    for line in format_template_set(&templates).lines() {
                        println!("  {line}");
                    }
                } else {
                    println!("{filename}: PASS");
                }
            }
            Ok(Some(cycle)) => {
                any_failed = true;
                if args.json {
                    let result = serde_json::json!({
                        "file": filename,
                        "ok": false,
                        "cycle": cycle,
                    });
                    println!("{result}");
                } else if args.verbose {
                    println!("{filename}: FAIL");
                    println!("  {} under {}", templates[cycle.p2], cycle.level);
                    println!("  closed by {}", templates[cycle.p1]);
                    println!("  anti-dependency to {}", templates[cycle.p3]);
                } else {
                    println!(
                        "{filename}: FAIL ({} -> {} -RW-> {} under {})",
                        templates[cycle.p1].name(),
                        templates[cycle.p2].name(),
                        templates[cycle.p3].name(),
                        cycle.level
                    );
                }
            }
            Err(e) => {
                any_failed = true;
                if args.json {
                    let result = serde_json::json!({
                        "file": filename,
                        "ok": false,
                        "error": e.to_string(),
                    });
                    println!("{result}");
                } else {
                    println!("{filename}: ERROR ({e})");
                }
            }
        }
    }

    if any_failed {
        process::exit(1);
    }
}

fn schema() {
    let schema = schemars::schema_for!(TemplateSet);
    let json = serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
        eprintln!("Failed to serialize schema: {e}");
        process::exit(1);
    });
    println!("{json}");
}
