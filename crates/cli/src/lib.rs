//! isoalloc CLI -- allocate, benchmark, generate and verify workloads of
//! transaction templates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use isoalloc_testgen::generator::WorkloadParams;

#[derive(Debug, Parser)]
#[command(
    name = "isoalloc",
    about = "Static isolation-level allocation for transaction templates"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assign an isolation level to every template of a workload
    Allocate(AllocateArgs),
    /// Time allocation of a generated workload and append the result to a CSV file
    Benchmark(BenchmarkArgs),
    /// Generate random workloads
    Generate(GenerateArgs),
    /// Check allocated workloads for critical cycles
    Verify(VerifyArgs),
    /// Print the JSON Schema for the workload format to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct AllocateArgs {
    /// Input workload JSON file
    pub input: PathBuf,
    /// Output file for the allocated workload; parent directories are created
    pub output: PathBuf,
}

#[derive(Debug, Parser)]
pub struct BenchmarkArgs {
    /// Workload file named `workload_{n}t_{ops}o_{keys}k_{ro}r_{case}.json`
    pub workload: PathBuf,
    /// CSV file to append the timing row to
    pub output_csv: PathBuf,
    /// Untimed allocations before measuring
    #[arg(long, default_value_t = 3)]
    pub warmups: u32,
    /// Timed allocations to average over
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: u32,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of templates per workload
    #[arg(long)]
    pub n_template: u64,
    /// Maximum number of operations per template
    #[arg(long)]
    pub max_ops: u64,
    /// Number of distinct keys
    #[arg(long)]
    pub max_key: u64,
    /// Percentage of read-only templates
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=100))]
    pub read_only: u64,
    /// Number of workloads to generate
    #[arg(long, default_value_t = 1)]
    pub cases: u64,
    /// Seed for reproducible workloads
    #[arg(long)]
    pub seed: Option<u64>,
    /// Output directory for generated workload files
    #[arg(long)]
    pub output_dir: PathBuf,
}

impl GenerateArgs {
    #[must_use]
    pub fn params(&self) -> WorkloadParams {
        WorkloadParams::builder()
            .n_template(self.n_template)
            .max_ops(self.max_ops)
            .max_key(self.max_key)
            .read_only_percent(self.read_only)
            .seed(self.seed)
            .build()
    }
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Allocated workload file, or a directory of workload JSON files
    pub input: PathBuf,
    /// Ignore paths through read-only templates
    #[arg(long)]
    pub prune_read_only: bool,
    /// Print the allocation on PASS and the cycle's templates on FAIL
    #[arg(long)]
    pub verbose: bool,
    /// Output results as JSON (one object per file)
    #[arg(long)]
    pub json: bool,
}

pub const CSV_HEADER: &str =
    "template_count,op_per_template,max_key,read_only_percent,case_num,avg_time_ms";

/// One benchmark CSV row, without the line terminator.
#[must_use]
pub fn csv_row(params: &WorkloadParams, avg_time_ms: f64) -> String {
    format!(
        "{},{},{},{},{},{avg_time_ms:.4}",
        params.n_template,
        params.max_ops,
        params.max_key,
        params.read_only_percent,
        params.case_num,
    )
}

/// `path` itself if it is a file, otherwise the `.json` files directly
/// inside it, sorted by path.
///
/// # Errors
///
/// Returns an error if `path` does not exist or the directory cannot be read.
pub fn workload_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    if !fs::metadata(path)?.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<_> = fs::read_dir(path)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        App::command().debug_assert();
    }

    #[test]
    fn test_benchmark_defaults() {
        let app = App::try_parse_from(["isoalloc", "benchmark", "w.json", "out.csv"]).unwrap();
        let Command::Benchmark(args) = app.command else {
            panic!("expected benchmark");
        };
        assert_eq!(args.warmups, 3);
        assert_eq!(args.iterations, 10);
        assert_eq!(args.output_csv, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_benchmark_needs_an_iteration() {
        assert!(App::try_parse_from([
            "isoalloc",
            "benchmark",
            "w.json",
            "out.csv",
            "--iterations",
            "0"
        ])
        .is_err());
    }

    #[test]
    fn test_generate_params() {
        let app = App::try_parse_from([
            "isoalloc",
            "generate",
            "--n-template",
            "100",
            "--max-ops",
            "5",
            "--max-key",
            "50",
            "--read-only",
            "20",
            "--output-dir",
            "data",
        ])
        .unwrap();
        let Command::Generate(args) = app.command else {
            panic!("expected generate");
        };
        assert_eq!(args.cases, 1);
        assert_eq!(args.params().with_case(3).file_name(), "workload_100t_5o_50k_20r_3.json");
    }

    #[test]
    fn test_read_only_is_a_percentage() {
        assert!(App::try_parse_from([
            "isoalloc",
            "generate",
            "--n-template",
            "1",
            "--max-ops",
            "1",
            "--max-key",
            "1",
            "--read-only",
            "101",
            "--output-dir",
            "data",
        ])
        .is_err());
    }

    #[test]
    fn test_csv_row() {
        let params = WorkloadParams::from_file_name("workload_100t_5o_50k_20r_3.json").unwrap();
        assert_eq!(csv_row(&params, 1.5), "100,5,50,20,3,1.5000");
        assert_eq!(CSV_HEADER.split(',').count(), csv_row(&params, 0.0).split(',').count());
    }

    #[test]
    fn test_workload_files() {
        let dir = std::env::temp_dir().join(format!("isoalloc-cli-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested.json")).unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.join(name), "{}").unwrap();
        }

        let files = workload_files(&dir).unwrap();
        assert_eq!(files, vec![dir.join("a.json"), dir.join("b.json")]);
        assert_eq!(
            workload_files(&dir.join("notes.txt")).unwrap(),
            vec![dir.join("notes.txt")]
        );
        assert!(workload_files(&dir.join("missing")).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
