use clap::{Parser, ValueEnum};
use snafu::prelude::*;
use spkmeans::text_io::{self, ReadMatrixError};
use spkmeans::{Matrix, build_ddg, build_laplacian, build_wam, jacobi};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const GENERIC_ERROR: &str = "An Error Has Occurred";

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Goal {
    /// Full spectral k-means: initial centroid indices, then final centroids
    Spk,
    /// Weighted adjacency matrix
    Wam,
    /// Diagonal degree matrix
    Ddg,
    /// Normalized graph Laplacian
    Gl,
    /// Eigenvalues, then eigenvectors as columns, of a symmetric matrix
    Jacobi,
}

#[derive(Parser)]
#[command(version, about = "Spectral clustering of comma-separated points")]
struct Args {
    /// Number of clusters; picked with the eigengap heuristic when omitted
    #[arg(short, long)]
    k: Option<usize>,

    /// Lloyd iteration cap
    #[arg(long, default_value_t = spkmeans::MAX_ITER)]
    max_iter: usize,

    /// Lloyd convergence threshold on centroid movement
    #[arg(long, default_value_t = spkmeans::CONVERGENCE_TOLERANCE)]
    epsilon: f64,

    goal: Goal,

    /// File with one comma-separated row per line
    file: PathBuf,
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("can't read input"))]
    Read { source: ReadMatrixError },

    #[snafu(display("computation failed"))]
    Compute { source: spkmeans::Error },
}

fn run(args: &Args) -> Result<String, CliError> {
    let input = text_io::read_matrix(&args.file).context(ReadSnafu)?;
    debug!(
        goal = ?args.goal,
        rows = input.rows(),
        cols = input.cols(),
        "read input"
    );

    let output = match args.goal {
        Goal::Wam => text_io::format_matrix(&build_wam(&input).context(ComputeSnafu)?),
        Goal::Ddg => text_io::format_matrix(&ddg(&input).context(ComputeSnafu)?),
        Goal::Gl => text_io::format_matrix(&gl(&input).context(ComputeSnafu)?),
        Goal::Jacobi => {
            let eigen = jacobi(input).context(ComputeSnafu)?;
            format!(
                "{}\n{}",
                text_io::format_row(&eigen.eigenvalues),
                text_io::format_matrix(&eigen.eigenvectors)
            )
        }
        Goal::Spk => {
            let result =
                spkmeans::spectral_cluster_extra(&input, args.k, args.max_iter, args.epsilon)
                    .context(ComputeSnafu)?;
            format!(
                "{}\n{}",
                text_io::format_indices(&result.centroid_indices),
                text_io::format_matrix(&result.centroids)
            )
        }
    };
    Ok(output)
}

fn ddg(points: &Matrix) -> Result<Matrix, spkmeans::Error> {
    build_ddg(&build_wam(points)?)
}

fn gl(points: &Matrix) -> Result<Matrix, spkmeans::Error> {
    let wam = build_wam(points)?;
    let ddg = build_ddg(&wam)?;
    build_laplacian(&wam, &ddg)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            debug!(error = %err, "invalid arguments");
            eprintln!("{GENERIC_ERROR}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            debug!(error = %snafu::Report::from_error(err), "goal failed");
            eprintln!("{GENERIC_ERROR}");
            ExitCode::FAILURE
        }
    }
}
