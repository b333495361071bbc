use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rowconv::{
    image::{BorderMode, Rgb8, DEFAULT_BORDER_MODE},
    imgproc::{
        filter::{kernels, FilterError, NamedKernel},
        parallel::{convolve_parallel, ParallelError, ParallelStats},
    },
    io::{
        ppm::{read_image_ppm_rgb8, write_image_ppm_rgb8},
        IoError,
    },
};

#[derive(FromArgs)]
/// Convolve a PPM image with a named kernel using N row-partitioned threads.
struct Args {
    /// path to the input PPM image
    #[argh(positional)]
    input: PathBuf,

    /// path to the output PPM image
    #[argh(positional)]
    output: PathBuf,

    /// kernel name: identity, sharpen, edge, emboss, blur, gauss or unsharp
    #[argh(positional)]
    kernel: String,

    /// number of worker threads, between 1 and the image height
    #[argh(positional)]
    threads: String,

    /// boundary policy: replicate, constant, reflect101 or wrap
    #[argh(option, default = "DEFAULT_BORDER_MODE")]
    border: BorderMode,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("{0}")]
    InvalidArguments(String),

    #[error("Failed loading {path}: file not found", path = .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed loading {path}: {err}", path = .0.display(), err = .1)]
    InputUnreadable(PathBuf, IoError),

    #[error(transparent)]
    KernelNotFound(FilterError),

    #[error("invalid thread count '{0}': N must be higher than 0 and not exceed the image height")]
    InvalidThreadCount(String),

    #[error("thread count {0} exceeds the image height: N must be between 1 and {1}")]
    ThreadCountExceedsHeight(usize, usize),

    #[error("failed to start worker {0}: {1}")]
    WorkerSpawnFailed(usize, String),

    #[error("{0} worker(s) failed before completion")]
    WorkerJoinFailed(usize),

    #[error("Failed writing {path}: {err}", path = .0.display(), err = .1)]
    OutputWriteFailed(PathBuf, IoError),
}

impl AppError {
    fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidArguments(_) => 2,
            AppError::InputNotFound(_) => 3,
            AppError::InputUnreadable(..) => 4,
            AppError::KernelNotFound(_) => 5,
            AppError::InvalidThreadCount(_) => 6,
            AppError::ThreadCountExceedsHeight(..) => 7,
            AppError::WorkerSpawnFailed(..) => 8,
            AppError::WorkerJoinFailed(_) => 9,
            AppError::OutputWriteFailed(..) => 10,
        }
    }
}

impl From<FilterError> for AppError {
    fn from(e: FilterError) -> Self {
        AppError::KernelNotFound(e)
    }
}

impl From<ParallelError> for AppError {
    fn from(e: ParallelError) -> Self {
        match e {
            ParallelError::InvalidThreadCount(n) => AppError::InvalidThreadCount(n.to_string()),
            ParallelError::ThreadCountExceedsHeight(n, h) => {
                AppError::ThreadCountExceedsHeight(n, h)
            }
            ParallelError::WorkerSpawnFailed(index, msg) => {
                AppError::WorkerSpawnFailed(index, msg)
            }
            ParallelError::WorkerJoinFailed(failed) => AppError::WorkerJoinFailed(failed),
            ParallelError::Image(e) => AppError::InvalidArguments(e.to_string()),
        }
    }
}

/// Parse the command line, `Ok(None)` when only help was requested.
fn parse_args() -> Result<Option<Args>, AppError> {
    let argv: Vec<String> = std::env::args().collect();
    let cmd = argv
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .unwrap_or("conv");
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();

    match Args::from_args(&[cmd], &rest) {
        Ok(args) => Ok(Some(args)),
        Err(early_exit) => match early_exit.status {
            Ok(()) => {
                println!("{}", early_exit.output);
                Ok(None)
            }
            Err(()) => Err(invalid_arguments(cmd, &early_exit.output)),
        },
    }
}

/// The argh message followed by the usage line and the kernel catalog.
fn invalid_arguments(cmd: &str, message: &str) -> AppError {
    AppError::InvalidArguments(format!(
        "{}\nUsage: {cmd} <input> <output> <kernel> <threads> [--border <mode>]\n\
         Available kernels: {}",
        message.trim_end(),
        NamedKernel::names().join(", ")
    ))
}

fn parse_thread_count(threads: &str) -> Result<usize, AppError> {
    match threads.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::InvalidThreadCount(threads.to_string())),
    }
}

fn run(args: &Args) -> Result<ParallelStats, AppError> {
    let num_threads = parse_thread_count(&args.threads)?;

    let src = read_image_ppm_rgb8(&args.input).map_err(|e| match e {
        IoError::FileDoesNotExist(path) => AppError::InputNotFound(path),
        e => AppError::InputUnreadable(args.input.clone(), e),
    })?;

    log::info!("input {}: {}", args.input.display(), src.size());

    if num_threads > src.height() {
        return Err(AppError::ThreadCountExceedsHeight(num_threads, src.height()));
    }

    // the destination is allocated only once the kernel resolves
    let kernel = kernels::from_name(&args.kernel)?;

    log::info!(
        "kernel {} ({}x{}), {num_threads} threads, border {}",
        args.kernel,
        kernel.size(),
        kernel.size(),
        args.border
    );

    let mut dst = Rgb8::from_size_val(src.size(), 0).map_err(ParallelError::from)?;

    let stats = convolve_parallel(&src, &kernel, &mut dst, args.border, num_threads)?;

    write_image_ppm_rgb8(&args.output, &dst)
        .map_err(|e| AppError::OutputWriteFailed(args.output.clone(), e))?;

    log::info!("output {}: {}", args.output.display(), dst.size());

    Ok(stats)
}

fn report(e: AppError) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::from(e.exit_code())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => return report(e),
    };

    match run(&args) {
        Ok(stats) => {
            println!("{:.6} [ms]", stats.elapsed_ms());
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}
