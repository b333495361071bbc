use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use rowconv_image::{BorderMode, Image, ImageError, ImageRowsMut};

use crate::filter::{convolve2d, convolve_rows, Kernel2d};

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The requested thread count is zero.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The requested thread count is larger than the number of rows.
    #[error("thread count ({0}) must not exceed the image height ({1})")]
    ThreadCountExceedsHeight(usize, usize),

    /// A worker thread could not be started.
    #[error("failed to spawn worker {0}: {1}")]
    WorkerSpawnFailed(usize, String),

    /// One or more workers panicked.
    #[error("{0} worker(s) did not finish")]
    WorkerJoinFailed(usize),

    /// The source and destination images are not compatible.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Controls how the convolution is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    Serial,

    /// Split the rows into `n` contiguous bands, one fresh OS thread per band.
    Fixed(usize),

    /// Use the global Rayon thread pool with one task per row.
    ParallelRows,
}

/// Timing of a parallel region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallelStats {
    /// Number of workers that ran.
    pub num_threads: usize,
    /// Wall-clock time from just before the first spawn to just after the last join.
    pub elapsed: Duration,
}

impl ParallelStats {
    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Split `height` rows into `num_threads` contiguous ranges.
///
/// Worker `i` gets `[i * height / num_threads, (i + 1) * height / num_threads)`, so the
/// remainder rows are spread one by one instead of piling up on a single worker.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidThreadCount`] for zero threads and
/// [`ParallelError::ThreadCountExceedsHeight`] for more threads than rows.
///
/// # Examples
///
/// ```
/// use rowconv_imgproc::parallel::row_partition;
///
/// let ranges = row_partition(10, 4).unwrap();
/// assert_eq!(ranges, vec![0..2, 2..5, 5..7, 7..10]);
/// ```
pub fn row_partition(
    height: usize,
    num_threads: usize,
) -> Result<Vec<Range<usize>>, ParallelError> {
    if num_threads == 0 {
        return Err(ParallelError::InvalidThreadCount(num_threads));
    }
    if num_threads > height {
        return Err(ParallelError::ThreadCountExceedsHeight(num_threads, height));
    }

    Ok((0..num_threads)
        .map(|i| i * height / num_threads..(i + 1) * height / num_threads)
        .collect())
}

/// Run `f` on `num_threads` disjoint row bands of `dst`, one scoped OS thread per band.
///
/// Every band is handed to exactly one worker, so no two workers can write the same
/// row. The call returns only after every started worker has been joined.
///
/// # Errors
///
/// The thread count is validated before any thread starts. If a worker fails to spawn,
/// no further workers are started, the running ones are joined and
/// [`ParallelError::WorkerSpawnFailed`] is returned. A panicking worker yields
/// [`ParallelError::WorkerJoinFailed`].
pub fn par_iter_row_bands<T, const C: usize>(
    dst: &mut Image<T, C>,
    num_threads: usize,
    f: impl Fn(&mut ImageRowsMut<'_, T, C>) + Sync,
) -> Result<ParallelStats, ParallelError>
where
    T: Send,
{
    let ranges = row_partition(dst.height(), num_threads)?;
    log::debug!("row partition for {num_threads} workers: {ranges:?}");

    let bands = dst.split_rows_mut(&ranges)?;
    let f = &f;

    let start = Instant::now();
    let outcome = thread::scope(|s| {
        let mut handles = Vec::with_capacity(bands.len());
        let mut spawn_error = None;

        for (index, mut band) in bands.into_iter().enumerate() {
            log::trace!("spawning worker {index} for rows {:?}", band.rows());
            match spawn_worker(s, index, move || f(&mut band)) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    log::warn!("failed to spawn worker {index}: {e}");
                    spawn_error =
                        Some(ParallelError::WorkerSpawnFailed(index, e.to_string()));
                    break;
                }
            }
        }

        // join every started worker before reporting anything
        let failed = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count();

        match spawn_error {
            Some(err) => Err(err),
            None if failed > 0 => {
                log::warn!("{failed} worker(s) panicked");
                Err(ParallelError::WorkerJoinFailed(failed))
            }
            None => Ok(()),
        }
    });
    let elapsed = start.elapsed();

    outcome?;
    log::debug!("{num_threads} workers finished in {elapsed:?}");

    Ok(ParallelStats {
        num_threads,
        elapsed,
    })
}

/// Convolve `src` into `dst` with `num_threads` row-partitioned OS threads.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The convolution kernel, shared read-only by every worker.
/// * `dst` - The destination image with shape (H, W, C).
/// * `border` - The boundary policy for taps outside the image.
/// * `num_threads` - The number of workers, in `[1, H]`.
///
/// # Returns
///
/// The timing of the parallel region.
///
/// # Errors
///
/// On any error `dst` is either untouched (invalid sizes or thread count) or must be
/// discarded (worker failures).
///
/// # Examples
///
/// ```
/// use rowconv_image::{Image, DEFAULT_BORDER_MODE};
/// use rowconv_imgproc::{filter::NamedKernel, parallel::convolve_parallel};
///
/// let src = Image::<u8, 3>::from_size_val([8, 8].into(), 42).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
/// let kernel = NamedKernel::Identity.kernel().unwrap();
///
/// let stats = convolve_parallel(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE, 4).unwrap();
///
/// assert_eq!(stats.num_threads, 4);
/// assert_eq!(dst, src);
/// ```
pub fn convolve_parallel<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    dst: &mut Image<u8, C>,
    border: BorderMode,
    num_threads: usize,
) -> Result<ParallelStats, ParallelError> {
    if src.size() != dst.size() {
        return Err(ImageError::SizeMismatch(src.size(), dst.size()).into());
    }

    par_iter_row_bands(dst, num_threads, |band| convolve_rows(src, kernel, band, border))
}

/// Convolve `src` into `dst` with the given execution strategy.
///
/// All strategies produce bit-identical output.
pub fn convolve_with_strategy<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    dst: &mut Image<u8, C>,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<ParallelStats, ParallelError> {
    match strategy {
        ExecutionStrategy::Fixed(n) => convolve_parallel(src, kernel, dst, border, n),
        ExecutionStrategy::Serial => {
            let start = Instant::now();
            convolve2d(src, kernel, dst, border)?;
            Ok(ParallelStats {
                num_threads: 1,
                elapsed: start.elapsed(),
            })
        }
        ExecutionStrategy::ParallelRows => {
            if src.size() != dst.size() {
                return Err(ImageError::SizeMismatch(src.size(), dst.size()).into());
            }
            let ranges: Vec<_> = (0..dst.height()).map(|y| y..y + 1).collect();
            let bands = dst.split_rows_mut(&ranges)?;

            let start = Instant::now();
            bands
                .into_par_iter()
                .for_each(|mut band| convolve_rows(src, kernel, &mut band, border));
            Ok(ParallelStats {
                num_threads: rayon::current_num_threads(),
                elapsed: start.elapsed(),
            })
        }
    }
}

fn spawn_worker<'scope, F>(
    scope: &'scope thread::Scope<'scope, '_>,
    index: usize,
    f: F,
) -> std::io::Result<thread::ScopedJoinHandle<'scope, ()>>
where
    F: FnOnce() + Send + 'scope,
{
    let f = fault::wrap(index, f)?;
    thread::Builder::new()
        .name(format!("rowconv-worker-{index}"))
        .spawn_scoped(scope, f)
}

#[cfg(not(test))]
mod fault {
    #[inline(always)]
    pub(super) fn wrap<F>(_index: usize, f: F) -> std::io::Result<F> {
        Ok(f)
    }
}
