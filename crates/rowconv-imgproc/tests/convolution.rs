use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

use rowconv_image::{BorderMode, Image, ImageSize, DEFAULT_BORDER_MODE};
use rowconv_imgproc::filter::{clamp_to_u8, convolve2d, kernels, Kernel2d, NamedKernel};
use rowconv_imgproc::parallel::{
    convolve_parallel, par_iter_row_bands, row_partition, ParallelError,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn random_image(
    rng: &mut StdRng,
    size: ImageSize,
) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let data = (0..size.width * size.height * 3)
        .map(|_| rng.random::<u8>())
        .collect();
    Ok(Image::new(size, data)?)
}

#[test]
fn thread_count_does_not_change_output() -> TestResult {
    let mut rng = StdRng::seed_from_u64(7);

    for size in [[1, 1], [5, 3], [17, 11], [3, 16]] {
        let src = random_image(&mut rng, size.into())?;

        for named in NamedKernel::ALL {
            let kernel = named.kernel()?;
            for border in BorderMode::ALL {
                let mut single = Image::from_size_val(src.size(), 0)?;
                convolve_parallel(&src, &kernel, &mut single, border, 1)?;

                for n in 2..=src.height() {
                    let mut multi = Image::from_size_val(src.size(), 0)?;
                    convolve_parallel(&src, &kernel, &mut multi, border, n)?;
                    assert_eq!(multi, single, "{named} {border} {size:?} with {n} threads");
                }
            }
        }
    }
    Ok(())
}

#[test]
fn identity_kernel_reproduces_input() -> TestResult {
    let mut rng = StdRng::seed_from_u64(11);
    let kernel = kernels::from_name("identity")?;

    for size in [[2, 2], [8, 5], [13, 9]] {
        let src = random_image(&mut rng, size.into())?;
        for n in 1..=src.height() {
            let mut dst = Image::from_size_val(src.size(), 0)?;
            convolve_parallel(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE, n)?;
            assert_eq!(dst, src, "{size:?} with {n} threads");
        }
    }
    Ok(())
}

#[test]
fn invalid_thread_count_performs_no_write() -> TestResult {
    let mut rng = StdRng::seed_from_u64(3);
    let src = random_image(&mut rng, [6, 4].into())?;
    let kernel = NamedKernel::Sharpen.kernel()?;
    let mut dst = Image::from_size_val(src.size(), 123)?;

    for (n, expected) in [
        (0, ParallelError::InvalidThreadCount(0)),
        (5, ParallelError::ThreadCountExceedsHeight(5, 4)),
        (100, ParallelError::ThreadCountExceedsHeight(100, 4)),
    ] {
        let res = convolve_parallel(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE, n);
        assert_eq!(res, Err(expected));
        assert!(dst.as_slice().iter().all(|&v| v == 123));
    }
    Ok(())
}

#[test]
fn row_ownership_covers_every_row_once() -> TestResult {
    for height in 1..24 {
        for n in 1..=height {
            let mut dst = Image::<u8, 1>::from_size_val([3, height].into(), 0)?;
            let writes: Vec<AtomicUsize> = (0..height).map(|_| AtomicUsize::new(0)).collect();
            let owners = Mutex::new(vec![None::<usize>; height]);
            let worker_ids = AtomicUsize::new(0);

            par_iter_row_bands(&mut dst, n, |band| {
                let worker = worker_ids.fetch_add(1, Ordering::SeqCst);
                for (y, row) in band.rows_mut() {
                    writes[y].fetch_add(1, Ordering::SeqCst);
                    if let Ok(mut owners) = owners.lock() {
                        owners[y] = Some(worker);
                    }
                    row.fill(1);
                }
            })?;

            assert!(writes.iter().all(|w| w.load(Ordering::SeqCst) == 1));
            assert!(dst.as_slice().iter().all(|&v| v == 1));
            assert_eq!(worker_ids.load(Ordering::SeqCst), n);

            // each worker owns one contiguous run of rows, matching the partition
            let owners = owners.into_inner()?;
            let mut runs: Vec<(Option<usize>, Range<usize>)> = Vec::new();
            for (y, owner) in owners.iter().enumerate() {
                match runs.last_mut() {
                    Some((o, range)) if *o == *owner => range.end = y + 1,
                    _ => runs.push((*owner, y..y + 1)),
                }
            }
            let ranges: Vec<_> = runs.into_iter().map(|(_, r)| r).collect();
            assert_eq!(ranges, row_partition(height, n)?, "{height} rows, {n} threads");
        }
    }
    Ok(())
}

#[test]
fn clamping_matches_truncation() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..10_000 {
        let s: f32 = rng.random_range(-1000.0..1000.0);
        let expected = s.trunc().clamp(0.0, 255.0) as u8;
        assert_eq!(clamp_to_u8(s), expected, "{s}");
    }
}

#[test]
fn uniform_gray_box_blur_stays_uniform() -> TestResult {
    let src = Image::<u8, 3>::from_size_val([4, 4].into(), 100)?;
    let kernel = NamedKernel::Blur.kernel()?;

    for n in 1..=4 {
        let mut dst = Image::from_size_val(src.size(), 0)?;
        convolve_parallel(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE, n)?;
        assert_eq!(dst, src);
    }

    // zero fill darkens the border: corners see 4 of 9 taps, edges 6 of 9
    let mut dst = Image::from_size_val(src.size(), 0)?;
    convolve_parallel(&src, &kernel, &mut dst, BorderMode::Constant, 2)?;
    assert_eq!(dst.get_pixel(0, 0), [44; 3]);
    assert_eq!(dst.get_pixel(1, 0), [66; 3]);
    assert_eq!(dst.get_pixel(1, 1), [100; 3]);
    Ok(())
}

#[test]
fn unnormalized_kernel_saturates() -> TestResult {
    let src = Image::<u8, 3>::from_size_val([4, 4].into(), 100)?;
    let kernel = Kernel2d::new(3, vec![1; 9], 1)?;

    let mut dst = Image::from_size_val(src.size(), 0)?;
    convolve2d(&src, &kernel, &mut dst, DEFAULT_BORDER_MODE)?;
    assert!(dst.as_slice().iter().all(|&v| v == 255));
    Ok(())
}
