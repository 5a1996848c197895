//! 3D real-to-complex FFT backends.
//!
//! Convention matches FFTW's r2c/c2r:
//! - Forward (real → complex): unnormalized, last axis compacted to n/2 + 1
//! - Inverse (complex → real): unnormalized, the caller divides by nx*ny*nz
//!
//! The backend is chosen at startup through [`create_backend`]. Builds
//! without the `fft` feature only have [`NullBackend`], whose transforms
//! leave their output untouched; check [`BACKEND_COMPILED`] or
//! [`TransformBackend::is_available`] before relying on spectral data.

use ndarray::{ArrayView3, ArrayViewMut3};
use num_complex::Complex64;
use pic_types::config::TransformBackendKind;

/// Whether a real FFT backend was compiled into this build.
pub const BACKEND_COMPILED: bool = cfg!(feature = "fft");

/// Direction of a field transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    RealToComplex,
    ComplexToReal,
}

/// Execution plan cache for one fixed logical size.
pub trait TransformBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Build plans for `size`, replacing any cached ones.
    fn plan(&mut self, size: [usize; 3]);

    /// `real` has the planned size, `complex` its compacted extent.
    fn forward(&self, real: ArrayView3<'_, f64>, complex: ArrayViewMut3<'_, Complex64>);

    /// Unnormalized inverse; `complex` is left unchanged.
    fn inverse(&self, complex: ArrayView3<'_, Complex64>, real: ArrayViewMut3<'_, f64>);

    /// Release cached plans. Safe to call when nothing is planned.
    fn teardown(&mut self);
}

/// Backend used when spectral transforms are disabled or not compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl TransformBackend for NullBackend {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn plan(&mut self, _size: [usize; 3]) {}

    fn forward(&self, _real: ArrayView3<'_, f64>, _complex: ArrayViewMut3<'_, Complex64>) {}

    fn inverse(&self, _complex: ArrayView3<'_, Complex64>, _real: ArrayViewMut3<'_, f64>) {}

    fn teardown(&mut self) {}
}

#[cfg(feature = "fft")]
pub use rustfft_backend::{PlanCache, RustFftBackend};

#[cfg(feature = "fft")]
mod rustfft_backend {
    use super::TransformBackend;
    use ndarray::{ArrayView3, ArrayViewMut3, Axis, Zip};
    use num_complex::Complex64;
    use parking_lot::Mutex;
    use pic_types::spectral::complex_extent;
    use rayon::prelude::*;
    use rustfft::{Fft, FftPlanner, Length};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Plans keyed by (length, inverse), shared between backends so that
    /// transforms of the same size reuse one plan.
    #[derive(Clone, Default)]
    pub struct PlanCache {
        plans: Arc<Mutex<HashMap<(usize, bool), Arc<dyn Fft<f64>>>>>,
    }

    impl PlanCache {
        pub fn new() -> Self {
            Self::default()
        }

        fn get(&self, planner: &mut FftPlanner<f64>, len: usize, inverse: bool) -> Arc<dyn Fft<f64>> {
            self.plans
                .lock()
                .entry((len, inverse))
                .or_insert_with(|| {
                    if inverse {
                        planner.plan_fft_inverse(len)
                    } else {
                        planner.plan_fft_forward(len)
                    }
                })
                .clone()
        }

        /// Number of distinct plans built so far.
        pub fn len(&self) -> usize {
            self.plans.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    struct Plans {
        size: [usize; 3],
        forward: [Arc<dyn Fft<f64>>; 3],
        inverse: [Arc<dyn Fft<f64>>; 3],
    }

    /// Separable 3D transform on top of rustfft.
    ///
    /// Lanes along each axis are transformed in parallel on the rayon
    /// pool; every worker keeps one lane buffer and one scratch buffer.
    pub struct RustFftBackend {
        cache: PlanCache,
        plans: Option<Plans>,
    }

    impl Default for RustFftBackend {
        fn default() -> Self {
            Self::with_cache(PlanCache::new())
        }
    }

    impl RustFftBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_cache(cache: PlanCache) -> Self {
            RustFftBackend { cache, plans: None }
        }

        pub fn cache(&self) -> &PlanCache {
            &self.cache
        }

        pub fn planned_size(&self) -> Option<[usize; 3]> {
            self.plans.as_ref().map(|p| p.size)
        }

        /// Forward plan along `axis`, if planned.
        pub fn forward_plan(&self, axis: usize) -> Option<&Arc<dyn Fft<f64>>> {
            self.plans.as_ref().map(|p| &p.forward[axis])
        }
    }

    impl std::fmt::Debug for RustFftBackend {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RustFftBackend")
                .field("planned_size", &self.planned_size())
                .finish()
        }
    }

    fn lane_buffers(fft: &Arc<dyn Fft<f64>>) -> (Vec<Complex64>, Vec<Complex64>) {
        let zero = Complex64::new(0.0, 0.0);
        (
            vec![zero; fft.len()],
            vec![zero; fft.get_inplace_scratch_len()],
        )
    }

    /// In-place complex FFT of every lane along `axis`.
    fn transform_lanes(mut data: ArrayViewMut3<'_, Complex64>, axis: Axis, fft: &Arc<dyn Fft<f64>>) {
        Zip::from(data.lanes_mut(axis)).into_par_iter().for_each_init(
            || lane_buffers(fft),
            |(buf, scratch), (mut lane,)| {
                for (dst, src) in buf.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                fft.process_with_scratch(buf, scratch);
                for (dst, src) in lane.iter_mut().zip(buf.iter()) {
                    *dst = *src;
                }
            },
        );
    }

    impl TransformBackend for RustFftBackend {
        fn name(&self) -> &'static str {
            "rustfft"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn plan(&mut self, size: [usize; 3]) {
            let mut planner = FftPlanner::new();
            let forward = size.map(|n| self.cache.get(&mut planner, n, false));
            let inverse = size.map(|n| self.cache.get(&mut planner, n, true));
            self.plans = Some(Plans {
                size,
                forward,
                inverse,
            });
        }

        fn forward(&self, real: ArrayView3<'_, f64>, mut complex: ArrayViewMut3<'_, Complex64>) {
            let Some(plans) = &self.plans else {
                return;
            };
            debug_assert_eq!(real.shape(), &plans.size[..]);
            debug_assert_eq!(complex.shape(), &complex_extent(plans.size)[..]);

            // z: complex FFT of the real line, keep the non-redundant half.
            let fft_z = &plans.forward[2];
            Zip::from(complex.lanes_mut(Axis(2)))
                .and(real.lanes(Axis(2)))
                .into_par_iter()
                .for_each_init(
                    || lane_buffers(fft_z),
                    |(buf, scratch), (mut out_lane, in_lane)| {
                        for (dst, &src) in buf.iter_mut().zip(in_lane.iter()) {
                            *dst = Complex64::new(src, 0.0);
                        }
                        fft_z.process_with_scratch(buf, scratch);
                        for (dst, src) in out_lane.iter_mut().zip(buf.iter()) {
                            *dst = *src;
                        }
                    },
                );

            transform_lanes(complex.view_mut(), Axis(1), &plans.forward[1]);
            transform_lanes(complex.view_mut(), Axis(0), &plans.forward[0]);
        }

        fn inverse(&self, complex: ArrayView3<'_, Complex64>, mut real: ArrayViewMut3<'_, f64>) {
            let Some(plans) = &self.plans else {
                return;
            };
            debug_assert_eq!(real.shape(), &plans.size[..]);
            debug_assert_eq!(complex.shape(), &complex_extent(plans.size)[..]);

            let nz = plans.size[2];
            let mut work = complex.to_owned();
            transform_lanes(work.view_mut(), Axis(0), &plans.inverse[0]);
            transform_lanes(work.view_mut(), Axis(1), &plans.inverse[1]);

            // z: rebuild the full Hermitian line, then keep the real part.
            let ifft_z = &plans.inverse[2];
            Zip::from(real.lanes_mut(Axis(2)))
                .and(work.lanes(Axis(2)))
                .into_par_iter()
                .for_each_init(
                    || lane_buffers(ifft_z),
                    |(buf, scratch), (mut out_lane, in_lane)| {
                        let half = in_lane.len();
                        for (k, slot) in buf.iter_mut().enumerate() {
                            *slot = if k < half {
                                in_lane[k]
                            } else {
                                in_lane[nz - k].conj()
                            };
                        }
                        ifft_z.process_with_scratch(buf, scratch);
                        for (dst, src) in out_lane.iter_mut().zip(buf.iter()) {
                            *dst = src.re;
                        }
                    },
                );
        }

        fn teardown(&mut self) {
            self.plans = None;
        }
    }
}

/// Backend for `kind`. Falls back to [`NullBackend`] with a warning when
/// the requested backend was not compiled in.
pub fn create_backend(kind: TransformBackendKind) -> Box<dyn TransformBackend> {
    match kind {
        TransformBackendKind::Disabled => Box::new(NullBackend),
        TransformBackendKind::RustFft => {
            #[cfg(feature = "fft")]
            {
                Box::new(RustFftBackend::new())
            }
            #[cfg(not(feature = "fft"))]
            {
                tracing::warn!(
                    "rustfft backend requested but the `fft` feature is off; \
                     spectral transforms will be no-ops"
                );
                Box::new(NullBackend)
            }
        }
    }
}

/// `N` backends of `kind`. rustfft backends share one [`PlanCache`], so
/// transforms of the same size reuse the same plans.
pub fn create_backends<const N: usize>(kind: TransformBackendKind) -> [Box<dyn TransformBackend>; N] {
    shared_backends(kind).unwrap_or_else(|| std::array::from_fn(|_| create_backend(kind)))
}

#[cfg(feature = "fft")]
fn shared_backends<const N: usize>(
    kind: TransformBackendKind,
) -> Option<[Box<dyn TransformBackend>; N]> {
    if kind != TransformBackendKind::RustFft {
        return None;
    }
    let cache = PlanCache::new();
    Some(std::array::from_fn(|_| {
        Box::new(RustFftBackend::with_cache(cache.clone())) as Box<dyn TransformBackend>
    }))
}

#[cfg(not(feature = "fft"))]
fn shared_backends<const N: usize>(
    _kind: TransformBackendKind,
) -> Option<[Box<dyn TransformBackend>; N]> {
    None
}
