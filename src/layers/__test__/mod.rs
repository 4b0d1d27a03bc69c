use crate::manifold::{Lorentz, Manifold};
use crate::ops::lorentz::add_time;
use ndarray::{Array2, Array4, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub mod equivariance_test;

pub(crate) fn lorentz(k: f32) -> Arc<dyn Manifold> {
    Arc::new(Lorentz::new(k).unwrap())
}

/// 쌍곡면 위의 점들로 이루어진 `(B, H, W, C)` 특징 맵
pub(crate) fn random_feature_map(shape: (usize, usize, usize, usize), k: f32, seed: u64) -> Array4<f32> {
    let (b, h, w, c) = shape;
    let mut rng = StdRng::seed_from_u64(seed);
    let space = Array2::random_using((b * h * w, c - 1), Uniform::new(-1.0f32, 1.0), &mut rng);
    let points = add_time(&space.view(), k);
    points.into_shape((b, h, w, c)).unwrap()
}

/// 출력의 마지막 축이 모두 쌍곡면 위의 점인지 확인
pub(crate) fn assert_on_manifold<D: ndarray::Dimension>(out: &ndarray::Array<f32, D>, k: f32) {
    let lorentz = Lorentz::new(k).unwrap();
    let last = Axis(out.ndim() - 1);
    for point in out.lanes(last) {
        let time = point[0];
        assert!(
            lorentz.is_on_manifold(&point, 1e-3 * time * time),
            "point {:?} is off the hyperboloid",
            point
        );
    }
}
