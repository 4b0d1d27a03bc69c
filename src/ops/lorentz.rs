use crate::error::{GroupConvError, Result};
use crate::ops::batch::norm_sq_batched;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

pub fn lorentz_inner(u: &ArrayView2<f32>, v: &ArrayView2<f32>) -> Array1<f32> {
    let batch_size = u.nrows();

    let inner: Vec<f32> = (0..batch_size)
        .into_par_iter()
        .map(|i| {
            let u_row = u.row(i);
            let v_row = v.row(i);

            // Minkowski inner product: u0*v0 - u1*v1 - u2*v2 - ...
            let mut inner = u_row[0] * v_row[0];
            for j in 1..u_row.len() {
                inner -= u_row[j] * v_row[j];
            }
            inner
        })
        .collect();

    Array1::from_vec(inner)
}

/// 공간 성분으로부터 시간 성분을 복원하여 쌍곡면 위의 점을 만듭니다.
/// time = sqrt(||space||^2 + k)
pub fn add_time(space: &ArrayView2<f32>, k: f32) -> Array2<f32> {
    let time = (norm_sq_batched(space) + k)
        .mapv(f32::sqrt)
        .insert_axis(Axis(1));

    let mut result = Array2::zeros((space.nrows(), space.ncols() + 1));
    result.slice_mut(s![.., 0..1]).assign(&time);
    result.slice_mut(s![.., 1..]).assign(space);
    result
}

/// sqrt(k) 미만의 시간 성분을 sqrt(k)로 올립니다. NaN은 그대로 통과합니다.
#[inline]
pub fn clamp_time(t: f32, sqrt_k: f32) -> f32 {
    if t < sqrt_k {
        sqrt_k
    } else {
        t
    }
}

/// sum(clamp(t)^2) - (n - 1) * k
pub fn time_radicand(taps: ArrayView1<f32>, k: f32) -> f32 {
    let sqrt_k = k.sqrt();
    let sum_sq: f32 = taps
        .iter()
        .map(|&t| {
            let t = clamp_time(t, sqrt_k);
            t * t
        })
        .sum();
    sum_sq - (taps.len() as f32 - 1.0) * k
}

/// 커널 탭마다 중복된 시간 성분들을 하나의 시간 값으로 합칩니다.
///
/// n개의 점을 합친 "에너지"를 유지하면서 결합된 패치가 쌍곡면 제약을
/// 만족하도록 `sqrt(sum(t_i^2) - (n - 1) k)`를 사용합니다.
pub fn rescale_time(taps: ArrayView1<f32>, k: f32) -> Result<f32> {
    let radicand = time_radicand(taps, k);
    if radicand.is_finite() && radicand >= 0.0 {
        Ok(radicand.sqrt())
    } else {
        Err(GroupConvError::NumericDomain { radicand })
    }
}
