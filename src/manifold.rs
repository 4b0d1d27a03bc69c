//! 로렌츠 쌍곡면 모델
//!
//! 점 `x = (t, s_1, ..., s_n)`는 `t^2 - sum(s_i^2) = k` (k > 0)를 만족합니다.
//! 레이어는 곡률 `k`와 `sqrt(k)`만 조회하며, 선형 레이어는 `add_time`으로
//! 출력 점을 쌍곡면 위로 되돌립니다.

use crate::error::{GroupConvError, Result};
use crate::ops::lorentz;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

pub trait Manifold: Send + Sync + std::fmt::Debug {
    /// 곡률 상수 k
    fn k(&self) -> f32;

    /// 유효한 시간 성분의 최솟값
    fn sqrt_k(&self) -> f32 {
        self.k().sqrt()
    }

    fn add_time(&self, space: &ArrayView2<f32>) -> Array2<f32> {
        lorentz::add_time(space, self.k())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lorentz {
    k: f32,
}

impl Lorentz {
    pub fn new(k: f32) -> Result<Self> {
        if !(k.is_finite() && k > 0.0) {
            return Err(GroupConvError::invalid_config(format!(
                "curvature must be positive and finite, got {k}"
            )));
        }
        Ok(Self { k })
    }

    pub fn inner(&self, u: &ArrayView2<f32>, v: &ArrayView2<f32>) -> Array1<f32> {
        lorentz::lorentz_inner(u, v)
    }

    /// 상부 시트(t > 0) 위에서 <x, x> = k 인지 확인
    pub fn is_on_manifold(&self, x: &ArrayView1<f32>, tol: f32) -> bool {
        if x.is_empty() {
            return false;
        }
        let point = x.view().insert_axis(Axis(0));
        let norm = self.inner(&point, &point)[0];
        x[0] > 0.0 && (norm - self.k).abs() <= tol
    }
}

impl Default for Lorentz {
    fn default() -> Self {
        Self { k: 1.0 }
    }
}

impl Manifold for Lorentz {
    fn k(&self) -> f32 {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_rejects_bad_curvature() {
        for k in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = Lorentz::new(k).unwrap_err();
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_is_on_manifold() {
        let manifold = Lorentz::new(1.0).unwrap();
        assert!(manifold.is_on_manifold(&arr1(&[1.0, 0.0, 0.0]).view(), 1e-6));
        assert!(manifold.is_on_manifold(&arr1(&[5.0f32.sqrt(), 2.0]).view(), 1e-5));
        assert!(!manifold.is_on_manifold(&arr1(&[1.0, 1.0]).view(), 1e-6));
        assert!(!manifold.is_on_manifold(&arr1(&[-1.0, 0.0]).view(), 1e-6));
    }
}
