//! 로렌츠 완전 연결 레이어
//!
//! 패치마다 `(시간, 공간)` 벡터를 받아 `y = x W^T + b`를 계산한 뒤,
//! 출력을 다시 쌍곡면 위의 점으로 만듭니다.

use crate::error::{GroupConvError, Result};
use crate::manifold::Manifold;
use ndarray::{s, Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;
use std::sync::Arc;

/// 정규화 경로에서 공간 노름이 0으로 취급되는 경계
const ZERO_NORM_SQ: f32 = 1e-10;
/// 정규화 경로의 시간 성분 안정화 항
const TIME_EPS: f32 = 1e-5;
/// 정규화 스케일 파라미터 초기값 (exp 이전)
const DEFAULT_SCALE: f32 = 2.3;

/// 새로 할당된 선형 레이어 파라미터. `weight`는 `(out_features, in_features)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub weight: Array2<f32>,
    pub bias: Option<Array1<f32>>,
}

impl LinearParams {
    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }
}

/// 패치 벡터 `(batch, num_patches, in)` -> 쌍곡면 위의 점 `(batch, num_patches, out)`
pub trait EquivariantLinear: Send + Sync + Sized {
    /// 입력/출력 너비는 `params`의 형상이, bias 여부는 `params.bias`가 결정합니다.
    fn from_parameters(
        manifold: Arc<dyn Manifold>,
        params: LinearParams,
        normalize: bool,
    ) -> Result<Self>;

    fn parameters(&self) -> &LinearParams;

    fn in_features(&self) -> usize {
        self.parameters().in_features()
    }

    fn out_features(&self) -> usize {
        self.parameters().out_features()
    }

    fn forward(&self, x: &ArrayView3<f32>) -> Result<Array3<f32>>;
}

#[derive(Debug, Clone)]
pub struct LorentzFullyConnected {
    manifold: Arc<dyn Manifold>,
    params: LinearParams,
    normalize: bool,
    scale: f32,
}

impl LorentzFullyConnected {
    /// y = x W^T + b
    fn affine(&self, x: &ArrayView2<f32>) -> Array2<f32> {
        let mut y = x.dot(&self.params.weight.t());
        if let Some(bias) = &self.params.bias {
            y += bias;
        }
        y
    }

    fn normalize_rows(&self, y: &ArrayView2<f32>) -> Array2<f32> {
        let k = self.manifold.k();
        let sqrt_k = self.manifold.sqrt_k();
        let max_scale = self.scale.exp();
        let mut out = Array2::zeros(y.raw_dim());

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut row)| {
                let y_row = y.row(i);
                let space = y_row.slice(s![1..]);
                let square_norm = space.dot(&space);
                if square_norm <= ZERO_NORM_SQ {
                    // 원점: 시간 = sqrt(k), 공간 = 0
                    row[0] = sqrt_k;
                    return;
                }
                let scale = sigmoid(y_row[0]) * max_scale;
                let inv_norm = 1.0 / square_norm.sqrt();
                for j in 1..row.len() {
                    row[j] = scale * y_row[j] * inv_norm;
                }
                row[0] = (scale * scale + k + TIME_EPS).sqrt();
            });

        out
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl EquivariantLinear for LorentzFullyConnected {
    fn from_parameters(
        manifold: Arc<dyn Manifold>,
        params: LinearParams,
        normalize: bool,
    ) -> Result<Self> {
        if params.in_features() == 0 || params.out_features() == 0 {
            return Err(GroupConvError::invalid_config(format!(
                "linear layer needs non-empty weight, got {:?}",
                params.weight.dim()
            )));
        }
        if let Some(bias) = &params.bias {
            if bias.len() != params.out_features() {
                return Err(GroupConvError::shape_mismatch(
                    "linear bias",
                    &[params.out_features()],
                    &[bias.len()],
                ));
            }
        }
        Ok(Self {
            manifold,
            params,
            normalize,
            scale: DEFAULT_SCALE,
        })
    }

    fn parameters(&self) -> &LinearParams {
        &self.params
    }

    fn forward(&self, x: &ArrayView3<f32>) -> Result<Array3<f32>> {
        let (batch, num_patches, width) = x.dim();
        if width != self.in_features() {
            return Err(GroupConvError::shape_mismatch(
                "linear input",
                &[batch, num_patches, self.in_features()],
                &[batch, num_patches, width],
            ));
        }

        let contiguous = x.as_standard_layout();
        let flat = contiguous
            .view()
            .into_shape((batch * num_patches, width))
            .map_err(|_| GroupConvError::shape_mismatch("linear input", &[batch * num_patches, width], x.shape()))?;

        let y = self.affine(&flat);
        let points = if self.normalize {
            self.normalize_rows(&y.view())
        } else {
            self.manifold.add_time(&y.slice(s![.., 1..]))
        };

        let out_features = self.out_features();
        points
            .into_shape((batch, num_patches, out_features))
            .map_err(|_| {
                GroupConvError::shape_mismatch(
                    "linear output",
                    &[batch, num_patches, out_features],
                    &[batch * num_patches, out_features],
                )
            })
    }
}
