use ndarray::{Array1, ArrayView2, Axis};

/// 각 행의 제곱 노름을 배치 단위로 계산합니다.
/// x: (batch_size, dim) 형태의 2차원 배열.
pub fn norm_sq_batched(x: &ArrayView2<f32>) -> Array1<f32> {
    (x * x).sum_axis(Axis(1))
}
