//! 패치 추출과 로렌츠 일관 재조립
//!
//! 1. `(B, H, W, C)` 입력을 `(B, C, H, W)`로 바꾼 뒤 슬라이딩 윈도우 패치를 뽑습니다.
//!    패치 하나의 배치는 `[시간 탭 K개, 탭 순서로 섞인 공간 채널...]` 입니다.
//! 2. 시간 탭들을 하나의 재스케일된 시간 값으로 합치고, 공간 탭을
//!    채널 우선 순서로 바꿉니다.
//! 3. 군 원소마다 커널 탭 치환을 적용해 방향별 패치 사본을 만듭니다.

use crate::error::{GroupConvError, Result};
use crate::layers::config::ConvConfig;
use crate::ops::lorentz::rescale_time;
use ndarray::{s, Array3, ArrayView2, ArrayView3, ArrayView4, Axis};
use num_integer::Integer;
use rayon::prelude::*;

/// floor((dim + 2p - d(k - 1) - 1) / s + 1). 유효한 위치가 없으면 `None`.
pub fn output_dim(dim: usize, kernel: usize, stride: usize, padding: usize, dilation: usize) -> Option<usize> {
    let numerator =
        dim as i64 + 2 * padding as i64 - dilation as i64 * (kernel as i64 - 1) - 1;
    let out = Integer::div_floor(&numerator, &(stride as i64)) + 1;
    (out > 0).then_some(out as usize)
}

pub fn output_size(config: &ConvConfig, h: usize, w: usize) -> Result<(usize, usize)> {
    config.validate()?;
    let (k, s, p, d) = (config.kernel_size, config.stride, config.padding, config.dilation);
    match (
        output_dim(h, k.h, s.h, p.h, d.h),
        output_dim(w, k.w, s.w, p.w, d.w),
    ) {
        (Some(h_out), Some(w_out)) => Ok((h_out, w_out)),
        _ => Err(GroupConvError::shape_mismatch(
            "padded input size",
            &[d.h * (k.h - 1) + 1, d.w * (k.w - 1) + 1],
            &[h + 2 * p.h, w + 2 * p.w],
        )),
    }
}

/// `(B, H, W, C)` -> `(B, H_out * W_out, C * K)`
///
/// 범위를 벗어난 탭은 0으로 채워집니다 (zero padding).
pub fn extract_patches(input: &ArrayView4<f32>, config: &ConvConfig) -> Result<Array3<f32>> {
    let (batch, h, w, channels) = input.dim();
    if channels != config.in_channels {
        return Err(GroupConvError::shape_mismatch(
            "input channels",
            &[batch, h, w, config.in_channels],
            &[batch, h, w, channels],
        ));
    }
    let (h_out, w_out) = output_size(config, h, w)?;
    let (kh, kw) = config.kernel_size.as_tuple();
    let (sh, sw) = config.stride.as_tuple();
    let (ph, pw) = config.padding.as_tuple();
    let (dh, dw) = config.dilation.as_tuple();
    let kernel_len = kh * kw;
    let spatial = channels - 1;
    let num_patches = h_out * w_out;

    let permuted = input.view().permuted_axes([0, 3, 1, 2]);
    let nchw = permuted.as_standard_layout();

    let mut patches = Array3::<f32>::zeros((batch, num_patches, channels * kernel_len));

    patches
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(b, mut image_patches)| {
            let image = nchw.index_axis(Axis(0), b);
            for (l, mut patch) in image_patches.outer_iter_mut().enumerate() {
                let (oh, ow) = (l / w_out, l % w_out);
                for ki in 0..kh {
                    let ih = (oh * sh + ki * dh) as isize - ph as isize;
                    if ih < 0 || ih >= h as isize {
                        continue;
                    }
                    for kj in 0..kw {
                        let iw = (ow * sw + kj * dw) as isize - pw as isize;
                        if iw < 0 || iw >= w as isize {
                            continue;
                        }
                        let (ih, iw) = (ih as usize, iw as usize);
                        let tap = ki * kw + kj;
                        patch[tap] = image[[0, ih, iw]];
                        for ch in 1..channels {
                            patch[kernel_len + tap * spatial + (ch - 1)] = image[[ch, ih, iw]];
                        }
                    }
                }
            }
        });

    Ok(patches)
}

/// `(B, L, C * K)` -> `(B, L, (C - 1) * K + 1)`
///
/// 시간 탭은 sqrt(k) 아래로 내려가지 않게 클램프한 뒤 하나로 합치고,
/// 공간 탭은 탭 우선에서 채널 우선 순서로 옮깁니다.
pub fn reassemble_patches(
    patches: &ArrayView3<f32>,
    in_channels: usize,
    kernel_len: usize,
    k: f32,
) -> Result<Array3<f32>> {
    let (batch, num_patches, patch_len) = patches.dim();
    if patch_len != in_channels * kernel_len {
        return Err(GroupConvError::shape_mismatch(
            "patch length",
            &[batch, num_patches, in_channels * kernel_len],
            &[batch, num_patches, patch_len],
        ));
    }
    let spatial = in_channels - 1;
    let width = spatial * kernel_len + 1;
    let mut out = Array3::<f32>::zeros((batch, num_patches, width));

    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(b, mut rows)| -> Result<()> {
            for (l, mut row) in rows.outer_iter_mut().enumerate() {
                let patch = patches.slice(s![b, l, ..]);
                row[0] = rescale_time(patch.slice(s![..kernel_len]), k).map_err(|err| {
                    tracing::warn!(batch = b, patch = l, %err, "time rescale left the real domain");
                    err
                })?;
                for tap in 0..kernel_len {
                    for ch in 0..spatial {
                        row[1 + ch * kernel_len + tap] = patch[kernel_len + tap * spatial + ch];
                    }
                }
            }
            Ok(())
        })?;

    Ok(out)
}

/// `(B, L, W)` -> `(B, G * L, W)`, 방향 우선 순서.
///
/// `perms[[g, x]] = y` 일 때 각 공간 채널의 탭 `x` 값을 `y` 자리로 옮깁니다.
/// 가중치를 공유하는 선형 레이어에 대해 이는 g로 변환된 커널 사본과의
/// 내적과 같습니다. 시간 스칼라는 치환에 불변이므로 그대로 복사합니다.
pub fn expand_orientations(
    patches: &ArrayView3<f32>,
    perms: &ArrayView2<usize>,
) -> Result<Array3<f32>> {
    let (batch, num_patches, width) = patches.dim();
    let (orientations, kernel_len) = perms.dim();
    if kernel_len == 0 || width == 0 || (width - 1) % kernel_len != 0 {
        return Err(GroupConvError::shape_mismatch(
            "tap permutation",
            &[orientations, width.saturating_sub(1)],
            &[orientations, kernel_len],
        ));
    }
    let spatial = (width - 1) / kernel_len;
    let mut out = Array3::<f32>::zeros((batch, orientations * num_patches, width));

    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(b, mut rows)| {
            for o in 0..orientations {
                let perm = perms.row(o);
                for l in 0..num_patches {
                    let src = patches.slice(s![b, l, ..]);
                    let mut dst = rows.row_mut(o * num_patches + l);
                    dst[0] = src[0];
                    for ch in 0..spatial {
                        let base = 1 + ch * kernel_len;
                        for tap in 0..kernel_len {
                            dst[base + perm[tap]] = src[base + tap];
                        }
                    }
                }
            }
        });

    Ok(out)
}
