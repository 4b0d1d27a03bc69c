//! 입력 특징 맵을 회전/반사했을 때 출력이 같은 변환 + 방향 축 치환으로
//! 바뀌는지 확인합니다.
//!
//! 변환 `t`에 대해 `f'(p) = f(t^-1 p)` 이면 `out'(g, p) = out(t^-1 g, t^-1 p)`.

use super::{lorentz, random_feature_map};
use crate::groups::{Element, GroupPair};
use crate::layers::{ConvConfig, GroupConv2d};
use approx::assert_relative_eq;
use ndarray::{Array4, Array5};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SIZE: usize = 7;

/// 방향 축 인덱스 순서대로 나열한 출력 군 원소
fn orientation_elements(pair: GroupPair) -> Vec<Element> {
    match pair.output_stabilizer_size() {
        4 => (0..4).map(Element::rotation).collect(),
        _ => (0..2)
            .flat_map(|m| (0..4).map(move |r| Element::roto_reflection(m, r)))
            .collect(),
    }
}

/// 중심 기준 좌표로 픽셀 인덱스에 `t`를 적용합니다. 크기는 홀수여야 합니다.
fn act_on_pixel(t: &Element, (i, j): (usize, usize), size: usize) -> (usize, usize) {
    let c = (size / 2) as i32;
    let (u, v) = t.apply((i as i32 - c, j as i32 - c));
    ((u + c) as usize, (v + c) as usize)
}

/// f'(p) = f(t^-1 p)
fn transform_input(input: &Array4<f32>, t: &Element) -> Array4<f32> {
    let t_inv = t.inverse();
    let (_, h, _, _) = input.dim();
    Array4::from_shape_fn(input.raw_dim(), |(b, i, j, c)| {
        let (si, sj) = act_on_pixel(&t_inv, (i, j), h);
        input[[b, si, sj, c]]
    })
}

fn assert_equivariant(pair: GroupPair, t: Element, out: &Array5<f32>, transformed: &Array5<f32>) {
    let elements = orientation_elements(pair);
    let t_inv = t.inverse();
    let (batch, orientations, h_out, w_out, channels) = out.dim();
    assert_eq!(transformed.dim(), out.dim());

    for (a, g) in elements.iter().enumerate() {
        let source = t_inv.compose(g);
        let a_src = elements
            .iter()
            .position(|e| *e == source)
            .expect("orientation group is closed");
        assert!(a_src < orientations);
        for b in 0..batch {
            for i in 0..h_out {
                for j in 0..w_out {
                    let (si, sj) = act_on_pixel(&t_inv, (i, j), h_out);
                    for c in 0..channels {
                        assert_relative_eq!(
                            transformed[[b, a, i, j, c]],
                            out[[b, a_src, si, sj, c]],
                            epsilon = 1e-5,
                            max_relative = 1e-4
                        );
                    }
                }
            }
        }
    }
}

fn check_pair(pair: GroupPair, transforms: &[Element], padding: usize) -> anyhow::Result<()> {
    let k = 1.0;
    let config = ConvConfig::new(3, 4, 3).padding(padding);
    let layer = GroupConv2d::new_with_rng(
        pair.input_stabilizer_size(),
        pair.output_stabilizer_size(),
        lorentz(k),
        config,
        &mut StdRng::seed_from_u64(21),
    )?;
    let input = random_feature_map((2, SIZE, SIZE, 3), k, 22);
    let out = layer.forward(&input.view())?;

    for t in transforms {
        let transformed = layer.forward(&transform_input(&input, t).view())?;
        assert_equivariant(pair, *t, &out, &transformed);
    }
    Ok(())
}

#[test]
fn test_c4_rotation_equivariance() -> anyhow::Result<()> {
    let rotations: Vec<Element> = (1..4).map(Element::rotation).collect();
    check_pair(GroupPair::C4Z2, &rotations, 0)?;
    check_pair(GroupPair::C4Z2, &rotations, 1)?;
    check_pair(GroupPair::C4P4, &rotations, 0)
}

#[test]
fn test_d4_rotation_and_reflection_equivariance() -> anyhow::Result<()> {
    let transforms = vec![
        Element::rotation(1),
        Element::rotation(2),
        Element::roto_reflection(1, 0),
        Element::roto_reflection(1, 3),
    ];
    check_pair(GroupPair::D4Z2, &transforms, 0)?;
    check_pair(GroupPair::D4Z2, &transforms, 1)?;
    check_pair(GroupPair::D4P4M, &transforms, 0)
}

#[test]
fn test_quarter_turn_cycles_orientations() -> anyhow::Result<()> {
    // 회전 입력의 방향 a 출력 = 원래 출력의 방향 a - 1을 회전한 것
    let k = 1.0;
    let layer = GroupConv2d::new_with_rng(1, 4, lorentz(k), ConvConfig::new(3, 2, 3), &mut StdRng::seed_from_u64(23))?;
    let input = random_feature_map((1, SIZE, SIZE, 3), k, 24);
    // f'[i][j] = f[j][N - 1 - i]
    let rotated = Array4::from_shape_fn(input.raw_dim(), |(b, i, j, c)| input[[b, j, SIZE - 1 - i, c]]);

    let out = layer.forward(&input.view())?;
    let out_rot = layer.forward(&rotated.view())?;
    let m = SIZE - 2;
    for a in 0..4 {
        for i in 0..m {
            for j in 0..m {
                for c in 0..2 {
                    assert_relative_eq!(
                        out_rot[[0, a, i, j, c]],
                        out[[0, (a + 3) % 4, j, m - 1 - i, c]],
                        epsilon = 1e-5,
                        max_relative = 1e-4
                    );
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_reflection_swaps_mirror_orientations() -> anyhow::Result<()> {
    // 1x1 출력: 반사된 입력은 반사 성분(m)만 뒤바뀐 방향으로 응답
    let k = 1.0;
    let layer = GroupConv2d::new_with_rng(1, 8, lorentz(k), ConvConfig::new(3, 3, 3), &mut StdRng::seed_from_u64(25))?;
    let base = random_feature_map((1, 3, 3, 3), k, 26);
    let out = layer.forward(&base.view())?;
    assert_eq!(out.dim(), (1, 8, 1, 1, 3));

    let flipped = transform_input(&base, &Element::roto_reflection(1, 0));
    let out_flipped = layer.forward(&flipped.view())?;
    for r in 0..4 {
        for c in 0..3 {
            assert_relative_eq!(
                out_flipped[[0, r, 0, 0, c]],
                out[[0, 4 + r, 0, 0, c]],
                epsilon = 1e-5,
                max_relative = 1e-4
            );
        }
    }
    Ok(())
}
