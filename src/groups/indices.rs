//! 군 작용 인덱스 테이블 생성기
//!
//! 출력 원소 `g`와 커널 정의역의 점 `h = (s, u, v)`마다 `g^-1 · h`의
//! (안정자 인덱스, 행, 열)을 기록합니다. 변환된 커널 사본은
//! `w_g[h] = w[table[g, h]]` 로 얻어집니다.

use super::element::Element;
use super::GroupIndexTable;
use crate::error::{GroupConvError, Result};
use ndarray::Array5;

/// 입력 특징 맵이 갖는 안정자 정의역
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    /// 평면 이미지 (안정자 크기 1)
    Plane,
    /// 회전 4개
    P4,
    /// 회전 + 반사 8개
    P4M,
}

impl Domain {
    fn stabilizer(&self) -> Vec<Element> {
        match self {
            Domain::Plane => vec![Element::IDENTITY],
            Domain::P4 => (0..4).map(Element::rotation).collect(),
            Domain::P4M => (0..2)
                .flat_map(|m| (0..4).map(move |r| Element::roto_reflection(m, r)))
                .collect(),
        }
    }

    fn stabilizer_index(&self, g: &Element) -> usize {
        match self {
            Domain::Plane => 0,
            Domain::P4 => g.r as usize,
            Domain::P4M => g.m as usize * 4 + g.r as usize,
        }
    }
}

/// 커널 격자의 최소 좌표. 짝수 크기면 중심이 (-0.5, -0.5)에 놓입니다.
fn grid_min(ksize: usize) -> i32 {
    -((ksize / 2) as i32)
}

fn c4_elements(ksize: usize) -> Vec<Element> {
    if ksize % 2 == 0 {
        // 격자 중심 (-0.5, -0.5) 기준 회전
        vec![
            Element::new(0, 0, 0, 0),
            Element::new(0, 1, -1, 0),
            Element::new(0, 2, -1, -1),
            Element::new(0, 3, 0, -1),
        ]
    } else {
        (0..4).map(Element::rotation).collect()
    }
}

fn d4_elements(ksize: usize) -> Result<Vec<Element>> {
    if ksize % 2 == 0 {
        return Err(GroupConvError::invalid_config(format!(
            "dihedral index tables require an odd kernel width, got {ksize}"
        )));
    }
    Ok(Domain::P4M.stabilizer())
}

fn build_table(outputs: &[Element], domain: Domain, ksize: usize) -> Result<GroupIndexTable> {
    if ksize == 0 {
        return Err(GroupConvError::invalid_config("kernel width must be > 0"));
    }
    let stabilizer = domain.stabilizer();
    let umin = grid_min(ksize);
    let extent = ksize as i32;
    let mut indices = Array5::<usize>::zeros((outputs.len(), stabilizer.len(), ksize, ksize, 3));

    for (o, g) in outputs.iter().enumerate() {
        let g_inv = g.inverse();
        for (s, h0) in stabilizer.iter().enumerate() {
            for i in 0..ksize {
                for j in 0..ksize {
                    let h = Element::new(h0.m, h0.r, umin + i as i32, umin + j as i32);
                    let p = g_inv.compose(&h);
                    let (pi, pj) = (p.u - umin, p.v - umin);
                    if !(0..extent).contains(&pi) || !(0..extent).contains(&pj) {
                        return Err(GroupConvError::invalid_config(format!(
                            "transformed tap ({}, {}) leaves the {ksize}x{ksize} kernel grid",
                            p.u, p.v
                        )));
                    }
                    indices[[o, s, i, j, 0]] = domain.stabilizer_index(&p);
                    indices[[o, s, i, j, 1]] = pi as usize;
                    indices[[o, s, i, j, 2]] = pj as usize;
                }
            }
        }
    }

    Ok(GroupIndexTable::from_indices(indices))
}

/// 평면 입력 -> C4 출력 (1, 4)
pub fn make_c4_z2_indices(ksize: usize) -> Result<GroupIndexTable> {
    build_table(&c4_elements(ksize), Domain::Plane, ksize)
}

/// P4 입력 -> C4 출력 (4, 4)
pub fn make_c4_p4_indices(ksize: usize) -> Result<GroupIndexTable> {
    build_table(&c4_elements(ksize), Domain::P4, ksize)
}

/// 평면 입력 -> D4 출력 (1, 8)
pub fn make_d4_z2_indices(ksize: usize) -> Result<GroupIndexTable> {
    build_table(&d4_elements(ksize)?, Domain::Plane, ksize)
}

/// P4M 입력 -> D4 출력 (8, 8)
pub fn make_d4_p4m_indices(ksize: usize) -> Result<GroupIndexTable> {
    build_table(&d4_elements(ksize)?, Domain::P4M, ksize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shapes() {
        assert_eq!(make_c4_z2_indices(3).unwrap().shape(), [4, 1, 3, 3, 3]);
        assert_eq!(make_c4_p4_indices(3).unwrap().shape(), [4, 4, 3, 3, 3]);
        assert_eq!(make_d4_z2_indices(5).unwrap().shape(), [8, 1, 5, 5, 3]);
        assert_eq!(make_d4_p4m_indices(3).unwrap().shape(), [8, 8, 3, 3, 3]);
    }

    #[test]
    fn test_identity_element_is_identity_map() {
        let table = make_d4_p4m_indices(3).unwrap();
        for s in 0..8 {
            for i in 0..3 {
                for j in 0..3 {
                    assert_eq!(table.entry(0, s, i, j), (s, i, j));
                }
            }
        }
    }

    #[test]
    fn test_c4_z2_quarter_turn() {
        let table = make_c4_z2_indices(3).unwrap();
        // g = 90도 회전, g^-1 (u, v) = (v, -u); 격자 (0, 0) = (-1, -1) -> (-1, 1) = 격자 (0, 2)
        assert_eq!(table.entry(1, 0, 0, 0), (0, 0, 2));
        // 중심은 고정
        assert_eq!(table.entry(1, 0, 1, 1), (0, 1, 1));
        // 평면 입력의 안정자 인덱스는 항상 0
        for o in 0..4 {
            for i in 0..3 {
                for j in 0..3 {
                    assert_eq!(table.entry(o, 0, i, j).0, 0);
                }
            }
        }
    }

    #[test]
    fn test_c4_p4_cycles_rotation_channel() {
        let table = make_c4_p4_indices(3).unwrap();
        // g^-1 · r_s = r_{s - g}
        for g in 0..4 {
            for s in 0..4 {
                assert_eq!(table.entry(g, s, 1, 1).0, (s + 4 - g) % 4);
            }
        }
    }

    #[test]
    fn test_even_kernels() {
        let table = make_c4_z2_indices(2).unwrap();
        assert_eq!(table.shape(), [4, 1, 2, 2, 3]);
        assert!(table.tap_permutations().is_ok());

        let err = make_d4_z2_indices(4).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_kernel_rejected() {
        assert!(make_c4_z2_indices(0).is_err());
    }
}
