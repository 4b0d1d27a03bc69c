//! # 평면 대칭군과 군 작용 인덱스 테이블
//!
//! 지원되는 (입력 안정자 크기, 출력 안정자 크기) 조합은 닫힌 집합입니다.
//! 각 조합은 [`GroupPair`]의 한 변형이며, 자신만의 테이블 생성기를 가집니다.

pub mod element;
pub mod indices;

use crate::error::{GroupConvError, Result};
use ndarray::{Array2, Array5, ArrayView5};

pub use self::element::Element;

pub type IndexGenerator = fn(usize) -> Result<GroupIndexTable>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupPair {
    /// (1, 4): 평면 이미지 -> 4방향 회전
    C4Z2,
    /// (4, 4)
    C4P4,
    /// (1, 8): 평면 이미지 -> 회전 + 반사
    D4Z2,
    /// (8, 8)
    D4P4M,
}

impl GroupPair {
    pub const ALL: [GroupPair; 4] = [
        GroupPair::C4Z2,
        GroupPair::C4P4,
        GroupPair::D4Z2,
        GroupPair::D4P4M,
    ];

    pub fn from_stabilizer_sizes(input: usize, output: usize) -> Result<Self> {
        match (input, output) {
            (1, 4) => Ok(GroupPair::C4Z2),
            (4, 4) => Ok(GroupPair::C4P4),
            (1, 8) => Ok(GroupPair::D4Z2),
            (8, 8) => Ok(GroupPair::D4P4M),
            _ => Err(GroupConvError::UnsupportedStabilizers { input, output }),
        }
    }

    pub fn input_stabilizer_size(self) -> usize {
        match self {
            GroupPair::C4Z2 | GroupPair::D4Z2 => 1,
            GroupPair::C4P4 => 4,
            GroupPair::D4P4M => 8,
        }
    }

    pub fn output_stabilizer_size(self) -> usize {
        match self {
            GroupPair::C4Z2 | GroupPair::C4P4 => 4,
            GroupPair::D4Z2 | GroupPair::D4P4M => 8,
        }
    }

    pub fn generator(self) -> IndexGenerator {
        match self {
            GroupPair::C4Z2 => indices::make_c4_z2_indices,
            GroupPair::C4P4 => indices::make_c4_p4_indices,
            GroupPair::D4Z2 => indices::make_d4_z2_indices,
            GroupPair::D4P4M => indices::make_d4_p4m_indices,
        }
    }

    pub fn make_indices(self, kernel_width: usize) -> Result<GroupIndexTable> {
        (self.generator())(kernel_width)
    }
}

/// `(output, input, kernel_row, kernel_col, 3)` 형태의 정수 테이블.
/// 마지막 축은 (안정자 인덱스, 행, 열)입니다. 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndexTable {
    indices: Array5<usize>,
}

impl GroupIndexTable {
    pub(crate) fn from_indices(indices: Array5<usize>) -> Self {
        Self { indices }
    }

    pub fn shape(&self) -> [usize; 5] {
        let s = self.indices.shape();
        [s[0], s[1], s[2], s[3], s[4]]
    }

    pub fn output_stabilizer_size(&self) -> usize {
        self.indices.shape()[0]
    }

    pub fn input_stabilizer_size(&self) -> usize {
        self.indices.shape()[1]
    }

    pub fn kernel_size(&self) -> (usize, usize) {
        (self.indices.shape()[2], self.indices.shape()[3])
    }

    pub fn kernel_len(&self) -> usize {
        let (kh, kw) = self.kernel_size();
        kh * kw
    }

    pub fn indices(&self) -> ArrayView5<'_, usize> {
        self.indices.view()
    }

    pub fn entry(&self, output: usize, input: usize, row: usize, col: usize) -> (usize, usize, usize) {
        (
            self.indices[[output, input, row, col, 0]],
            self.indices[[output, input, row, col, 1]],
            self.indices[[output, input, row, col, 2]],
        )
    }

    /// 테이블이 주어진 조합과 커널을 정확히 덮는지 확인합니다.
    pub fn check_consistency(&self, pair: GroupPair, kernel: (usize, usize)) -> Result<()> {
        let expected = [
            pair.output_stabilizer_size(),
            pair.input_stabilizer_size(),
            kernel.0,
            kernel.1,
        ];
        let shape = self.shape();
        if shape[..4] != expected || shape[4] != 3 {
            return Err(GroupConvError::shape_mismatch(
                "group index table",
                &[expected[0], expected[1], expected[2], expected[3], 3],
                &shape,
            ));
        }
        Ok(())
    }

    /// 출력 원소마다 커널 탭의 치환을 만듭니다.
    ///
    /// `perm[[g, x]] = y` 는 탭 `x`의 값이 `g`번째 방향에서 탭 `y` 자리로
    /// 옮겨진다는 뜻입니다. 안정자 성분은 항등 입력 원소(0번) 조각을 사용합니다.
    pub fn tap_permutations(&self) -> Result<Array2<usize>> {
        let (kh, kw) = self.kernel_size();
        let outputs = self.output_stabilizer_size();
        let kernel_len = kh * kw;
        let mut perm = Array2::<usize>::zeros((outputs, kernel_len));

        for o in 0..outputs {
            let mut seen = vec![false; kernel_len];
            for i in 0..kh {
                for j in 0..kw {
                    let (_, ti, tj) = self.entry(o, 0, i, j);
                    if ti >= kh || tj >= kw {
                        return Err(GroupConvError::shape_mismatch(
                            "group index table entry",
                            &[kh, kw],
                            &[ti + 1, tj + 1],
                        ));
                    }
                    let target = ti * kw + tj;
                    if std::mem::replace(&mut seen[target], true) {
                        // 두 탭이 같은 자리로 가면 치환이 아님
                        return Err(GroupConvError::shape_mismatch(
                            "group index table permutation",
                            &[kernel_len],
                            &[seen.iter().filter(|&&hit| hit).count()],
                        ));
                    }
                    perm[[o, i * kw + j]] = target;
                }
            }
        }
        Ok(perm)
    }
}
