//! p4 / p4m 군 원소의 정수 아핀 표현
//!
//! 원소 `(m, r, u, v)`는 행렬
//! `[[(-1)^m cos, -(-1)^m sin, u], [sin, cos, v], [0, 0, 1]]`
//! 으로 표현됩니다 (각도는 `r * 90°`). p4 원소는 `m = 0`인 경우입니다.

const COS: [i32; 4] = [1, 0, -1, 0];
const SIN: [i32; 4] = [0, 1, 0, -1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    /// 반사 여부 (0 또는 1)
    pub m: u8,
    /// 90도 회전 횟수 (0..4)
    pub r: u8,
    pub u: i32,
    pub v: i32,
}

impl Element {
    pub const IDENTITY: Element = Element { m: 0, r: 0, u: 0, v: 0 };

    pub fn new(m: u8, r: u8, u: i32, v: i32) -> Self {
        Self { m: m % 2, r: r % 4, u, v }
    }

    pub fn rotation(r: u8) -> Self {
        Self::new(0, r, 0, 0)
    }

    pub fn roto_reflection(m: u8, r: u8) -> Self {
        Self::new(m, r, 0, 0)
    }

    fn linear(&self) -> [[i32; 2]; 2] {
        let c = COS[self.r as usize];
        let s = SIN[self.r as usize];
        let sign = if self.m == 1 { -1 } else { 1 };
        [[sign * c, -sign * s], [s, c]]
    }

    fn from_affine(a: [[i32; 2]; 2], t: [i32; 2]) -> Self {
        let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
        let m = if det < 0 { 1 } else { 0 };
        // 두 번째 행은 반사와 무관하게 (sin, cos)
        let r = match (a[1][0], a[1][1]) {
            (0, 1) => 0,
            (1, 0) => 1,
            (0, -1) => 2,
            (-1, 0) => 3,
            other => unreachable!("non-orthogonal linear part {:?}", other),
        };
        Self { m, r, u: t[0], v: t[1] }
    }

    /// self ∘ other
    pub fn compose(&self, other: &Element) -> Element {
        let a = self.linear();
        let b = other.linear();
        let mut ab = [[0; 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                ab[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j];
            }
        }
        let t = [
            a[0][0] * other.u + a[0][1] * other.v + self.u,
            a[1][0] * other.u + a[1][1] * other.v + self.v,
        ];
        Element::from_affine(ab, t)
    }

    pub fn inverse(&self) -> Element {
        let a = self.linear();
        // 직교 행렬이므로 역행렬은 전치
        let at = [[a[0][0], a[1][0]], [a[0][1], a[1][1]]];
        let t = [
            -(at[0][0] * self.u + at[0][1] * self.v),
            -(at[1][0] * self.u + at[1][1] * self.v),
        ];
        Element::from_affine(at, t)
    }

    /// 평면 위의 점 (u, v)에 작용
    pub fn apply(&self, point: (i32, i32)) -> (i32, i32) {
        let a = self.linear();
        (
            a[0][0] * point.0 + a[0][1] * point.1 + self.u,
            a[1][0] * point.0 + a[1][1] * point.1 + self.v,
        )
    }
}
