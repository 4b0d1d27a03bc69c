use thiserror::Error;

/// 그룹 컨볼루션 레이어에서 발생하는 오류
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupConvError {
    /// (input, output) 안정자 크기 조합이 지원되지 않음
    #[error("unsupported stabilizer pair ({input}, {output}); expected one of (1,4), (4,4), (1,8), (8,8)")]
    UnsupportedStabilizers { input: usize, output: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 입력 또는 내부 중간 결과의 형상이 기대와 다름
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// 클램프 이후에도 시간 성분 재스케일의 근호 안 값이 음수이거나 유한하지 않음
    #[error("rescaled time radicand {radicand} is outside the real domain")]
    NumericDomain { radicand: f32 },
}

impl GroupConvError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn shape_mismatch(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// 생성 시점에 드러나는 설정 오류인지 여부
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedStabilizers { .. } | Self::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GroupConvError>;
