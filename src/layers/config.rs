use crate::error::{GroupConvError, Result};

/// (높이, 너비) 쌍. 정수 하나는 정사각 쌍으로 확장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    pub h: usize,
    pub w: usize,
}

impl Pair {
    pub fn new(h: usize, w: usize) -> Self {
        Self { h, w }
    }

    pub fn as_tuple(&self) -> (usize, usize) {
        (self.h, self.w)
    }
}

impl From<usize> for Pair {
    fn from(v: usize) -> Self {
        Self { h: v, w: v }
    }
}

impl From<(usize, usize)> for Pair {
    fn from((h, w): (usize, usize)) -> Self {
        Self { h, w }
    }
}

/// 그룹 컨볼루션 레이어 설정. 레이어 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvConfig {
    /// 시간 성분을 포함한 입력 채널 수
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: Pair,
    pub stride: Pair,
    pub padding: Pair,
    pub dilation: Pair,
    pub bias: bool,
    /// 선형 레이어의 정규화 경로 사용 여부
    pub normalize: bool,
}

impl ConvConfig {
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: impl Into<Pair>) -> Self {
        Self {
            in_channels,
            out_channels,
            kernel_size: kernel_size.into(),
            stride: Pair::from(1),
            padding: Pair::from(0),
            dilation: Pair::from(1),
            bias: true,
            normalize: false,
        }
    }

    pub fn stride(mut self, stride: impl Into<Pair>) -> Self {
        self.stride = stride.into();
        self
    }

    pub fn padding(mut self, padding: impl Into<Pair>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn dilation(mut self, dilation: impl Into<Pair>) -> Self {
        self.dilation = dilation.into();
        self
    }

    pub fn bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn kernel_len(&self) -> usize {
        self.kernel_size.h * self.kernel_size.w
    }

    /// 하나의 시간 스칼라 + 모든 (공간 채널, 커널 탭) 조합
    pub fn linear_in_features(&self) -> usize {
        self.in_channels.saturating_sub(1) * self.kernel_len() + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.in_channels < 2 {
            return Err(GroupConvError::invalid_config(format!(
                "in_channels must include time and at least one space channel, got {}",
                self.in_channels
            )));
        }
        if self.out_channels == 0 {
            return Err(GroupConvError::invalid_config("out_channels must be > 0"));
        }
        if self.kernel_size.h == 0 || self.kernel_size.w == 0 {
            return Err(GroupConvError::invalid_config("kernel dimensions must be > 0"));
        }
        if self.kernel_size.h != self.kernel_size.w {
            return Err(GroupConvError::invalid_config(format!(
                "group index tables need a square kernel, got {}x{}",
                self.kernel_size.h, self.kernel_size.w
            )));
        }
        if self.stride.h == 0 || self.stride.w == 0 {
            return Err(GroupConvError::invalid_config("stride must be > 0"));
        }
        if self.dilation.h == 0 || self.dilation.w == 0 {
            return Err(GroupConvError::invalid_config("dilation must be > 0"));
        }
        Ok(())
    }
}
