//! # 로렌츠 군 등변 컨볼루션
//!
//! 채널 축이 로렌츠 쌍곡면 위의 점인 특징 맵 `(B, H, W, C)`를 받아
//! `(B, G, H_out, W_out, C_out)`을 돌려줍니다. `G`는 출력 안정자 크기입니다.
//!
//! 순전파는 다음 순서로 진행됩니다.
//! 1. 슬라이딩 윈도우 패치 추출
//! 2. 시간 탭 클램프/재스케일 + 공간 탭 채널 우선 재배치
//! 3. 군 인덱스 테이블로 방향별 패치 사본 생성
//! 4. 로렌츠 선형 레이어
//! 5. `(B, G, H_out, W_out, C_out)`으로 reshape

use crate::error::{GroupConvError, Result};
use crate::groups::{GroupIndexTable, GroupPair};
use crate::layers::config::ConvConfig;
use crate::layers::lorentz_fc::{EquivariantLinear, LinearParams, LorentzFullyConnected};
use crate::layers::patches;
use crate::manifold::Manifold;
use ndarray::{Array1, Array2, Array5, ArrayView2, ArrayView4};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// 가중치와 bias를 `[-stdv, stdv]`에서 균등 추출합니다.
/// `stdv = sqrt(2 / ((in_channels - 1) * kernel_h * kernel_w))`, 시간 좌표는 fan-in에서 제외.
/// 설정이 유효하지 않으면 `fan_in`이 0이 되므로 먼저 검증합니다.
pub fn kaiming_uniform<R: Rng + ?Sized>(config: &ConvConfig, rng: &mut R) -> Result<LinearParams> {
    config.validate()?;
    let fan_in = ((config.in_channels - 1) * config.kernel_len()) as f32;
    let stdv = (2.0 / fan_in).sqrt();
    let dist = Uniform::new_inclusive(-stdv, stdv);

    let weight = Array2::random_using((config.out_channels, config.linear_in_features()), dist, rng);
    let bias = if config.bias {
        Some(Array1::random_using(config.out_channels, dist, rng))
    } else {
        None
    };
    Ok(LinearParams { weight, bias })
}

#[derive(Debug)]
pub struct GroupConv2d<L = LorentzFullyConnected> {
    pair: GroupPair,
    config: ConvConfig,
    manifold: Arc<dyn Manifold>,
    linear: L,
    index_table: GroupIndexTable,
    tap_permutations: Array2<usize>,
}

impl GroupConv2d<LorentzFullyConnected> {
    pub fn new(
        input_stabilizer_size: usize,
        output_stabilizer_size: usize,
        manifold: Arc<dyn Manifold>,
        config: ConvConfig,
    ) -> Result<Self> {
        Self::new_with_rng(
            input_stabilizer_size,
            output_stabilizer_size,
            manifold,
            config,
            &mut rand::thread_rng(),
        )
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        input_stabilizer_size: usize,
        output_stabilizer_size: usize,
        manifold: Arc<dyn Manifold>,
        config: ConvConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let pair = GroupPair::from_stabilizer_sizes(input_stabilizer_size, output_stabilizer_size)?;
        let params = kaiming_uniform(&config, rng)?;
        Self::with_parameters(pair, manifold, config, params)
    }
}

impl<L: EquivariantLinear> GroupConv2d<L> {
    pub fn with_parameters(
        pair: GroupPair,
        manifold: Arc<dyn Manifold>,
        config: ConvConfig,
        params: LinearParams,
    ) -> Result<Self> {
        config.validate()?;
        let index_table = pair.make_indices(config.kernel_size.w)?;
        Self::with_index_table(pair, manifold, config, params, index_table)
    }

    /// 외부에서 만든 인덱스 테이블로 레이어를 구성합니다.
    /// 테이블이 커널 탭을 정확히 덮지 않으면 `ShapeMismatch`를 돌려줍니다.
    pub fn with_index_table(
        pair: GroupPair,
        manifold: Arc<dyn Manifold>,
        config: ConvConfig,
        params: LinearParams,
        index_table: GroupIndexTable,
    ) -> Result<Self> {
        config.validate()?;
        let k = manifold.k();
        if !(k.is_finite() && k > 0.0) {
            return Err(GroupConvError::invalid_config(format!(
                "curvature must be positive and finite, got {k}"
            )));
        }

        index_table.check_consistency(pair, config.kernel_size.as_tuple())?;
        let tap_permutations = index_table.tap_permutations()?;

        let expected = [config.out_channels, config.linear_in_features()];
        let actual = [params.out_features(), params.in_features()];
        if expected != actual {
            return Err(GroupConvError::shape_mismatch("linear weight", &expected, &actual));
        }
        if params.bias.is_some() != config.bias {
            return Err(GroupConvError::invalid_config(format!(
                "bias flag is {} but parameters {} a bias",
                config.bias,
                if params.bias.is_some() { "carry" } else { "lack" }
            )));
        }

        let linear = L::from_parameters(Arc::clone(&manifold), params, config.normalize)?;

        debug!(
            input_stabilizer = pair.input_stabilizer_size(),
            output_stabilizer = pair.output_stabilizer_size(),
            kernel = ?config.kernel_size.as_tuple(),
            in_features = config.linear_in_features(),
            out_features = config.out_channels,
            "built group lorentz conv"
        );

        Ok(Self {
            pair,
            config,
            manifold,
            linear,
            index_table,
            tap_permutations,
        })
    }

    pub fn config(&self) -> &ConvConfig {
        &self.config
    }

    pub fn group_pair(&self) -> GroupPair {
        self.pair
    }

    pub fn manifold(&self) -> &Arc<dyn Manifold> {
        &self.manifold
    }

    pub fn linear(&self) -> &L {
        &self.linear
    }

    pub fn index_table(&self) -> &GroupIndexTable {
        &self.index_table
    }

    pub fn tap_permutations(&self) -> ArrayView2<'_, usize> {
        self.tap_permutations.view()
    }

    pub fn kernel_len(&self) -> usize {
        self.config.kernel_len()
    }

    pub fn linear_in_features(&self) -> usize {
        self.config.linear_in_features()
    }

    pub fn output_size(&self, h: usize, w: usize) -> Result<(usize, usize)> {
        patches::output_size(&self.config, h, w)
    }

    /// `(B, H, W, C)` -> `(B, G, H_out, W_out, C_out)`
    pub fn forward(&self, input: &ArrayView4<f32>) -> Result<Array5<f32>> {
        let (batch, h, w, channels) = input.dim();
        if channels != self.config.in_channels {
            return Err(GroupConvError::shape_mismatch(
                "input channels",
                &[batch, h, w, self.config.in_channels],
                &[batch, h, w, channels],
            ));
        }
        let (h_out, w_out) = self.output_size(h, w)?;
        let orientations = self.pair.output_stabilizer_size();
        let out_channels = self.config.out_channels;

        let extracted = patches::extract_patches(input, &self.config)?;
        let reassembled = patches::reassemble_patches(
            &extracted.view(),
            self.config.in_channels,
            self.kernel_len(),
            self.manifold.k(),
        )?;
        let oriented = patches::expand_orientations(&reassembled.view(), &self.tap_permutations.view())?;
        let out = self.linear.forward(&oriented.view())?;

        let expected = [batch, orientations * h_out * w_out, out_channels];
        if out.shape() != expected {
            return Err(GroupConvError::shape_mismatch("output reshape", &expected, out.shape()));
        }
        let actual = out.shape().to_vec();
        let out = out
            .into_shape((batch, orientations, h_out, w_out, out_channels))
            .map_err(|_| GroupConvError::shape_mismatch("output reshape", &expected, &actual))?;

        debug!(input = ?(batch, h, w, channels), output = ?out.dim(), "group lorentz conv forward");
        Ok(out)
    }
}
