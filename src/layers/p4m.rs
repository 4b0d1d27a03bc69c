//! 고정된 안정자 크기를 가진 프리셋
//!
//! - `lorentz_p4m_conv_z2`: 평면 이미지 -> p4m (1, 8). 첫 번째 레이어용.
//! - `lorentz_p4m_conv_p4m`: p4m -> p4m (8, 8). 이후 레이어용.

use crate::error::Result;
use crate::layers::config::ConvConfig;
use crate::layers::group_conv::GroupConv2d;
use crate::manifold::Manifold;
use rand::Rng;
use std::sync::Arc;

pub fn lorentz_p4m_conv_z2(manifold: Arc<dyn Manifold>, config: ConvConfig) -> Result<GroupConv2d> {
    GroupConv2d::new(1, 8, manifold, config)
}

pub fn lorentz_p4m_conv_p4m(manifold: Arc<dyn Manifold>, config: ConvConfig) -> Result<GroupConv2d> {
    GroupConv2d::new(8, 8, manifold, config)
}

pub fn lorentz_p4m_conv_z2_with_rng<R: Rng + ?Sized>(
    manifold: Arc<dyn Manifold>,
    config: ConvConfig,
    rng: &mut R,
) -> Result<GroupConv2d> {
    GroupConv2d::new_with_rng(1, 8, manifold, config, rng)
}

pub fn lorentz_p4m_conv_p4m_with_rng<R: Rng + ?Sized>(
    manifold: Arc<dyn Manifold>,
    config: ConvConfig,
    rng: &mut R,
) -> Result<GroupConv2d> {
    GroupConv2d::new_with_rng(8, 8, manifold, config, rng)
}
