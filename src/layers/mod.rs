pub mod config;
pub mod group_conv;
pub mod lorentz_fc;
pub mod p4m;
pub mod patches;

#[cfg(test)]
mod __test__;

pub use self::config::{ConvConfig, Pair};
pub use self::group_conv::{kaiming_uniform, GroupConv2d};
pub use self::lorentz_fc::{EquivariantLinear, LinearParams, LorentzFullyConnected};
pub use self::p4m::{
    lorentz_p4m_conv_p4m, lorentz_p4m_conv_p4m_with_rng, lorentz_p4m_conv_z2,
    lorentz_p4m_conv_z2_with_rng,
};
