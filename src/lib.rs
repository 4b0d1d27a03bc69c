//! Lorentz group-equivariant convolution
//!
//! 채널 축이 로렌츠 쌍곡면 위의 점인 특징 맵에 대해 p4 / p4m 군 등변
//! 컨볼루션을 수행합니다.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lorentz_equivariant::{ConvConfig, GroupConv2d, Lorentz};
//!
//! # fn main() -> lorentz_equivariant::Result<()> {
//! let layer = GroupConv2d::new(1, 8, Arc::new(Lorentz::new(1.0)?), ConvConfig::new(3, 16, 3))?;
//! let x = ndarray::Array4::<f32>::from_elem((2, 32, 32, 3), 0.0);
//! let y = layer.forward(&x.view())?;
//! assert_eq!(y.shape(), &[2, 8, 30, 30, 16]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod groups;
pub mod layers;
pub mod manifold;
pub mod ops;

#[cfg(feature = "python")]
mod bindings;

pub use error::{GroupConvError, Result};
pub use groups::{Element, GroupIndexTable, GroupPair};
pub use layers::{
    kaiming_uniform, lorentz_p4m_conv_p4m, lorentz_p4m_conv_z2, ConvConfig, EquivariantLinear,
    GroupConv2d, LinearParams, LorentzFullyConnected, Pair,
};
pub use manifold::{Lorentz, Manifold};
