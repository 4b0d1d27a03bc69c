pub mod batch;
pub mod lorentz;

pub use self::batch::norm_sq_batched;
pub use self::lorentz::{add_time, clamp_time, lorentz_inner, rescale_time, time_radicand};
