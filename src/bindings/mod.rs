mod group_conv;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::error::GroupConvError;

impl From<GroupConvError> for PyErr {
    fn from(err: GroupConvError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Lorentz group-equivariant convolution layers in Rust
#[pymodule]
pub fn lorentz_equivariant(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    // Group convolution layers
    group_conv::register(m)?;
    Ok(())
}
