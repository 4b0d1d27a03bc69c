// src/bindings/group_conv.rs

//! # GroupConv2d를 위한 Python 바인딩
//!
//! `(B, H, W, C)` numpy 배열을 받아 `(B, G, H_out, W_out, C_out)`을 돌려줍니다.
//! 정수 하나 또는 `(h, w)` 튜플을 커널/스트라이드/패딩/팽창 인자로 받습니다.

use numpy::{IntoPyArray, PyArray1, PyArray2, PyArray5, PyReadonlyArray4, ToPyArray};
use pyo3::prelude::*;
use std::sync::Arc;

use crate::error::Result;
use crate::layers::{ConvConfig, EquivariantLinear, GroupConv2d, Pair};
use crate::manifold::{Lorentz, Manifold};

#[derive(FromPyObject)]
pub enum PairArg {
    Int(usize),
    Pair((usize, usize)),
}

impl From<PairArg> for Pair {
    fn from(arg: PairArg) -> Self {
        match arg {
            PairArg::Int(v) => Pair::from(v),
            PairArg::Pair(hw) => Pair::from(hw),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    input_stabilizer_size: usize,
    output_stabilizer_size: usize,
    k: f32,
    in_channels: usize,
    out_channels: usize,
    kernel_size: PairArg,
    stride: PairArg,
    padding: PairArg,
    dilation: PairArg,
    bias: bool,
    normalize: bool,
) -> Result<GroupConv2d> {
    let manifold: Arc<dyn Manifold> = Arc::new(Lorentz::new(k)?);
    let config = ConvConfig::new(in_channels, out_channels, kernel_size)
        .stride(stride)
        .padding(padding)
        .dilation(dilation)
        .bias(bias)
        .normalize(normalize);
    GroupConv2d::new(input_stabilizer_size, output_stabilizer_size, manifold, config)
}

#[pyclass(name = "GroupLorentzConv2d", module = "lorentz_equivariant")]
pub struct PyGroupLorentzConv2d {
    inner: GroupConv2d,
}

#[pymethods]
impl PyGroupLorentzConv2d {
    #[new]
    #[pyo3(signature = (
        input_stabilizer_size,
        output_stabilizer_size,
        in_channels,
        out_channels,
        kernel_size,
        k=1.0,
        stride=PairArg::Int(1),
        padding=PairArg::Int(0),
        dilation=PairArg::Int(1),
        bias=true,
        normalize=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        input_stabilizer_size: usize,
        output_stabilizer_size: usize,
        in_channels: usize,
        out_channels: usize,
        kernel_size: PairArg,
        k: f32,
        stride: PairArg,
        padding: PairArg,
        dilation: PairArg,
        bias: bool,
        normalize: bool,
    ) -> PyResult<Self> {
        let inner = build(
            input_stabilizer_size,
            output_stabilizer_size,
            k,
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            dilation,
            bias,
            normalize,
        )?;
        Ok(Self { inner })
    }

    /// 평면 이미지 -> p4m (1, 8)
    #[staticmethod]
    #[pyo3(
        name = "LorentzP4MConvZ2",
        signature = (in_channels, out_channels, kernel_size, k=1.0, stride=PairArg::Int(1), padding=PairArg::Int(0), dilation=PairArg::Int(1), bias=true, normalize=false)
    )]
    #[allow(clippy::too_many_arguments)]
    fn lorentz_p4m_conv_z2(
        in_channels: usize,
        out_channels: usize,
        kernel_size: PairArg,
        k: f32,
        stride: PairArg,
        padding: PairArg,
        dilation: PairArg,
        bias: bool,
        normalize: bool,
    ) -> PyResult<Self> {
        let inner = build(
            1, 8, k, in_channels, out_channels, kernel_size, stride, padding, dilation, bias, normalize,
        )?;
        Ok(Self { inner })
    }

    /// p4m -> p4m (8, 8)
    #[staticmethod]
    #[pyo3(
        name = "LorentzP4MConvP4M",
        signature = (in_channels, out_channels, kernel_size, k=1.0, stride=PairArg::Int(1), padding=PairArg::Int(0), dilation=PairArg::Int(1), bias=true, normalize=false)
    )]
    #[allow(clippy::too_many_arguments)]
    fn lorentz_p4m_conv_p4m(
        in_channels: usize,
        out_channels: usize,
        kernel_size: PairArg,
        k: f32,
        stride: PairArg,
        padding: PairArg,
        dilation: PairArg,
        bias: bool,
        normalize: bool,
    ) -> PyResult<Self> {
        let inner = build(
            8, 8, k, in_channels, out_channels, kernel_size, stride, padding, dilation, bias, normalize,
        )?;
        Ok(Self { inner })
    }

    /// `(B, H, W, C)` -> `(B, G, H_out, W_out, C_out)`
    pub fn forward<'py>(&self, py: Python<'py>, x: PyReadonlyArray4<'py, f32>) -> PyResult<&'py PyArray5<f32>> {
        let input = x.as_array().to_owned();
        // 연산 동안 GIL 해제
        let out = py.allow_threads(|| self.inner.forward(&input.view()))?;
        Ok(out.into_pyarray(py))
    }

    pub fn __call__<'py>(&self, py: Python<'py>, x: PyReadonlyArray4<'py, f32>) -> PyResult<&'py PyArray5<f32>> {
        self.forward(py, x)
    }

    pub fn output_size(&self, h: usize, w: usize) -> PyResult<(usize, usize)> {
        Ok(self.inner.output_size(h, w)?)
    }

    #[getter]
    pub fn weight<'py>(&self, py: Python<'py>) -> &'py PyArray2<f32> {
        self.inner.linear().parameters().weight.to_pyarray(py)
    }

    #[getter]
    pub fn bias<'py>(&self, py: Python<'py>) -> Option<&'py PyArray1<f32>> {
        self.inner
            .linear()
            .parameters()
            .bias
            .as_ref()
            .map(|b| b.to_pyarray(py))
    }

    #[getter]
    pub fn curvature(&self) -> f32 {
        self.inner.manifold().k()
    }

    #[getter]
    pub fn input_stabilizer_size(&self) -> usize {
        self.inner.group_pair().input_stabilizer_size()
    }

    #[getter]
    pub fn output_stabilizer_size(&self) -> usize {
        self.inner.group_pair().output_stabilizer_size()
    }

    #[getter]
    pub fn kernel_size(&self) -> (usize, usize) {
        self.inner.config().kernel_size.as_tuple()
    }

    fn __repr__(&self) -> String {
        let config = self.inner.config();
        format!(
            "GroupLorentzConv2d(stabilizers=({}, {}), in_channels={}, out_channels={}, kernel_size={:?}, k={})",
            self.input_stabilizer_size(),
            self.output_stabilizer_size(),
            config.in_channels,
            config.out_channels,
            config.kernel_size.as_tuple(),
            self.curvature(),
        )
    }
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_class::<PyGroupLorentzConv2d>()?;
    Ok(())
}
