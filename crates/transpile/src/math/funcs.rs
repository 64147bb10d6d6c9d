//! The tensor-function registry.
//!
//! The source language has no static types, so the walker cannot know
//! whether an integer literal should stay integral or become a scalar
//! tensor. Per-argument flags on each registered function carry that
//! information: the registry is written once at startup and read-only
//! afterwards.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Flags for one formal argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Arg {
    /// Literal children are wrapped into scalar tensors.
    pub tensor: bool,
    /// The argument is a plain integer (a dimension, an index).
    pub int: bool,
    /// The argument repeats; the final flag set applies to all
    /// remaining arguments.
    pub variadic: bool,
}

/// Plain tensor argument.
const T: Arg = Arg {
    tensor: true,
    int: false,
    variadic: false,
};
/// Uncoerced argument (strings, bools, pre-shaped values).
const P: Arg = Arg {
    tensor: false,
    int: false,
    variadic: false,
};
/// Integer argument.
const I: Arg = Arg {
    tensor: false,
    int: true,
    variadic: false,
};
/// Variadic integers (shapes, index vectors).
const IV: Arg = Arg {
    tensor: false,
    int: true,
    variadic: true,
};
/// Variadic uncoerced arguments.
const PV: Arg = Arg {
    tensor: false,
    int: false,
    variadic: true,
};
/// Variadic tensors.
const TV: Arg = Arg {
    tensor: true,
    int: false,
    variadic: true,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct FuncInfo {
    pub args: &'static [Arg],
}

macro_rules! funcs {
    ($($name:literal => [$($arg:expr),*]),* $(,)?) => {
        [$(($name, FuncInfo { args: &[$($arg),*] })),*]
    };
}

/// Registered functions, keyed by fully-qualified name.
static FUNCS: Lazy<HashMap<&'static str, FuncInfo>> = Lazy::new(|| {
    funcs![
        // Element-wise binary math.
        "tmath.Add" => [T, T],
        "tmath.Sub" => [T, T],
        "tmath.Mul" => [T, T],
        "tmath.Div" => [T, T],
        "tmath.Mod" => [T, T],
        "tmath.Pow" => [T, T],
        "tmath.Atan2" => [T, T],
        "tmath.Min" => [T, T],
        "tmath.Max" => [T, T],
        // Comparisons and logic.
        "tmath.Equal" => [T, T],
        "tmath.NotEqual" => [T, T],
        "tmath.Less" => [T, T],
        "tmath.LessEqual" => [T, T],
        "tmath.Greater" => [T, T],
        "tmath.GreaterEqual" => [T, T],
        "tmath.And" => [T, T],
        "tmath.Or" => [T, T],
        "tmath.Not" => [T],
        "tmath.Negate" => [T],
        // Element-wise unary math.
        "tmath.Abs" => [T],
        "tmath.Ceil" => [T],
        "tmath.Floor" => [T],
        "tmath.Round" => [T],
        "tmath.Sqrt" => [T],
        "tmath.Exp" => [T],
        "tmath.Log" => [T],
        "tmath.Log2" => [T],
        "tmath.Log10" => [T],
        "tmath.Sin" => [T],
        "tmath.Cos" => [T],
        "tmath.Tan" => [T],
        "tmath.Asin" => [T],
        "tmath.Acos" => [T],
        "tmath.Atan" => [T],
        "tmath.Sinh" => [T],
        "tmath.Cosh" => [T],
        "tmath.Tanh" => [T],
        // Assigning variants.
        "tmath.Assign" => [T, T],
        "tmath.AddAssign" => [T, T],
        "tmath.SubAssign" => [T, T],
        "tmath.MulAssign" => [T, T],
        "tmath.DivAssign" => [T, T],
        "tmath.Inc" => [T],
        "tmath.Dec" => [T],
        // Statistics.
        "stats.Mean" => [T],
        "stats.Median" => [T],
        "stats.Std" => [T],
        "stats.Var" => [T],
        "stats.Sum" => [T],
        "stats.Prod" => [T],
        "stats.Min" => [T],
        "stats.Max" => [T],
        "stats.Count" => [T],
        "stats.Quantile" => [T, T],
        "stats.Matrix" => [T],
        // Matrix algebra.
        "matrix.Mul" => [T, T],
        "matrix.Det" => [T],
        "matrix.Inverse" => [T],
        "matrix.Trace" => [T],
        "matrix.Diag" => [T],
        "matrix.Identity" => [I],
        // Constructors and shape ops.
        "tensor.Tensor" => [T],
        "tensor.NewIntScalar" => [P],
        "tensor.NewFloat64Scalar" => [P],
        "tensor.NewStringScalar" => [P],
        "tensor.NewIntFromValues" => [PV],
        "tensor.NewFloat64FromValues" => [PV],
        "tensor.NewStringFromValues" => [PV],
        "tensor.NewFloat64" => [IV],
        "tensor.NewFloat64Ones" => [IV],
        "tensor.NewFloat64Rand" => [IV],
        "tensor.NewFloat64Full" => [P, IV],
        "tensor.NewIntRange" => [IV],
        "tensor.NewFloat64SpacedLinear" => [P, P, I, P],
        "tensor.Reshape" => [T, IV],
        "tensor.Clone" => [T],
        "tensor.Flatten" => [T],
        "tensor.Squeeze" => [T],
        "tensor.Transpose" => [T],
        "tensor.Reslice" => [T, PV],
        "tensor.Mask" => [T, T],
        "tensor.AsIntSlice" => [T],
        "tensor.Call" => [P, TV],
        "tensor.CallOut" => [P, TV],
        "tensor.FuncByName" => [P],
        "tensor.AddFunc" => [P, P],
        // Data filesystem.
        "datafs.Get" => [P],
        "datafs.Set" => [P, T],
        "datafs.Record" => [T, P],
        "datafs.Cd" => [P],
        "datafs.List" => [PV],
        "datafs.Mkdir" => [P],
    ]
    .into_iter()
    .collect()
});

/// Free function names remapped to library constructors.
static FREE_FNS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("zeros", "tensor.NewFloat64"),
        ("ones", "tensor.NewFloat64Ones"),
        ("rand", "tensor.NewFloat64Rand"),
        ("full", "tensor.NewFloat64Full"),
        ("arange", "tensor.NewIntRange"),
        ("linspace", "tensor.NewFloat64SpacedLinear"),
        ("reshape", "tensor.Reshape"),
        ("copy", "tensor.Clone"),
        ("flatten", "tensor.Flatten"),
        ("squeeze", "tensor.Squeeze"),
        ("transpose", "tensor.Transpose"),
        ("get", "datafs.Get"),
        ("set", "datafs.Set"),
    ]
    .into_iter()
    .collect()
});

/// Tensor properties readable without call syntax (`a.ndim`), and the
/// method/wrapper pair each one maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Property {
    /// `tensor.NewIntScalar(x.NumDims())`
    NumDims,
    /// `tensor.NewIntScalar(x.Len())`
    Len,
    /// `tensor.NewIntFromValues(x.Shape().Sizes...)`
    Shape,
}

pub(crate) fn lookup(qualified: &str) -> Option<&'static FuncInfo> {
    FUNCS.get(qualified)
}

/// An unqualified lowercase name falls back to the `tmath` package:
/// `cos(x)` resolves to `tmath.Cos`.
pub(crate) fn lookup_unqualified(name: &str) -> Option<(&'static str, &'static FuncInfo)> {
    let lower = name.to_ascii_lowercase();
    FUNCS
        .iter()
        .find(|(k, _)| {
            k.strip_prefix("tmath.")
                .map_or(false, |f| f.to_ascii_lowercase() == lower)
        })
        .map(|(k, v)| (*k, v))
}

pub(crate) fn free_fn(name: &str) -> Option<&'static str> {
    FREE_FNS.get(name).copied()
}

pub(crate) fn property(name: &str) -> Option<Property> {
    match name {
        "ndim" => Some(Property::NumDims),
        "len" | "size" => Some(Property::Len),
        "shape" => Some(Property::Shape),
        _ => None,
    }
}

/// Selector calls that remap to free library calls with the receiver
/// as first argument: `x.reshape(…)` → `tensor.Reshape(x, …)`.
pub(crate) fn method(name: &str) -> Option<&'static str> {
    match name {
        "reshape" | "copy" | "flatten" | "squeeze" | "transpose" => free_fn(name),
        _ => None,
    }
}
