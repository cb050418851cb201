use std::fmt;
use std::iter::Sum;

use ndarray::{NdFloat, ScalarOperand};
use num_traits::{FromPrimitive, NumAssignOps, NumCast};

/// Floating point numbers
///
/// Bundles the assumptions the mixture code makes about its scalar type and is implemented for
/// 32bit and 64bit floating points. Points, means, covariances and weights all share it.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + NdFloat
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Sum
    + NumAssignOps
    + ScalarOperand
    + approx::AbsDiffEq<Epsilon = Self>
    + 'static
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}
impl Float for f64 {}
