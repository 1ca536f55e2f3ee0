//! Element kernels shared by the collective algorithms: combining two values
//! under a `ReduceOp` and the little-endian payload encoding.

use crate::error::{Result, RingweaveError};
use crate::types::ReduceOp;

/// Numeric element that can travel in a collective payload.
pub trait Element: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Encoded size of one element in bytes.
    const SIZE: usize;

    /// Short type name used in log fields.
    const NAME: &'static str;

    fn combine(a: Self, b: Self, op: ReduceOp) -> Self;

    fn write_le(self, out: &mut Vec<u8>);

    /// Decode one element. `bytes` is exactly `SIZE` long.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    (int: $($ty:ty),*) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = stringify!($ty);

                #[inline]
                fn combine(a: Self, b: Self, op: ReduceOp) -> Self {
                    match op {
                        ReduceOp::Sum => a.wrapping_add(b),
                        ReduceOp::Min => a.min(b),
                        ReduceOp::Max => a.max(b),
                    }
                }

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
    (float: $($ty:ty),*) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = stringify!($ty);

                #[inline]
                fn combine(a: Self, b: Self, op: ReduceOp) -> Self {
                    match op {
                        ReduceOp::Sum => a + b,
                        ReduceOp::Min => a.min(b),
                        ReduceOp::Max => a.max(b),
                    }
                }

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element!(int: i32, i64, u32, u64);
impl_element!(float: f32, f64);

/// Encode a vector as contiguous little-endian bytes.
pub fn encode_slice<T: Element>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * T::SIZE);
    for &v in values {
        v.write_le(&mut out);
    }
    out
}

/// Decode a payload that must hold exactly `count` elements.
pub fn decode_slice<T: Element>(bytes: &[u8], count: usize) -> Result<Vec<T>> {
    let expected = count * T::SIZE;
    if bytes.len() != expected {
        return Err(RingweaveError::BufferSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes.chunks_exact(T::SIZE).map(T::read_le).collect())
}

/// Element-wise `dst[i] = combine(dst[i], src[i])`.
///
/// Both slices must have the same length; callers validate this through
/// `decode_slice` before combining.
pub fn combine_into<T: Element>(dst: &mut [T], src: &[T], op: ReduceOp) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = T::combine(*d, s, op);
    }
}
