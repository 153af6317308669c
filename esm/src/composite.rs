//! Fixed-width values written field by field.
//!
//! A [`Composite`] is the unit the writer emits with `write_t`/`write_hnt`
//! and the reader decodes with `get_t`/`get_ht`: a little-endian sequence of
//! primitive fields with a size known up front. Record structs such as
//! weapon data or AI settings implement it by chaining their fields.

/// A value with a fixed little-endian wire layout.
pub trait Composite: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Appends exactly [`Self::SIZE`] bytes to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Decodes from the front of `input`, advancing it by [`Self::SIZE`].
    ///
    /// Missing bytes decode as zero; the reader always supplies a full
    /// buffer.
    fn decode(input: &mut &[u8]) -> Self;
}

/// Takes `N` bytes from the front of `input`, zero-filling a short tail.
pub fn take_array<const N: usize>(input: &mut &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let len = N.min(input.len());
    let (head, rest) = input.split_at(len);
    out[..len].copy_from_slice(head);
    *input = rest;
    out
}

/// Writes `n` zero bytes of padding.
pub fn encode_padding(out: &mut Vec<u8>, n: usize) {
    out.resize(out.len() + n, 0);
}

/// Skips `n` bytes of padding.
pub fn decode_padding(input: &mut &[u8], n: usize) {
    let len = n.min(input.len());
    *input = &input[len..];
}

macro_rules! impl_composite_for_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Composite for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn encode(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn decode(input: &mut &[u8]) -> Self {
                    Self::from_le_bytes(take_array(input))
                }
            }
        )*
    };
}

impl_composite_for_numeric!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Composite for bool {
    const SIZE: usize = 1;

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn decode(input: &mut &[u8]) -> Self {
        u8::decode(input) != 0
    }
}

impl<T: Composite, const N: usize> Composite for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn encode(&self, out: &mut Vec<u8>) {
        for item in self {
            item.encode(out);
        }
    }

    fn decode(input: &mut &[u8]) -> Self {
        std::array::from_fn(|_| T::decode(input))
    }
}
