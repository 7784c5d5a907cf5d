//! Floating-point values: IEEE 754 floats and linearly quantized reals.
//!
//! Quantized reals map a documented `[min, max]` range onto an unsigned
//! integer of a fixed byte width, in the manner of MISB ST 1201 IMAP.

use bytes::{Buf, BufMut};

use crate::error::{Error, Result};

/// Resolution at which a [`Real`] is meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precision {
    /// IEEE 754 binary32.
    Single,
    /// IEEE 754 binary64.
    Double,
    /// Linear quantization with the given step size.
    Step(f64),
}

/// A real number tagged with its documented precision.
///
/// Two reals are equal when they share a precision and are
/// indistinguishable at it.
#[derive(Debug, Clone, Copy)]
pub struct Real {
    value: f64,
    precision: Precision,
}

impl Real {
    /// A real carried as a 4-byte IEEE float.
    pub fn single(value: f64) -> Self {
        Self {
            value,
            precision: Precision::Single,
        }
    }

    /// A real carried as an 8-byte IEEE float.
    pub fn double(value: f64) -> Self {
        Self {
            value,
            precision: Precision::Double,
        }
    }

    /// A real quantized with the given step.
    pub fn quantized(value: f64, step: f64) -> Self {
        Self {
            value,
            precision: Precision::Step(step),
        }
    }

    /// The real value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The precision the value is documented at.
    pub fn precision(&self) -> Precision {
        self.precision
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        match (self.precision, other.precision) {
            (Precision::Single, Precision::Single) => {
                (self.value as f32) == (other.value as f32)
            }
            (Precision::Double, Precision::Double) => self.value == other.value,
            (Precision::Step(a), Precision::Step(b)) if a == b => {
                (self.value - other.value).abs() <= a / 2.0
            }
            _ => false,
        }
    }
}

// ============================================================================
// IEEE Floats
// ============================================================================

/// Big-endian IEEE 754 float of 4 or 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatFormat {
    length: usize,
}

impl FloatFormat {
    /// 4-byte float.
    pub const SINGLE: Self = Self { length: 4 };
    /// 8-byte float.
    pub const DOUBLE: Self = Self { length: 8 };

    /// Documented encoded length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Read a float of `length` bytes; 4 and 8 are accepted.
    pub fn read<B: Buf>(&self, buf: &mut B, length: usize) -> Result<Real> {
        if buf.remaining() < length {
            return Err(Error::underrun(length, buf.remaining()));
        }
        match length {
            4 => Ok(Real::single(f64::from(buf.get_f32()))),
            8 => Ok(Real::double(buf.get_f64())),
            n => Err(Error::malformed(format!("float of {n} bytes"))),
        }
    }

    /// Encoded length of `value`.
    ///
    /// A real read at 4 or 8 bytes keeps that width; quantized reals fall
    /// back to the documented length.
    pub fn length_of(&self, value: &Real) -> usize {
        match value.precision() {
            Precision::Single => 4,
            Precision::Double => 8,
            Precision::Step(_) => self.length,
        }
    }

    /// Write `value` at the width [`length_of`](Self::length_of) gives it.
    pub fn write<B: BufMut>(&self, value: &Real, buf: &mut B, max_length: usize) -> Result<()> {
        let length = self.length_of(value);
        let available = max_length.min(buf.remaining_mut());
        if length > available {
            return Err(Error::overflow(length, available));
        }
        if length == 4 {
            buf.put_f32(value.value() as f32);
        } else {
            buf.put_f64(value.value());
        }
        Ok(())
    }
}

// ============================================================================
// Quantized Reals
// ============================================================================

/// Linear quantization of `[min, max]` onto `length` bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImapFormat {
    min: f64,
    max: f64,
    length: usize,
}

impl ImapFormat {
    /// Create a format over `[min, max]` using `length` bytes (1 to 8).
    pub const fn new(min: f64, max: f64, length: usize) -> Self {
        assert!(length >= 1 && length <= 8, "IMAP length must be 1..=8");
        assert!(min < max, "IMAP range must be non-empty");
        Self { min, max, length }
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Encoded length in bytes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Largest encoded integer.
    fn max_code(&self) -> u64 {
        u64::MAX >> (64 - 8 * self.length)
    }

    /// Distance between adjacent representable values.
    pub fn precision(&self) -> f64 {
        (self.max - self.min) / self.max_code() as f64
    }

    /// Quantize `value` to the nearest step.
    pub fn encode(&self, value: f64) -> Result<u64> {
        if !(self.min..=self.max).contains(&value) {
            return Err(Error::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        let code = ((value - self.min) / self.precision()).round();
        Ok((code as u64).min(self.max_code()))
    }

    /// Map an encoded integer back to the real range.
    pub fn decode(&self, code: u64) -> f64 {
        let code = code.min(self.max_code());
        if code == self.max_code() {
            return self.max;
        }
        self.min + code as f64 * self.precision()
    }

    /// Read a quantized value occupying `length` bytes.
    pub fn read<B: Buf>(&self, buf: &mut B, length: usize) -> Result<Real> {
        if length != self.length {
            return Err(Error::malformed(format!(
                "quantized real of {length} bytes, expected {}",
                self.length
            )));
        }
        if buf.remaining() < length {
            return Err(Error::underrun(length, buf.remaining()));
        }
        let code = buf.get_uint(length);
        Ok(Real::quantized(self.decode(code), self.precision()))
    }

    /// Quantize and write `value`.
    pub fn write<B: BufMut>(&self, value: f64, buf: &mut B, max_length: usize) -> Result<()> {
        let code = self.encode(value)?;
        let available = max_length.min(buf.remaining_mut());
        if self.length > available {
            return Err(Error::overflow(self.length, available));
        }
        buf.put_uint(code, self.length);
        Ok(())
    }
}
