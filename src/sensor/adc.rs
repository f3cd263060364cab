use super::BitDepth;

/// Element type backing a sensor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    U8,
    U16,
    F32,
    F64,
}

/// Quantized samples at the storage precision of a bit depth.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelBuffer {
    pub fn zeros(depth: BitDepth, len: usize) -> Self {
        match depth.storage() {
            StorageKind::U8 => PixelBuffer::U8(vec![0; len]),
            StorageKind::U16 => PixelBuffer::U16(vec![0; len]),
            StorageKind::F32 => PixelBuffer::F32(vec![0.0; len]),
            StorageKind::F64 => PixelBuffer::F64(vec![0.0; len]),
        }
    }

    /// Quantize `values` into a fresh buffer for `depth`.
    pub fn from_f64(depth: BitDepth, values: &[f64]) -> Self {
        let mut buffer = Self::zeros(depth, values.len());
        buffer.store(values, depth.full_scale());
        buffer
    }

    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(v) => v.len(),
            PixelBuffer::U16(v) => v.len(),
            PixelBuffer::F32(v) => v.len(),
            PixelBuffer::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            PixelBuffer::U8(_) => StorageKind::U8,
            PixelBuffer::U16(_) => StorageKind::U16,
            PixelBuffer::F32(_) => StorageKind::F32,
            PixelBuffer::F64(_) => StorageKind::F64,
        }
    }

    pub fn get(&self, idx: usize) -> f64 {
        match self {
            PixelBuffer::U8(v) => v[idx] as f64,
            PixelBuffer::U16(v) => v[idx] as f64,
            PixelBuffer::F32(v) => v[idx] as f64,
            PixelBuffer::F64(v) => v[idx],
        }
    }

    /// Promote every sample to double precision.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            PixelBuffer::U8(v) => v.iter().map(|&x| x as f64).collect(),
            PixelBuffer::U16(v) => v.iter().map(|&x| x as f64).collect(),
            PixelBuffer::F32(v) => v.iter().map(|&x| x as f64).collect(),
            PixelBuffer::F64(v) => v.clone(),
        }
    }

    /// Overwrite the buffer with `values` quantized by [`quantize`].
    ///
    /// `values` must have the same length as the buffer.
    pub fn store(&mut self, values: &[f64], full_scale: f64) {
        debug_assert_eq!(values.len(), self.len());
        match self {
            PixelBuffer::U8(v) => {
                for (dst, &src) in v.iter_mut().zip(values) {
                    *dst = quantize(src, full_scale, true) as u8;
                }
            }
            PixelBuffer::U16(v) => {
                for (dst, &src) in v.iter_mut().zip(values) {
                    *dst = quantize(src, full_scale, true) as u16;
                }
            }
            PixelBuffer::F32(v) => {
                for (dst, &src) in v.iter_mut().zip(values) {
                    *dst = quantize(src, full_scale, false) as f32;
                }
            }
            PixelBuffer::F64(v) => {
                for (dst, &src) in v.iter_mut().zip(values) {
                    *dst = quantize(src, full_scale, false);
                }
            }
        }
    }

    pub fn max_value(&self) -> f64 {
        (0..self.len()).map(|i| self.get(i)).fold(0.0, f64::max)
    }
}

/// Storage conversion policy: saturate to `[0, full_scale]`, never wrap.
///
/// Integer codes round half away from zero; float storage keeps the
/// fractional part. NaN stores as 0.
pub fn quantize(value: f64, full_scale: f64, integer: bool) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let value = if integer { value.round() } else { value };
    value.clamp(0.0, full_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_storage_saturates() {
        let buf = PixelBuffer::from_f64(BitDepth::Eight, &[-3.0, 12.4, 12.5, 300.0, f64::NAN]);
        assert_eq!(buf, PixelBuffer::U8(vec![0, 12, 13, 255, 0]));

        let buf = PixelBuffer::from_f64(BitDepth::Twelve, &[-0.6, 70000.0, 1023.49]);
        assert_eq!(buf, PixelBuffer::U16(vec![0, 65535, 1023]));
    }

    #[test]
    fn float_storage_keeps_fraction() {
        let buf = PixelBuffer::from_f64(BitDepth::Float64, &[-1.0, 0.25, 1e9]);
        assert_eq!(buf, PixelBuffer::F64(vec![0.0, 0.25, 65535.0]));
        let buf = PixelBuffer::from_f64(BitDepth::Float32, &[10.5]);
        assert_eq!(buf.get(0), 10.5);
        assert_eq!(buf.storage(), StorageKind::F32);
    }

    #[test]
    fn promote_round_trips_stored_values() {
        let buf = PixelBuffer::from_f64(BitDepth::Sixteen, &[1.0, 2.0, 65535.0]);
        assert_eq!(buf.to_f64(), vec![1.0, 2.0, 65535.0]);
        assert_eq!(buf.max_value(), 65535.0);
    }
}
