//! Average colour sampling over pixel buffers

use crate::color::Rgb;
use crate::error::{BrickError, BrickResult};

/// Default distance between sampled pixels along each axis
pub const DEFAULT_SAMPLE_STRIDE: u32 = 5;

/// Read-only view over tightly packed RGBA pixels
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> BrickResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BrickError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA components at `(x, y)`; the caller keeps coordinates in range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let p = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[p], self.data[p + 1], self.data[p + 2], self.data[p + 3]]
    }
}

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The square region covered by block `(col, row)`.
    pub fn block(col: u32, row: u32, block_size: u32) -> Self {
        Self::new(col * block_size, row * block_size, block_size, block_size)
    }
}

/// Sub-sampling average colour estimator.
///
/// Reads every `stride`-th pixel along both axes instead of the full block,
/// which keeps per-block cost at `(size / stride)^2`.
#[derive(Debug, Clone, Copy)]
pub struct AverageSampler {
    stride: u32,
}

impl Default for AverageSampler {
    fn default() -> Self {
        Self { stride: DEFAULT_SAMPLE_STRIDE }
    }
}

impl AverageSampler {
    pub fn new(stride: u32) -> BrickResult<Self> {
        if stride == 0 {
            return Err(BrickError::InvalidParams("sample stride must be at least 1".to_string()));
        }
        Ok(Self { stride })
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Floor of the mean R, G, B over the sampled grid. Alpha is ignored.
    pub fn sample(&self, buffer: &PixelBuffer<'_>, region: Region) -> BrickResult<Rgb> {
        if region.width < self.stride || region.height < self.stride {
            return Err(BrickError::DegenerateRegion {
                width: region.width,
                height: region.height,
                stride: self.stride,
            });
        }

        let x_end = region.x as u64 + region.width as u64;
        let y_end = region.y as u64 + region.height as u64;
        if x_end > buffer.width() as u64 || y_end > buffer.height() as u64 {
            return Err(BrickError::RegionOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                buffer_width: buffer.width(),
                buffer_height: buffer.height(),
            });
        }

        let mut sum = [0u64; 3];
        let mut samples = 0u64;

        for y in (region.y..region.y + region.height).step_by(self.stride as usize) {
            for x in (region.x..region.x + region.width).step_by(self.stride as usize) {
                let [r, g, b, _] = buffer.pixel(x, y);
                sum[0] += r as u64;
                sum[1] += g as u64;
                sum[2] += b as u64;
                samples += 1;
            }
        }

        // integer division is the floor of the mean
        Ok(Rgb::new(
            (sum[0] / samples) as u8,
            (sum[1] / samples) as u8,
            (sum[2] / samples) as u8,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect()
    }

    #[test]
    fn test_buffer_size_is_validated() {
        let data = vec![0u8; 15];
        assert!(matches!(
            PixelBuffer::new(&data, 2, 2),
            Err(BrickError::BufferSizeMismatch { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn test_uniform_region_returns_exact_color() {
        let data = uniform(32, 32, [37, 142, 201, 9]);
        let buffer = PixelBuffer::new(&data, 32, 32).unwrap();
        let sampler = AverageSampler::default();
        for size in [5, 7, 16, 32] {
            let rgb = sampler.sample(&buffer, Region::new(0, 0, size, size)).unwrap();
            assert_eq!(rgb, Rgb::new(37, 142, 201));
        }
    }

    #[test]
    fn test_region_smaller_than_stride_is_degenerate() {
        let data = uniform(16, 16, [1, 2, 3, 255]);
        let buffer = PixelBuffer::new(&data, 16, 16).unwrap();
        let sampler = AverageSampler::default();
        assert!(matches!(
            sampler.sample(&buffer, Region::new(0, 0, 4, 4)),
            Err(BrickError::DegenerateRegion { stride: 5, .. })
        ));
        assert!(matches!(
            sampler.sample(&buffer, Region::new(0, 0, 0, 8)),
            Err(BrickError::DegenerateRegion { .. })
        ));
    }

    #[test]
    fn test_only_strided_pixels_are_read() {
        // 10x10 black image with the sampled grid (0 and 5 on each axis) white
        let mut data = uniform(10, 10, [0, 0, 0, 255]);
        for y in [0u32, 5] {
            for x in [0u32, 5] {
                let p = ((y * 10 + x) * 4) as usize;
                data[p..p + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        let buffer = PixelBuffer::new(&data, 10, 10).unwrap();
        let rgb = AverageSampler::default().sample(&buffer, Region::new(0, 0, 10, 10)).unwrap();
        assert_eq!(rgb, Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_mean_is_floored() {
        // two sampled pixels: 0 and 255 on red -> 127.5 floors to 127
        let mut data = uniform(10, 5, [0, 0, 0, 255]);
        data[5 * 4] = 255;
        let buffer = PixelBuffer::new(&data, 10, 5).unwrap();
        let rgb = AverageSampler::default().sample(&buffer, Region::new(0, 0, 10, 5)).unwrap();
        assert_eq!(rgb.r, 127);
    }

    #[test]
    fn test_region_outside_buffer() {
        let data = uniform(16, 16, [0, 0, 0, 255]);
        let buffer = PixelBuffer::new(&data, 16, 16).unwrap();
        assert!(matches!(
            AverageSampler::default().sample(&buffer, Region::block(1, 1, 10)),
            Err(BrickError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert!(matches!(AverageSampler::new(0), Err(BrickError::InvalidParams(_))));
        assert_eq!(AverageSampler::new(2).unwrap().stride(), 2);
    }
}
