//! Scanline ground rasterizer
//!
//! One loop serves both render modes. Each output row is a world-space segment
//! at depth `focal / (y + 1)`; columns interpolate along it and fetch the
//! nearest map texel. A `SamplingPolicy` decides how many of those fetches
//! actually happen.

use super::sampling::{BandThresholds, SamplingPolicy};
use super::texture::{MapTexture, rgba_len};
use crate::camera::GroundProjection;
use crate::error::{CoreError, CoreResult};

/// Mutable RGBA8 output, one `[u8; 4]` per pixel
pub struct GroundTarget<'a> {
    pixels: &'a mut [[u8; 4]],
    width: usize,
    height: usize,
}

impl<'a> GroundTarget<'a> {
    /// Wrap the first `width * height * 4` bytes of `bytes`
    pub fn new(bytes: &'a mut [u8], width: usize, height: usize) -> CoreResult<Self> {
        let expected = rgba_len("ground buffer", width, height)?;
        if bytes.len() < expected {
            return Err(CoreError::PixelBufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytemuck::try_cast_slice_mut(&mut bytes[..expected])
            .map_err(|_| CoreError::NotRgba(expected))?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [[u8; 4]] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    #[inline]
    fn copy_row(&mut self, src: usize, dst: usize) {
        let start = src * self.width;
        self.pixels
            .copy_within(start..start + self.width, dst * self.width);
    }
}

/// Render the ground into `target` under `policy`
///
/// A row whose index is not a multiple of its band stride is copied from the
/// most recently computed row, which may sit in a previous band. Within a
/// computed row the texel at the start of each block fills the whole block;
/// that texel is the one quality mode would fetch for the same column.
pub fn rasterize(
    target: &mut GroundTarget<'_>,
    map: &MapTexture<'_>,
    projection: &GroundProjection,
    policy: &SamplingPolicy,
) {
    let bands = BandThresholds::new(target.height);
    let inv_w = 1.0 / target.width as f32;
    let mut last_computed: Option<usize> = None;

    for y in 0..target.height {
        let step = policy.step(bands.band(y));

        if let Some(src) = last_computed {
            if y % step != 0 {
                target.copy_row(src, y);
                continue;
            }
        }
        last_computed = Some(y);

        let line = projection.scanline(y);
        let delta = (line.right - line.left) * inv_w;

        for (block_index, block) in target.row_mut(y).chunks_mut(step).enumerate() {
            let x = (block_index * step) as f32;
            block.fill(map.sample(line.left + delta * x));
        }
    }
}

/// Per-pixel ground render into a host RGBA8 buffer
pub fn render_quality(
    pixels: &mut [u8],
    map_data: &[u8],
    ground_w: usize,
    ground_h: usize,
    map_w: usize,
    map_h: usize,
    projection: &GroundProjection,
) -> CoreResult<()> {
    render_with_policy(
        pixels,
        map_data,
        (ground_w, ground_h),
        (map_w, map_h),
        projection,
        &SamplingPolicy::Quality,
    )
}

/// Adaptive-density ground render into a host RGBA8 buffer
#[allow(clippy::too_many_arguments)]
pub fn render_performance(
    pixels: &mut [u8],
    map_data: &[u8],
    ground_w: usize,
    ground_h: usize,
    map_w: usize,
    map_h: usize,
    projection: &GroundProjection,
    policy: &SamplingPolicy,
) -> CoreResult<()> {
    render_with_policy(
        pixels,
        map_data,
        (ground_w, ground_h),
        (map_w, map_h),
        projection,
        policy,
    )
}

fn render_with_policy(
    pixels: &mut [u8],
    map_data: &[u8],
    (ground_w, ground_h): (usize, usize),
    (map_w, map_h): (usize, usize),
    projection: &GroundProjection,
    policy: &SamplingPolicy,
) -> CoreResult<()> {
    let map = MapTexture::new(map_data, map_w, map_h)?;
    let mut target = GroundTarget::new(pixels, ground_w, ground_h)?;
    rasterize(&mut target, &map, projection, policy);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MotionState;
    use proptest::prelude::*;

    /// Map where texel (x, y) is `[x, y, x ^ y, 0]`
    fn indexed_map(w: usize, h: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            for x in 0..w {
                bytes.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 0]);
            }
        }
        bytes
    }

    fn pixel(buf: &[u8], w: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * w + x) * 4;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    fn row(buf: &[u8], w: usize, y: usize) -> &[u8] {
        &buf[y * w * 4..(y + 1) * w * 4]
    }

    #[test]
    fn test_quality_solid_map() {
        let map: Vec<u8> = [40u8, 80, 120, 7].repeat(16);
        let mut out = vec![0u8; 32 * 24 * 4];
        let proj = GroundProjection::new(2.0, 2.0, 1.0, 0.0, 120.0, 0.7);

        render_quality(&mut out, &map, 32, 24, 4, 4, &proj).unwrap();

        for px in out.chunks_exact(4) {
            assert_eq!(px, [40u8, 80, 120, 255].as_slice());
        }
    }

    #[test]
    fn test_quality_exact_texels() {
        // Row 0: dist 2, span y 2 -> -2, step -1 per column
        // Row 1: dist 1, span y 1 -> -1, step -0.5 per column
        let map = indexed_map(4, 4);
        let mut out = vec![0u8; 4 * 2 * 4];
        let proj = GroundProjection::new(0.0, 0.0, 1.0, 0.0, 2.0, 1.0);

        render_quality(&mut out, &map, 4, 2, 4, 4, &proj).unwrap();

        assert_eq!(pixel(&out, 4, 0, 0), [2, 2, 0, 255]);
        assert_eq!(pixel(&out, 4, 1, 0), [2, 1, 3, 255]);
        assert_eq!(pixel(&out, 4, 2, 0), [2, 0, 2, 255]);
        assert_eq!(pixel(&out, 4, 3, 0), [2, 3, 1, 255]);

        // y = -0.5 truncates to 0
        assert_eq!(pixel(&out, 4, 0, 1), [1, 1, 0, 255]);
        assert_eq!(pixel(&out, 4, 1, 1), [1, 0, 1, 255]);
        assert_eq!(pixel(&out, 4, 2, 1), [1, 0, 1, 255]);
        assert_eq!(pixel(&out, 4, 3, 1), [1, 0, 1, 255]);
    }

    #[test]
    fn test_performance_blocks_clip_to_width() {
        let map = indexed_map(16, 16);
        let (w, h) = (8, 6);
        let mut out = vec![0u8; w * h * 4];
        let proj = GroundProjection::new(3.0, 5.0, 0.6, 0.8, 40.0, 0.9);

        render_performance(&mut out, &map, w, h, 16, 16, &proj, &SamplingPolicy::fixed(3))
            .unwrap();

        for y in 0..h {
            for block in [0..3, 3..6, 6..8] {
                let first = pixel(&out, w, block.start, y);
                assert_eq!(first[3], 255);
                for x in block {
                    assert_eq!(pixel(&out, w, x, y), first);
                }
            }
        }
    }

    #[test]
    fn test_stride_one_matches_quality() {
        let map = indexed_map(32, 32);
        let (w, h) = (40, 30);
        let proj = GroundProjection::new(-7.25, 13.5, 0.28, -0.96, 300.0, 0.75);

        let mut quality = vec![0u8; w * h * 4];
        let mut perf = vec![0u8; w * h * 4];
        render_quality(&mut quality, &map, w, h, 32, 32, &proj).unwrap();
        render_performance(&mut perf, &map, w, h, 32, 32, &proj, &SamplingPolicy::fixed(1))
            .unwrap();

        assert_eq!(quality, perf);
    }

    #[test]
    fn test_layered_rows_reuse_last_computed() {
        // h = 20, rotating: far/mid stride 5, near stride 8.
        // Computed rows: 0, 5, 10, 16. Rows 12..16 straddle the band edge
        // and still copy row 10.
        let map = indexed_map(64, 64);
        let (w, h) = (16, 20);
        let proj = GroundProjection::new(0.5, 0.5, 1.0, 0.0, 200.0, 0.6);
        let policy = SamplingPolicy::Performance {
            base_resolution: 1,
            layered: true,
            motion: MotionState {
                moving: true,
                rotating: true,
                tilt: 0.0,
            },
        };

        let mut out = vec![0u8; w * h * 4];
        render_performance(&mut out, &map, w, h, 64, 64, &proj, &policy).unwrap();

        let source_of = |y: usize| match y {
            0..=4 => 0,
            5..=9 => 5,
            10..=15 => 10,
            _ => 16,
        };
        for y in 0..h {
            assert_eq!(row(&out, w, y), row(&out, w, source_of(y)), "row {}", y);
        }

        // Computed rows sample the quality projection at block starts
        let mut quality = vec![0u8; w * h * 4];
        render_quality(&mut quality, &map, w, h, 64, 64, &proj).unwrap();
        assert_eq!(pixel(&out, w, 0, 0), pixel(&quality, w, 0, 0));
        assert_eq!(pixel(&out, w, 7, 16), pixel(&quality, w, 0, 16));
        assert_eq!(pixel(&out, w, 8, 16), pixel(&quality, w, 8, 16));
    }

    #[test]
    fn test_rejects_undersized_output() {
        let map = indexed_map(4, 4);
        let mut out = vec![0u8; 10];
        let proj = GroundProjection::new(0.0, 0.0, 1.0, 0.0, 2.0, 1.0);
        let err = render_quality(&mut out, &map, 2, 2, 4, 4, &proj).unwrap_err();
        assert_eq!(
            err,
            CoreError::PixelBufferSize {
                expected: 16,
                actual: 10
            }
        );
        // Nothing written on failure
        assert!(out.iter().all(|&b| b == 0));
    }

    proptest! {
        #[test]
        fn prop_fixed_stride_is_strided_quality(
            step in 1usize..7,
            w in 1usize..48,
            h in 1usize..40,
            cam_x in -500.0f32..500.0,
            cam_y in -500.0f32..500.0,
            angle in -3.2f32..3.2,
            focal in 1.0f32..400.0,
            tan_f in 0.1f32..2.0,
        ) {
            let map = indexed_map(16, 8);
            let proj = GroundProjection::new(cam_x, cam_y, angle.cos(), angle.sin(), focal, tan_f);

            let mut quality = vec![0u8; w * h * 4];
            let mut perf = vec![0u8; w * h * 4];
            render_quality(&mut quality, &map, w, h, 16, 8, &proj).unwrap();
            render_performance(
                &mut perf, &map, w, h, 16, 8, &proj, &SamplingPolicy::fixed(step as u32),
            ).unwrap();

            for y in 0..h {
                let src_y = y / step * step;
                for x in 0..w {
                    let src_x = x / step * step;
                    prop_assert_eq!(pixel(&perf, w, x, y), pixel(&quality, w, src_x, src_y));
                }
            }
        }
    }
}
