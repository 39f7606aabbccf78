//! Toroidally sampled RGBA8 map texture

use glam::Vec2;

use crate::consts::BYTES_PER_PIXEL;
use crate::error::{CoreError, CoreResult};
use crate::wrap_coord;

/// Borrowed view of the ground map, addressed with wrap-around
#[derive(Debug, Clone, Copy)]
pub struct MapTexture<'a> {
    texels: &'a [[u8; 4]],
    width: i32,
    height: i32,
}

/// Checked `width * height * 4`
pub(crate) fn rgba_len(what: &'static str, width: usize, height: usize) -> CoreResult<usize> {
    if width == 0 || height == 0 {
        return Err(CoreError::ZeroDimension {
            what,
            width,
            height,
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(CoreError::DimensionOverflow(width.max(height)))
}

impl<'a> MapTexture<'a> {
    /// Wrap a row-major RGBA8 byte buffer of `width x height` texels
    ///
    /// Trailing bytes past the last texel are ignored.
    pub fn new(bytes: &'a [u8], width: usize, height: usize) -> CoreResult<Self> {
        let expected = rgba_len("map texture", width, height)?;
        if bytes.len() < expected {
            return Err(CoreError::TextureSize {
                expected,
                actual: bytes.len(),
            });
        }
        let to_i32 = |v: usize| i32::try_from(v).map_err(|_| CoreError::DimensionOverflow(v));
        let texels = bytemuck::try_cast_slice(&bytes[..expected])
            .map_err(|_| CoreError::NotRgba(expected))?;

        Ok(Self {
            texels,
            width: to_i32(width)?,
            height: to_i32(height)?,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Nearest texel at a world position, alpha forced opaque
    ///
    /// Coordinates truncate toward zero before wrapping.
    #[inline]
    pub fn sample(&self, pos: Vec2) -> [u8; 4] {
        let mx = wrap_coord(pos.x as i32, self.width);
        let my = wrap_coord(pos.y as i32, self.height);
        let [r, g, b, _] = self.texels[my as usize * self.width as usize + mx as usize];
        [r, g, b, 255]
    }
}
