use super::RenderError;

/// Dense handle to a texture owned by a backend.
///
/// Returned by [`SpriteBatchRenderer::register_texture`](super::SpriteBatchRenderer::register_texture)
/// so hot paths can flush by handle instead of by string id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

impl TextureId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Decoded RGBA8 raster, row-major, top row first.
///
/// Images arrive already decoded; this type only validates dimensions.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidImage(format!(
                "zero-sized image ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidImage(format!(
                "{width}x{height} RGBA needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// Builds an image by evaluating `f(x, y)` for every texel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, RenderError>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    /// Single-colour image; handy for untextured quads.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, RenderError> {
        Self::from_fn(width, height, |_, _| rgba)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_byte_count() {
        let err = TextureImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidImage(_)));
    }

    #[test]
    fn rejects_zero_size() {
        assert!(TextureImage::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn from_fn_is_row_major() {
        let img = TextureImage::from_fn(2, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(&img.pixels()[4..8], &[1, 0, 0, 255]);
        assert_eq!(&img.pixels()[8..12], &[0, 1, 0, 255]);
    }
}
