use crate::error::AtlasError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decodes an image from a byte slice.
    ///
    /// The format is guessed from the data. Non-RGBA images are converted to RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, AtlasError> {
        let decoded = image::load_from_memory(bytes)?;
        let rgba = decoded.to_rgba8();
        let dimensions = rgba.dimensions();

        Ok(Self {
            bytes: rgba.into_raw(),
            dimensions,
        })
    }

    /// Raw pixels in RGBA order, row by row.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}
