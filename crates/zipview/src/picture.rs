//! Decoded image handle

use bytes::Bytes;
use image::{ImageFormat, ImageResult};

/// A fully validated image: format and dimensions plus the encoded bytes
#[derive(Debug, Clone)]
pub struct Picture {
    format: ImageFormat,
    width: u32,
    height: u32,
    data: Bytes,
}

impl Picture {
    /// Sniff the format from the bytes and decode the whole image
    ///
    /// # Arguments
    /// * `data` - Encoded image bytes
    ///
    /// # Returns
    /// * `ImageResult<Picture>` - Decode failures include unknown formats
    pub fn decode(data: Bytes) -> ImageResult<Self> {
        let format = image::guess_format(&data)?;
        let decoded = image::load_from_memory_with_format(&data, format)?;

        Ok(Self {
            format,
            width: decoded.width(),
            height: decoded.height(),
            data,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Short upper-case format name, e.g. `PNG`
    pub fn format_name(&self) -> &'static str {
        match self.format() {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WEBP",
            ImageFormat::Bmp => "BMP",
            _ => "IMAGE",
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded bytes as read from the archive
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let data = Bytes::from(encode_png(3, 2));
        let len = data.len();

        let picture = Picture::decode(data).unwrap();
        assert_eq!(picture.format(), ImageFormat::Png);
        assert_eq!(picture.format_name(), "PNG");
        assert_eq!((picture.width(), picture.height()), (3, 2));
        assert_eq!(picture.data().len(), len);
    }

    #[test]
    fn test_unknown_format() {
        let data = Bytes::from_static(b"this is a text file, not a picture");
        assert!(Picture::decode(data).is_err());
    }

    #[test]
    fn test_truncated_image() {
        let mut data = encode_png(16, 16);
        data.truncate(data.len() / 2);
        assert!(Picture::decode(Bytes::from(data)).is_err());
    }
}
