//! Watermark image decoding and XObject construction.
//!
//! The format is detected from the decoded bytes' magic numbers, never from
//! the base64 text. PNG files are decoded with the `png` crate so an alpha
//! channel can be split into an SMask; JPEG files keep their compressed data
//! and are embedded as DCTDecode streams.

use std::io::Cursor;

use lopdf::{dictionary, xobject, Object, ObjectId, Stream};

use crate::error::Error;

/// The eight-byte signature every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Classify raw image bytes by their leading signature.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat, Error> {
    if data.starts_with(&PNG_SIGNATURE) {
        Ok(ImageFormat::Png)
    } else if data.starts_with(&JPEG_SOI) {
        Ok(ImageFormat::Jpeg)
    } else {
        Err(Error::UnsupportedFormat)
    }
}

/// Raw image samples ready to become an image XObject stream.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    width: u32,
    height: u32,
    color_space: &'static str,
    data: Vec<u8>,
    /// Set after the mask has been registered in the document.
    pub s_mask: Option<ObjectId>,
}

impl ImageXObject {
    /// Decode a PNG into an XObject plus, when the file carries alpha, a
    /// separate grayscale XObject to be registered as its SMask.
    pub fn from_png(data: &[u8]) -> Result<(ImageXObject, Option<ImageXObject>), Error> {
        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let opaque = |color_space, data| ImageXObject {
            width: info.width,
            height: info.height,
            color_space,
            data,
            s_mask: None,
        };

        match info.color_type {
            png::ColorType::Rgb => Ok((opaque("DeviceRGB", buf), None)),
            png::ColorType::Grayscale => Ok((opaque("DeviceGray", buf), None)),
            png::ColorType::Rgba => {
                let mut samples = Vec::with_capacity(buf.len() / 4 * 3);
                let mut alpha = Vec::with_capacity(buf.len() / 4);
                for pixel in buf.chunks_exact(4) {
                    samples.extend_from_slice(&pixel[..3]);
                    alpha.push(pixel[3]);
                }
                Ok((opaque("DeviceRGB", samples), Some(opaque("DeviceGray", alpha))))
            }
            png::ColorType::GrayscaleAlpha => {
                let mut samples = Vec::with_capacity(buf.len() / 2);
                let mut alpha = Vec::with_capacity(buf.len() / 2);
                for pixel in buf.chunks_exact(2) {
                    samples.push(pixel[0]);
                    alpha.push(pixel[1]);
                }
                Ok((opaque("DeviceGray", samples), Some(opaque("DeviceGray", alpha))))
            }
            // EXPAND rewrites indexed images to RGB before we get here.
            png::ColorType::Indexed => Err(Error::Decode("indexed png was not expanded".into())),
        }
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }
}

impl From<ImageXObject> for Object {
    fn from(image: ImageXObject) -> Object {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.width),
            "Height" => i64::from(image.height),
            "ColorSpace" => image.color_space,
            "BitsPerComponent" => 8,
        };
        if let Some(mask_id) = image.s_mask {
            dict.set("SMask", Object::Reference(mask_id));
        }
        Object::Stream(Stream::new(dict, image.data))
    }
}

/// A decoded watermark, ready to register and draw.
pub enum Watermark {
    Png {
        image: ImageXObject,
        mask: Option<ImageXObject>,
    },
    Jpeg {
        stream: Stream,
        width: f64,
        height: f64,
    },
}

impl Watermark {
    /// Decode `data` into whichever representation its signature calls for.
    pub fn decode(data: Vec<u8>) -> Result<Watermark, Error> {
        match detect_format(&data)? {
            ImageFormat::Png => {
                let (image, mask) = ImageXObject::from_png(&data)?;
                Ok(Watermark::Png { image, mask })
            }
            ImageFormat::Jpeg => {
                let size = imagesize::blob_size(&data)
                    .map_err(|err| Error::Decode(format!("invalid jpeg image: {err}")))?;
                let stream = xobject::image_from(data)
                    .map_err(|err| Error::Decode(format!("invalid jpeg image: {err}")))?;
                Ok(Watermark::Jpeg {
                    stream,
                    width: size.width as f64,
                    height: size.height as f64,
                })
            }
        }
    }

    /// Native pixel dimensions, before any layout scaling.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            Watermark::Png { image, .. } => image.dimensions(),
            Watermark::Jpeg { width, height, .. } => (*width, *height),
        }
    }
}
