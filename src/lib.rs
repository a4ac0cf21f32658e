//! Append a rendered signature page to an existing PDF.
//!
//! The crate exposes one transformation: given a base64-encoded PDF, a
//! base64-encoded PNG or JPEG, and a display name, it appends a US-Letter
//! page carrying an intro sentence, the name in Times-BoldItalic, an
//! underscore rule, the "Firma Cliente" caption, and the image scaled and
//! centered beneath the signature block. The original pages are never
//! touched; failures abort the whole invocation.

mod error;
mod fonts;
mod image_xobject;
mod layout;

use log::{debug, warn};
use lopdf::{content::Operation, dictionary, Document, Object, ObjectId, Stream};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub use error::Error;
pub use fonts::{FontFace, FontHandle};
pub use image_xobject::{detect_format, ImageFormat, ImageXObject, Watermark, PNG_SIGNATURE};
pub use layout::{
    signature_layout, ImagePlacement, SignatureLayout, TextPlacement, LETTER_HEIGHT, LETTER_WIDTH,
};
pub use lopdf;

/// Resource name the watermark is registered under on the appended page.
const WATERMARK_NAME: &str = "SigImage";

/// Inputs of one composition, as produced by the transport collaborator.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    /// Base64-encoded source document.
    pub pdf: String,
    /// Base64-encoded PNG or JPEG watermark.
    pub image: String,
    /// Display name drawn as the signature.
    pub signature_name: String,
}

/// The single output field: the modified document, base64-encoded.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResponse {
    pub pdf: String,
}

/// A source document plus the mutations of one composition pass.
///
/// Holds the document only for the duration of one transformation; nothing
/// is shared between invocations.
#[derive(Debug, Clone)]
pub struct SignaturePageDocument {
    raw_document: Document,
    font_count: u32,
}

impl SignaturePageDocument {
    pub fn new(raw_document: Document) -> Self {
        SignaturePageDocument {
            raw_document,
            font_count: 0,
        }
    }

    /// Parse a base64-encoded PDF. Both a bad base64 payload and an
    /// unparseable document are decode failures.
    pub fn from_base64(pdf: &str) -> Result<Self, Error> {
        let bytes = BASE64.decode(pdf.as_bytes())?;
        let raw_document = Document::load_mem(&bytes)
            .map_err(|err| Error::Decode(format!("malformed pdf document: {err}")))?;
        Ok(Self::new(raw_document))
    }

    pub fn get_document_ref(&self) -> &Document {
        &self.raw_document
    }

    pub fn finished(self) -> Document {
        self.raw_document
    }

    /// Append one empty US-Letter page to the end of the page tree and
    /// return its id. The new page starts with an empty content stream and
    /// its own resource dictionary.
    pub fn append_letter_page(&mut self) -> Result<ObjectId, Error> {
        let pages_id = self
            .raw_document
            .catalog()?
            .get(b"Pages")?
            .as_reference()?;

        let content_id = self
            .raw_document
            .add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = self.raw_document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0f64.into(),
                0f64.into(),
                LETTER_WIDTH.into(),
                LETTER_HEIGHT.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! {} },
        });

        let pages = self
            .raw_document
            .get_object_mut(pages_id)?
            .as_dict_mut()?;
        pages
            .get_mut(b"Kids")?
            .as_array_mut()?
            .push(Object::Reference(page_id));
        let count = pages.get(b"Count")?.as_i64()?;
        pages.set("Count", count + 1);

        debug!("appended letter page {page_id:?}");
        Ok(page_id)
    }

    /// Register `face` in the page's font resources and hand back a handle
    /// carrying the resource name and the face metrics. Each call creates a
    /// fresh handle, even for a face registered before.
    pub fn embed_font(&mut self, page_id: ObjectId, face: FontFace) -> Result<FontHandle, Error> {
        let font_id = self.raw_document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });

        self.font_count += 1;
        let name = format!("F{}", self.font_count);

        // Only pages created by `append_letter_page` are touched, so the
        // resource dictionary is always direct and already has a Font entry.
        let page = self.raw_document.get_object_mut(page_id)?.as_dict_mut()?;
        let resources = page.get_mut(b"Resources")?.as_dict_mut()?;
        resources
            .get_mut(b"Font")?
            .as_dict_mut()?
            .set(name.clone(), Object::Reference(font_id));

        Ok(FontHandle::new(name, face))
    }

    /// Draw one line of black text on `page_id`.
    pub fn add_text_to_page(
        &mut self,
        page_id: ObjectId,
        placement: &TextPlacement,
        font: &FontHandle,
    ) -> Result<(), Error> {
        let mut content = self.raw_document.get_and_decode_page_content(page_id)?;

        content.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(font.name().as_bytes().to_vec()),
                    placement.font_size.into(),
                ],
            ),
            Operation::new("Td", vec![placement.x.into(), placement.y.into()]),
            Operation::new("rg", vec![0i32.into(), 0i32.into(), 0i32.into()]),
            Operation::new("Tj", vec![Object::string_literal(placement.text.as_str())]),
            Operation::new("ET", vec![]),
        ]);

        self.raw_document
            .change_page_content(page_id, content.encode()?)?;
        Ok(())
    }

    /// Register the watermark's XObject(s) on `page_id` and draw it at
    /// `placement`.
    pub fn add_watermark_to_page(
        &mut self,
        page_id: ObjectId,
        watermark: Watermark,
        placement: &ImagePlacement,
    ) -> Result<ObjectId, Error> {
        let image_id = match watermark {
            Watermark::Png { mut image, mask } => {
                if let Some(mask) = mask {
                    let mask_id = self.raw_document.add_object(mask);
                    image.s_mask = Some(mask_id);
                }
                self.raw_document.add_object(image)
            }
            Watermark::Jpeg { stream, .. } => self.raw_document.add_object(stream),
        };

        self.raw_document
            .add_xobject(page_id, WATERMARK_NAME, image_id)?;
        self.add_image_to_page_stream(WATERMARK_NAME, page_id, placement)?;

        Ok(image_id)
    }

    // The image must already be registered in the page's XObject resources.
    fn add_image_to_page_stream(
        &mut self,
        xobject_name: &str,
        page_id: ObjectId,
        placement: &ImagePlacement,
    ) -> Result<(), Error> {
        let mut content = self.raw_document.get_and_decode_page_content(page_id)?;
        // `q` = Save graphics state
        content.operations.push(Operation::new("q", vec![]));
        // `cm` = Concatenate matrix to current transformation matrix
        content.operations.push(Operation::new(
            "cm",
            vec![
                placement.width.into(),
                0i32.into(),
                0i32.into(),
                placement.height.into(),
                placement.x.into(),
                placement.y.into(),
            ],
        ));
        // `Do` = Invoke named XObject
        content.operations.push(Operation::new(
            "Do",
            vec![Object::Name(xobject_name.as_bytes().to_vec())],
        ));
        // `Q` = Restore graphics state
        content.operations.push(Operation::new("Q", vec![]));

        self.raw_document
            .change_page_content(page_id, content.encode()?)?;

        Ok(())
    }

    /// Compress content streams and serialize back to base64.
    pub fn save_base64(mut self) -> Result<String, Error> {
        self.raw_document.compress();
        let mut bytes = Vec::new();
        self.raw_document.save_to(&mut bytes)?;
        Ok(BASE64.encode(bytes))
    }
}

/// Run the whole composition: load, append one page, embed three fonts and
/// the watermark, draw the signature block, serialize.
pub fn add_signature_page(request: &SignatureRequest) -> Result<SignatureResponse, Error> {
    let mut document = SignaturePageDocument::from_base64(&request.pdf)?;

    let image_bytes = BASE64.decode(request.image.as_bytes())?;
    let watermark = Watermark::decode(image_bytes)?;

    let page_id = document.append_letter_page()?;
    let body_font = document.embed_font(page_id, FontFace::Helvetica)?;
    let name_font = document.embed_font(page_id, FontFace::TimesBoldItalic)?;
    let intro_font = document.embed_font(page_id, FontFace::Helvetica)?;

    let layout = signature_layout(&request.signature_name, watermark.dimensions());
    if layout.image.is_clamped() {
        warn!(
            "watermark of {:?} px is smaller than the fixed margin, clamping drawn size",
            watermark.dimensions()
        );
    }

    document.add_text_to_page(page_id, &layout.intro, &intro_font)?;
    document.add_text_to_page(page_id, &layout.name, &name_font)?;
    document.add_text_to_page(page_id, &layout.rule, &body_font)?;
    document.add_text_to_page(page_id, &layout.caption, &body_font)?;
    document.add_watermark_to_page(page_id, watermark, &layout.image)?;

    let pdf = document.save_base64()?;
    Ok(SignatureResponse { pdf })
}
