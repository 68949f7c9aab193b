//! PDF text and image extraction.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, ObjectId};

use crate::error::ExtractError;
use crate::models::{ExtractedDocument, ExtractedImage};

/// Reads page text and writes embedded raster images to `images_dir`.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    images_dir: PathBuf,
}

impl PdfExtractor {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    /// Extract all page text and write every supported image.
    ///
    /// Images are written as they are found, so a failure part-way through
    /// leaves earlier images on disk.
    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractError> {
        let document_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ExtractError::OpenError(format!("not a file: {}", path.display())))?;

        let doc = Document::load(path).map_err(|e| ExtractError::OpenError(e.to_string()))?;
        let mut extracted = ExtractedDocument::default();

        for (page, page_id) in doc.get_pages() {
            let text = doc
                .extract_text(&[page])
                .map_err(|e| ExtractError::PageError {
                    page,
                    message: e.to_string(),
                })?;
            extracted.text.push_str(&text);
            extracted.text.push('\n');
            extracted.page_count += 1;

            // Pages without their own XObject resources have no images to offer.
            let images = match doc.get_page_images(page_id) {
                Ok(images) => images,
                Err(e) => {
                    tracing::debug!(%document_name, page, error = %e, "no page images");
                    continue;
                }
            };

            for (index, pdf_image) in images.iter().enumerate() {
                let raster = RasterImage {
                    id: pdf_image.id,
                    width: pdf_image.width,
                    height: pdf_image.height,
                    color_space: pdf_image.color_space.as_deref(),
                    bits_per_component: pdf_image.bits_per_component,
                    filters: pdf_image.filters.iter().flatten().map(String::as_str).collect(),
                    content: pdf_image.content,
                };
                let Some((bytes, extension)) = encode_image(&doc, &raster)? else {
                    tracing::debug!(
                        %document_name,
                        page,
                        index,
                        filters = ?raster.filters,
                        color_space = ?raster.color_space,
                        "skipping unsupported image encoding"
                    );
                    continue;
                };

                let image = ExtractedImage {
                    page,
                    index,
                    extension,
                    bytes,
                };
                let image_path = self.images_dir.join(image.file_name(&document_name));
                std::fs::write(&image_path, &image.bytes)?;
                extracted.images.push(image_path);
            }
        }

        Ok(extracted)
    }
}

/// Image XObject fields needed to write it out.
struct RasterImage<'a> {
    id: ObjectId,
    width: i64,
    height: i64,
    color_space: Option<&'a str>,
    bits_per_component: Option<i64>,
    filters: Vec<&'a str>,
    content: &'a [u8],
}

/// Bytes and file extension for an image XObject, or `None` when the encoding
/// can't be written as a standalone file.
fn encode_image(
    doc: &Document,
    image: &RasterImage<'_>,
) -> Result<Option<(Vec<u8>, &'static str)>, ExtractError> {
    match image.filters.as_slice() {
        ["DCTDecode"] => Ok(Some((image.content.to_vec(), "jpeg"))),
        ["JPXDecode"] => Ok(Some((image.content.to_vec(), "jpx"))),
        [] => raw_to_png(
            image.width,
            image.height,
            image.color_space,
            image.bits_per_component,
            image.content.to_vec(),
        ),
        ["FlateDecode"] => {
            let samples = doc
                .get_object(image.id)
                .and_then(|object| object.as_stream())
                .and_then(|stream| stream.decompressed_content())
                .map_err(|e| ExtractError::ImageError(e.to_string()))?;
            raw_to_png(
                image.width,
                image.height,
                image.color_space,
                image.bits_per_component,
                samples,
            )
        }
        _ => Ok(None),
    }
}

/// Re-encode 8-bit RGB or grayscale samples as PNG.
fn raw_to_png(
    width: i64,
    height: i64,
    color_space: Option<&str>,
    bits_per_component: Option<i64>,
    mut samples: Vec<u8>,
) -> Result<Option<(Vec<u8>, &'static str)>, ExtractError> {
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Ok(None);
    };

    let channels = match (color_space, bits_per_component) {
        (Some("DeviceRGB"), Some(8)) => 3,
        (Some("DeviceGray"), Some(8)) => 1,
        _ => return Ok(None),
    };

    let expected = width as usize * height as usize * channels;
    if samples.len() < expected {
        return Err(ExtractError::ImageError(format!(
            "expected {expected} bytes of samples, found {}",
            samples.len()
        )));
    }
    samples.truncate(expected);

    let decoded = if channels == 3 {
        RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
    };
    let Some(decoded) = decoded else {
        return Ok(None);
    };

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ExtractError::ImageError(e.to_string()))?;
    Ok(Some((png, "png")))
}
