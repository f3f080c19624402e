use crate::error::{QrError, Result};
use crate::render::RenderedQr;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use qrbridge_core::RandomLink;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const PDF_MARGIN_MM: f32 = 10.0;
const PDF_IMAGE_MM: f32 = 190.0;
const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Download name of an exported code, e.g. `eqr-bridge-qr-ab12xy.png`.
pub fn export_file_name(link: &RandomLink, format: ExportFormat) -> String {
    format!("eqr-bridge-qr-{}.{}", link, format.extension())
}

pub fn to_png(qr: &RenderedQr) -> Result<Vec<u8>> {
    let image = qr.image();
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgba8,
        )
        .map_err(|e| QrError::Encode {
            format: "png",
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// Lays the code out on a single A4 portrait page, 190 mm wide, 10 mm from
/// the top-left corner.
pub fn to_pdf(qr: &RenderedQr) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "QR code",
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "QR code",
    );
    let layer = doc.get_page(page).get_layer(layer);

    // PDF has no alpha here, and the raster is opaque anyway.
    let raster = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(qr.image().clone()).to_rgb8());
    let dpi = qr.size() as f32 * MM_PER_INCH / PDF_IMAGE_MM;

    // PDF coordinates start at the bottom-left corner.
    Image::from_dynamic_image(&raster).add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(PDF_MARGIN_MM)),
            translate_y: Some(Mm(A4_HEIGHT_MM - PDF_MARGIN_MM - PDF_IMAGE_MM)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| QrError::Encode {
        format: "pdf",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, RenderOptions};

    fn rendered() -> RenderedQr {
        render(
            "https://qr.example/api/redirect/ab12xy",
            &RenderOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn file_names() {
        let link = RandomLink::new("ab12xy").unwrap();
        assert_eq!(
            export_file_name(&link, ExportFormat::Png),
            "eqr-bridge-qr-ab12xy.png"
        );
        assert_eq!(
            export_file_name(&link, ExportFormat::Pdf),
            "eqr-bridge-qr-ab12xy.pdf"
        );
    }

    #[test]
    fn png_decodes_to_the_requested_size() {
        let bytes = to_png(&rendered()).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 256);
        assert_eq!(decoded.height(), 256);
    }

    #[test]
    fn pdf_has_a_pdf_header() {
        let bytes = to_pdf(&rendered()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
