use crate::error::{QrError, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use tracing::trace;
use typed_builder::TypedBuilder;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    /// Survives roughly 30% damage, which leaves room for a centred logo.
    #[default]
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(value: ErrorCorrection) -> Self {
        match value {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RenderOptions {
    #[builder(default)]
    pub error_correction: ErrorCorrection,

    /// Edge length of the square output, in pixels.
    #[builder(default = 256)]
    pub size: u32,

    /// Light border around the symbol, in modules.
    #[builder(default = 4)]
    pub quiet_zone: u32,

    /// PNG or JPEG bytes drawn in the centre of the symbol.
    #[builder(default, setter(strip_option))]
    pub logo: Option<Vec<u8>>,

    /// Edge length of the logo, in pixels.
    #[builder(default = 100)]
    pub logo_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A rendered QR code.
#[derive(Debug, Clone)]
pub struct RenderedQr {
    image: RgbaImage,
    modules: u32,
}

impl RenderedQr {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Modules per side, quiet zone included.
    pub fn modules(&self) -> u32 {
        self.modules
    }
}

/// Renders `url` into a square raster.
///
/// Modules under the logo are cleared before it is drawn so that the reader
/// sees a clean hole rather than a mix of logo and modules.
pub fn render(url: &str, options: &RenderOptions) -> Result<RenderedQr> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), options.error_correction.into())?;
    let width = code.width() as u32;
    let modules = width + 2 * options.quiet_zone;
    let size = options.size;

    if size < modules {
        return Err(QrError::InvalidOptions(format!(
            "{size}px cannot fit {modules} modules"
        )));
    }

    let logo = match &options.logo {
        Some(bytes) => {
            if options.logo_size == 0 || options.logo_size >= size {
                return Err(QrError::InvalidOptions(format!(
                    "logo size {} must be between 1 and {}",
                    options.logo_size,
                    size - 1
                )));
            }
            let decoded = image::load_from_memory(bytes).map_err(QrError::Logo)?;
            Some(imageops::resize(
                &decoded.to_rgba8(),
                options.logo_size,
                options.logo_size,
                FilterType::Lanczos3,
            ))
        }
        None => None,
    };

    let module_at = |px: u32| (u64::from(px) * u64::from(modules) / u64::from(size)) as u32;
    let logo_origin = (size - options.logo_size) / 2;
    let excavated = logo.as_ref().map(|_| {
        let first = module_at(logo_origin);
        let last = module_at(logo_origin + options.logo_size - 1);
        first..=last
    });

    let quiet = options.quiet_zone;
    let is_dark = |mx: u32, my: u32| {
        if mx < quiet || my < quiet || mx >= quiet + width || my >= quiet + width {
            return false;
        }
        if let Some(hole) = &excavated {
            if hole.contains(&mx) && hole.contains(&my) {
                return false;
            }
        }
        code[((mx - quiet) as usize, (my - quiet) as usize)] == Color::Dark
    };

    let mut image = RgbaImage::from_fn(size, size, |x, y| {
        if is_dark(module_at(x), module_at(y)) {
            DARK
        } else {
            LIGHT
        }
    });

    if let Some(logo) = logo {
        imageops::overlay(
            &mut image,
            &logo,
            i64::from(logo_origin),
            i64::from(logo_origin),
        );
    }

    trace!(size, modules, version = ?code.version(), "rendered qr code");
    Ok(RenderedQr { image, modules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ColorType, ImageEncoder};

    const URL: &str = "https://qr.example/api/redirect/ab12xy";

    fn red_png() -> Vec<u8> {
        let logo = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(logo.as_raw(), 8, 8, ColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn default_render_is_square_with_a_quiet_zone() {
        let qr = render(URL, &RenderOptions::default()).unwrap();

        assert_eq!(qr.image().dimensions(), (256, 256));
        assert_eq!(qr.image().get_pixel(0, 0), &LIGHT);
        assert_eq!(qr.image().get_pixel(255, 255), &LIGHT);
        assert!(qr.image().pixels().any(|p| *p == DARK));
    }

    #[test]
    fn without_quiet_zone_the_finder_pattern_touches_the_corner() {
        let options = RenderOptions::builder().quiet_zone(0).build();
        let qr = render(URL, &options).unwrap();

        assert_eq!(qr.image().get_pixel(0, 0), &DARK);
        assert_eq!(qr.image().get_pixel(255, 0), &DARK);
        assert_eq!(qr.image().get_pixel(0, 255), &DARK);
    }

    #[test]
    fn logo_is_drawn_in_the_centre() {
        let options = RenderOptions::builder().logo(red_png()).build();
        let qr = render(URL, &options).unwrap();

        assert_eq!(qr.image().get_pixel(128, 128), &Rgba([255, 0, 0, 255]));
        assert_eq!(qr.image().get_pixel(0, 0), &LIGHT);
    }

    #[test]
    fn unreadable_logo() {
        let options = RenderOptions::builder().logo(b"not an image".to_vec()).build();
        assert!(matches!(render(URL, &options), Err(QrError::Logo(_))));
    }

    #[test]
    fn payload_too_long() {
        let url = format!("https://qr.example/{}", "x".repeat(8_000));
        assert!(matches!(
            render(&url, &RenderOptions::default()),
            Err(QrError::Payload(_))
        ));
    }

    #[test]
    fn size_smaller_than_the_symbol() {
        let options = RenderOptions::builder().size(10).build();
        assert!(matches!(
            render(URL, &options),
            Err(QrError::InvalidOptions(_))
        ));

        let options = RenderOptions::builder().logo(red_png()).logo_size(256).build();
        assert!(matches!(
            render(URL, &options),
            Err(QrError::InvalidOptions(_))
        ));
    }
}
