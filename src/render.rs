//! Certificate rendering module.
//! Loads the template, fonts, and signature once, then composites one attendee per call:
//! name, description lines, organizer block, today's date, and the signature overlay.
//! Text is rasterized with `imageproc` over `ab_glyph` fonts; placement comes from `layout::plan`.
//! Output: `<out>/<Name_With_Underscores>_Certificate.jpg`.

use ab_glyph::{Font, FontArc, GlyphId, Point, PxScale, Rect, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::config::Config;
use crate::layout::{self, Extent, Face, Fixed, Measure, Placement, SIGNATURE_BOX};
use crate::names::title_case;

const BODY_RATIO: f32 = 0.40;
const SMALL_RATIO: f32 = 0.32;

/// Display format for dates on the certificate, e.g. "Oct 18, 2026".
pub const DATE_FORMAT: &str = "%b %d, %Y";

// *************** Fonts ***************

/// A font at one size.
pub struct Typeface {
    font: FontArc,
    scale: PxScale,
}

impl Typeface {
    /// Loads a TTF/OTF file at an em size in pixels.
    pub fn load(path: &Path, em: u32) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| anyhow!("Failed to parse font {}: {}", path.display(), e))?;
        Ok(Self::from_font(font, em))
    }

    fn from_font(font: FontArc, em: u32) -> Self {
        // ab_glyph scales by ascent-to-descent height, fonts are sized by em.
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(em as f32 * font.height_unscaled() / units_per_em);
        Self { font, scale }
    }

    /// Pixel extent of `text` as `draw_text_mut` lays it out.
    pub fn measure(&self, text: &str) -> Extent {
        ink_extent(self, text)
    }
}

/// Per-glyph metrics at a fixed scale, the inputs of the glyph layout loop.
trait GlyphMetrics {
    fn glyph_id(&self, c: char) -> GlyphId;
    fn h_advance(&self, id: GlyphId) -> f32;
    fn kern(&self, first: GlyphId, second: GlyphId) -> f32;
    fn ascent(&self) -> f32;
    /// Negative below the baseline.
    fn descent(&self) -> f32;
    /// Inked pixel box of a glyph placed at `origin`; `None` for blank glyphs.
    fn ink_bounds(&self, id: GlyphId, origin: Point) -> Option<Rect>;
}

impl GlyphMetrics for Typeface {
    fn glyph_id(&self, c: char) -> GlyphId {
        self.font.glyph_id(c)
    }

    fn h_advance(&self, id: GlyphId) -> f32 {
        self.font.as_scaled(self.scale).h_advance(id)
    }

    fn kern(&self, first: GlyphId, second: GlyphId) -> f32 {
        self.font.as_scaled(self.scale).kern(first, second)
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    fn descent(&self) -> f32 {
        self.font.as_scaled(self.scale).descent()
    }

    fn ink_bounds(&self, id: GlyphId, origin: Point) -> Option<Rect> {
        self.font
            .outline_glyph(id.with_scale_and_position(self.scale, origin))
            .map(|outlined| outlined.px_bounds())
    }
}

/// Right and bottom edges of the inked glyphs, with the descent added to the bottom.
///
/// Follows imageproc's `layout_glyphs` step for step so measured and drawn text agree:
/// each glyph is placed before kerning is applied, kerning is `kern(current, previous)`,
/// and only glyphs with an outline take part in kerning.
fn ink_extent(metrics: &impl GlyphMetrics, text: &str) -> Extent {
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let (mut right, mut bottom) = (0.0f32, 0.0f32);

    for c in text.chars() {
        let id = metrics.glyph_id(c);
        let origin = point(caret, metrics.ascent());
        caret += metrics.h_advance(id);

        if let Some(bounds) = metrics.ink_bounds(id, origin) {
            if let Some(prev) = previous {
                caret += metrics.kern(id, prev);
            }
            previous = Some(id);
            right = right.max(bounds.max.x);
            bottom = bottom.max(bounds.max.y);
        }
    }

    Extent {
        width: right.ceil().max(0.0) as u32,
        height: (bottom - metrics.descent()).ceil().max(0.0) as u32,
    }
}

/// The three faces a certificate uses.
pub struct Typefaces {
    pub title: Typeface,
    pub body: Typeface,
    pub small: Typeface,
}

impl Typefaces {
    pub fn load(title_font: &Path, body_font: &Path, size: u32) -> Result<Self> {
        Ok(Self {
            title: Typeface::load(title_font, size)?,
            body: Typeface::load(body_font, (size as f32 * BODY_RATIO) as u32)?,
            small: Typeface::load(body_font, (size as f32 * SMALL_RATIO) as u32)?,
        })
    }

    fn face(&self, face: Face) -> &Typeface {
        match face {
            Face::Title => &self.title,
            Face::Body => &self.body,
            Face::Small => &self.small,
        }
    }
}

impl Measure for Typefaces {
    fn extent(&self, face: Face, text: &str) -> Extent {
        self.face(face).measure(text)
    }
}

// *************** Renderer ***************

pub struct CertificateRenderer {
    template: RgbaImage,
    signature: RgbaImage,
    faces: Typefaces,
    color: Rgba<u8>,
    organizer_name: String,
    organizer_designation: String,
    out_dir: PathBuf,
}

impl CertificateRenderer {
    /// Loads every asset the config names. Any missing or undecodable asset is fatal.
    pub fn new(config: &Config) -> Result<Self> {
        let template = image::open(&config.template)
            .with_context(|| format!("Failed to open template {}", config.template.display()))?
            .to_rgba8();
        let signature = image::open(&config.signature)
            .with_context(|| format!("Failed to open signature {}", config.signature.display()))?;
        let faces = Typefaces::load(&config.title_font, &config.font, config.size)?;

        debug!(
            width = template.width(),
            height = template.height(),
            "loaded certificate template"
        );

        Ok(Self {
            template,
            signature: fit_signature(&signature),
            faces,
            color: parse_color(&config.color)?,
            organizer_name: config.name.clone(),
            organizer_designation: config.designation.clone(),
            out_dir: config.out.clone(),
        })
    }

    /// Renders and saves one certificate. A failed save is logged and yields `None`
    /// so the caller can move on to the next attendee.
    pub fn render(&self, name: &str, description: &[String]) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("Failed to create output directory {}", self.out_dir.display())
        })?;

        let date = today();
        let fixed = Fixed {
            description,
            organizer_name: &self.organizer_name,
            organizer_designation: &self.organizer_designation,
            date: &date,
        };
        let plan = layout::plan(self.template.dimensions(), name, &fixed, &self.faces);

        let mut canvas = self.template.clone();
        let draw = |canvas: &mut RgbaImage, run: &Placement| {
            let face = self.faces.face(run.face);
            draw_text_mut(canvas, self.color, run.x, run.y, face.scale, &face.font, &run.text);
        };

        draw(&mut canvas, &plan.name);
        for run in &plan.description {
            draw(&mut canvas, run);
        }
        // Organizer block and date are drawn over the signature.
        imageops::overlay(&mut canvas, &self.signature, plan.signature.0, plan.signature.1);
        for run in [&plan.organizer_name, &plan.organizer_designation, &plan.date] {
            draw(&mut canvas, run);
        }

        let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
        Ok(save_certificate(&rgb, &output_path(&self.out_dir, name), name))
    }
}

// *************** Helpers ***************

/// Shrinks a signature to fit `SIGNATURE_BOX`, keeping its aspect ratio.
/// Smaller signatures are left as they are.
pub fn fit_signature(signature: &DynamicImage) -> RgbaImage {
    let (box_w, box_h) = SIGNATURE_BOX;
    let (w, h) = signature.dimensions();
    if w <= box_w && h <= box_h {
        signature.to_rgba8()
    } else {
        signature.resize(box_w, box_h, FilterType::Lanczos3).to_rgba8()
    }
}

/// Parses `#RRGGBB` (leading `#` optional) into an opaque color.
pub fn parse_color(raw: &str) -> Result<Rgba<u8>> {
    let digits = raw.trim().trim_start_matches('#');
    let bytes = hex::decode(digits).with_context(|| format!("Invalid color '{}'", raw))?;
    let [r, g, b]: [u8; 3] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("Invalid color '{}': expected #RRGGBB", raw))?;
    Ok(Rgba([r, g, b, 255]))
}

/// `Jane_Doe_Certificate.jpg` for "JANE DOE".
pub fn certificate_file_name(name: &str) -> String {
    format!("{}_Certificate.jpg", title_case(name).replace(' ', "_"))
}

pub fn output_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(certificate_file_name(name))
}

pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

fn save_certificate(image: &RgbImage, path: &Path, name: &str) -> Option<PathBuf> {
    match image.save(path) {
        Ok(()) => {
            debug!(path = %path.display(), "saved certificate");
            Some(path.to_path_buf())
        }
        Err(e) => {
            error!(attendee = name, error = %e, "Error saving certificate");
            None
        }
    }
}
