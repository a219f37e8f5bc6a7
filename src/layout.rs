//! Layout module.
//! Pure placement arithmetic for a certificate: where each text run and the signature
//! land on a template of a given size. Takes measured glyph extents through the
//! `Measure` trait, so it never touches font files or pixels.
//!
//! The offsets and divisors are tuned for the stock template and kept as-is.

/// Description lines past this count are dropped.
pub const MAX_DESCRIPTION_LINES: usize = 3;

/// Bounding box the signature is shrunk to fit, and the box its position is computed from.
pub const SIGNATURE_BOX: (u32, u32) = (1300, 80);

const NAME_RAISE: f32 = 85.0;
const DESCRIPTION_GAP: f32 = 10.0;
const ORGANIZER_NAME_FROM_BOTTOM: f32 = 200.0;
const ORGANIZER_DESIGNATION_FROM_BOTTOM: f32 = 160.0;
const DATE_FROM_BOTTOM: f32 = 290.0;
const ORGANIZER_DIVISOR: f32 = 3.0;
const DATE_DIVISOR: f32 = 1.5;
const SIGNATURE_DIVISOR: f64 = 1.2;

/// Which of the three faces a run is set in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    /// Attendee name, at the configured size.
    Title,
    /// Description lines, 40% of the title size.
    Body,
    /// Organizer block and date, 32% of the title size.
    Small,
}

/// Rendered pixel extent of a text run: right edge of the inked glyphs, and
/// bottom edge plus the face's descent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

pub trait Measure {
    fn extent(&self, face: Face, text: &str) -> Extent;
}

/// A text run positioned by its top-left origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub face: Face,
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// Everything drawn on a certificate besides the template itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub name: Placement,
    pub description: Vec<Placement>,
    pub organizer_name: Placement,
    pub organizer_designation: Placement,
    pub date: Placement,
    pub signature: (i64, i64),
}

/// Inputs that are the same for every attendee of one run.
#[derive(Clone, Debug)]
pub struct Fixed<'a> {
    pub description: &'a [String],
    pub organizer_name: &'a str,
    pub organizer_designation: &'a str,
    pub date: &'a str,
}

/// Origin that centers `text` of width `text` across `canvas`.
pub fn centered(canvas: u32, text: u32) -> i32 {
    spread(canvas, text, 2.0)
}

/// `(canvas - text) / divisor`, the placement rule every run uses.
fn spread(canvas: u32, text: u32, divisor: f32) -> i32 {
    ((canvas as f32 - text as f32) / divisor).round() as i32
}

/// Signature origin. Computed from the bounding box rather than the resized
/// signature, which biases it toward the bottom-right.
pub fn signature_origin(width: u32, height: u32) -> (i64, i64) {
    let (box_w, box_h) = SIGNATURE_BOX;
    (
        ((width as f64 - box_w as f64) / SIGNATURE_DIVISOR) as i64,
        ((height as f64 - box_h as f64) / SIGNATURE_DIVISOR) as i64,
    )
}

pub fn plan(canvas: (u32, u32), name: &str, fixed: &Fixed<'_>, metrics: &impl Measure) -> Layout {
    let (width, height) = canvas;
    let h = height as f32;

    let name_extent = metrics.extent(Face::Title, name);
    let name_run = Placement {
        face: Face::Title,
        text: name.to_string(),
        x: centered(width, name_extent.width),
        y: ((h - name_extent.height as f32) / 2.0 - NAME_RAISE).round() as i32,
    };

    // Line i sits i of its own heights below the first line.
    let top = (h + name_extent.height as f32) / 2.0 + DESCRIPTION_GAP;
    let description = fixed
        .description
        .iter()
        .take(MAX_DESCRIPTION_LINES)
        .enumerate()
        .map(|(i, line)| {
            let extent = metrics.extent(Face::Body, line);
            Placement {
                face: Face::Body,
                text: line.clone(),
                x: centered(width, extent.width),
                y: (top + i as f32 * extent.height as f32).round() as i32,
            }
        })
        .collect();

    let small = |text: &str, divisor: f32, from_bottom: f32| {
        let extent = metrics.extent(Face::Small, text);
        Placement {
            face: Face::Small,
            text: text.to_string(),
            x: spread(width, extent.width, divisor),
            y: (h - from_bottom).round() as i32,
        }
    };

    Layout {
        name: name_run,
        description,
        organizer_name: small(fixed.organizer_name, ORGANIZER_DIVISOR, ORGANIZER_NAME_FROM_BOTTOM),
        organizer_designation: small(
            fixed.organizer_designation,
            ORGANIZER_DIVISOR,
            ORGANIZER_DESIGNATION_FROM_BOTTOM,
        ),
        date: small(fixed.date, DATE_DIVISOR, DATE_FROM_BOTTOM),
        signature: signature_origin(width, height),
    }
}
