//! Standard-14 typefaces used on the signature page.
//!
//! Only two faces are needed: Helvetica for body/caption/intro text and
//! Times-BoldItalic for the signature name. Neither font program is embedded
//! in the output; the page references them by base font name, so widths come
//! from the published AFM metrics (glyph units per 1000 em).

/// First character covered by the width tables.
const FIRST_CHAR: usize = 0x20;

/// Helvetica advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Times-BoldItalic advance widths for 0x20..=0x7E.
#[rustfmt::skip]
const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333,
    250, 278, 500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333,
    570, 570, 570, 500, 832, 667, 667, 667, 722, 667, 667, 722, 778, 389,
    500, 667, 611, 889, 722, 722, 611, 722, 667, 556, 611, 722, 667, 889,
    667, 611, 611, 333, 278, 333, 570, 500, 333, 500, 500, 444, 500, 444,
    333, 500, 556, 278, 278, 500, 278, 778, 556, 500, 500, 500, 389, 389,
    278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

/// One of the fixed typefaces available to the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Helvetica,
    TimesBoldItalic,
}

impl FontFace {
    /// PostScript base font name used in the font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::TimesBoldItalic => "Times-BoldItalic",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            FontFace::Helvetica => &HELVETICA_WIDTHS,
            FontFace::TimesBoldItalic => &TIMES_BOLD_ITALIC_WIDTHS,
        }
    }

    /// Advance width of a single character in glyph units.
    /// Characters outside the table fall back to the face's missing width.
    fn char_width(&self, c: char) -> u16 {
        let widths = self.widths();
        (c as usize)
            .checked_sub(FIRST_CHAR)
            .and_then(|index| widths.get(index))
            .copied()
            .unwrap_or(match self {
                FontFace::Helvetica => 556,
                FontFace::TimesBoldItalic => 500,
            })
    }

    /// Width of `text` in page units when set at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let units: u64 = text.chars().map(|c| u64::from(self.char_width(c))).sum();
        units as f64 * font_size / 1000.0
    }
}

/// A face registered in the appended page's resources under `name`.
/// Three handles are created per composition: body text, signature name,
/// and intro text (intro shares the body face but gets its own handle).
#[derive(Debug, Clone)]
pub struct FontHandle {
    name: String,
    face: FontFace,
}

impl FontHandle {
    pub(crate) fn new(name: String, face: FontFace) -> Self {
        FontHandle { name, face }
    }

    /// Resource name on the page, e.g. `F1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn face(&self) -> FontFace {
        self.face
    }

    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.face.text_width(text, font_size)
    }
}
