//! Placement math for the signature page.
//!
//! Everything here is a pure function of the display name and the watermark
//! dimensions. The page is always US Letter with a bottom-left origin, and
//! every signature element hangs off a single baseline 150 units below the
//! top edge. Offsets are fixed; there is no collision avoidance.

use crate::fonts::FontFace;

pub const LETTER_WIDTH: f64 = 612.0;
pub const LETTER_HEIGHT: f64 = 792.0;

const BASELINE_DROP: f64 = 150.0;
const INTRO_DROP: f64 = 40.0;
const RULE_DROP: f64 = 8.0;
const CAPTION_DROP: f64 = 25.0;
const IMAGE_DROP: f64 = 205.0;

const INTRO_SIZE: f64 = 12.0;
const NAME_SIZE: f64 = 18.0;
const FOOTER_SIZE: f64 = 13.0;

/// Leftward nudge applied to the signature name only.
const NAME_NUDGE: f64 = 15.0;
/// Underscores appended to the rule regardless of name width.
const RULE_TAIL: &str = "________________";

pub const IMAGE_SCALE: f64 = 0.5;
/// Fixed visual margin subtracted from each drawn image dimension.
const IMAGE_MARGIN: f64 = 15.0;
/// Floor for degenerate drawn dimensions (margin larger than the image).
const MIN_IMAGE_DIMENSION: f64 = 1.0;

const INTRO_TEXT: &str =
    "Este documento fue construido por medio de la plataforma DEBTLatam.";
const CAPTION_TEXT: &str = "Firma Cliente";

/// One line of text with its resolved position and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// The watermark's resolved position and drawn dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ImagePlacement {
    /// True when the margin reduction hit the minimum-dimension floor.
    pub fn is_clamped(&self) -> bool {
        self.width <= MIN_IMAGE_DIMENSION || self.height <= MIN_IMAGE_DIMENSION
    }
}

/// Every draw the composer performs on the appended page.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureLayout {
    pub intro: TextPlacement,
    pub name: TextPlacement,
    pub rule: TextPlacement,
    pub caption: TextPlacement,
    pub image: ImagePlacement,
}

/// Compute all placements for `signature_name` and a watermark of
/// `image_dimensions` (native pixels, scaled by [`IMAGE_SCALE`] before the
/// margin reduction).
pub fn signature_layout(signature_name: &str, image_dimensions: (f64, f64)) -> SignatureLayout {
    let baseline = LETTER_HEIGHT - BASELINE_DROP;
    let name_width = FontFace::TimesBoldItalic.text_width(signature_name, NAME_SIZE);

    let intro = TextPlacement {
        x: centered(FontFace::Helvetica.text_width(INTRO_TEXT, INTRO_SIZE)),
        y: LETTER_HEIGHT - INTRO_DROP,
        text: INTRO_TEXT.to_owned(),
        font_size: INTRO_SIZE,
    };

    let name = TextPlacement {
        x: centered(name_width) - NAME_NUDGE,
        y: baseline,
        text: signature_name.to_owned(),
        font_size: NAME_SIZE,
    };

    let rule_text = format!(
        "{}{}",
        "_".repeat((name_width / NAME_SIZE).floor() as usize),
        RULE_TAIL
    );
    let rule = TextPlacement {
        x: centered(FontFace::Helvetica.text_width(&rule_text, FOOTER_SIZE)),
        y: baseline - RULE_DROP,
        text: rule_text,
        font_size: FOOTER_SIZE,
    };

    // The caption centers on the *name's* width at footer size, not its own.
    let caption = TextPlacement {
        x: centered(FontFace::Helvetica.text_width(signature_name, FOOTER_SIZE)),
        y: baseline - CAPTION_DROP,
        text: CAPTION_TEXT.to_owned(),
        font_size: FOOTER_SIZE,
    };

    let (scaled_width, scaled_height) = (
        image_dimensions.0 * IMAGE_SCALE,
        image_dimensions.1 * IMAGE_SCALE,
    );
    let image = ImagePlacement {
        x: centered(scaled_width),
        y: baseline - IMAGE_DROP,
        width: (scaled_width - IMAGE_MARGIN).max(MIN_IMAGE_DIMENSION),
        height: (scaled_height - IMAGE_MARGIN).max(MIN_IMAGE_DIMENSION),
    };

    SignatureLayout {
        intro,
        name,
        rule,
        caption,
        image,
    }
}

fn centered(width: f64) -> f64 {
    (LETTER_WIDTH - width) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn name_centers_with_fixed_nudge() {
        for name in ["Jane Doe", "X", "Maximiliano de la Santisima Trinidad"] {
            let layout = signature_layout(name, (100.0, 100.0));
            let width = FontFace::TimesBoldItalic.text_width(name, 18.0);
            let midpoint = layout.name.x + width / 2.0;
            assert!(
                (midpoint - (LETTER_WIDTH / 2.0 - 15.0)).abs() < TOLERANCE,
                "name midpoint off for {name:?}: {midpoint}"
            );
        }
    }

    #[test]
    fn elements_hang_off_the_baseline() {
        let layout = signature_layout("Jane Doe", (100.0, 100.0));
        let baseline = LETTER_HEIGHT - 150.0;
        assert_eq!(layout.name.y, baseline);
        assert_eq!(layout.rule.y, baseline - 8.0);
        assert_eq!(layout.caption.y, baseline - 25.0);
        assert_eq!(layout.image.y, baseline - 205.0);
        assert_eq!(layout.intro.y, LETTER_HEIGHT - 40.0);
    }

    #[test]
    fn rule_length_tracks_name_width() {
        let layout = signature_layout("Jane Doe", (100.0, 100.0));
        let name_width = FontFace::TimesBoldItalic.text_width("Jane Doe", 18.0);
        let expected = (name_width / 18.0).floor() as usize + 16;
        assert_eq!(layout.rule.text.chars().count(), expected);
        assert!(layout.rule.text.chars().all(|c| c == '_'));
    }

    #[test]
    fn empty_name_still_gets_the_fixed_rule_tail() {
        let layout = signature_layout("", (100.0, 100.0));
        assert_eq!(layout.rule.text.len(), 16);
    }

    #[test]
    fn rule_and_intro_center_on_their_own_widths() {
        let layout = signature_layout("Jane Doe", (100.0, 100.0));
        for (placement, size) in [(&layout.rule, 13.0), (&layout.intro, 12.0)] {
            let width = FontFace::Helvetica.text_width(&placement.text, size);
            let midpoint = placement.x + width / 2.0;
            assert!((midpoint - LETTER_WIDTH / 2.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn caption_centers_on_the_name_width() {
        let layout = signature_layout("Jane Doe", (100.0, 100.0));
        let name_width = FontFace::Helvetica.text_width("Jane Doe", 13.0);
        let expected = (LETTER_WIDTH - name_width) / 2.0;
        assert!((layout.caption.x - expected).abs() < TOLERANCE);
        assert_eq!(layout.caption.text, "Firma Cliente");
    }

    #[test]
    fn image_scales_then_loses_margin() {
        let layout = signature_layout("Jane Doe", (400.0, 300.0));
        assert!((layout.image.x - (LETTER_WIDTH - 200.0) / 2.0).abs() < TOLERANCE);
        assert_eq!(layout.image.width, 185.0);
        assert_eq!(layout.image.height, 135.0);
        assert!(!layout.image.is_clamped());
    }

    #[test]
    fn tiny_image_clamps_instead_of_going_negative() {
        let layout = signature_layout("Jane Doe", (10.0, 10.0));
        assert_eq!(layout.image.width, 1.0);
        assert_eq!(layout.image.height, 1.0);
        assert!(layout.image.is_clamped());
    }

    #[test]
    fn layout_is_deterministic() {
        let first = signature_layout("Jane Doe", (64.0, 32.0));
        let second = signature_layout("Jane Doe", (64.0, 32.0));
        assert_eq!(first, second);
    }
}
