//! Mapping editor font settings onto the PDF standard fonts.

use folio_engine::StandardFont;
use folio_model::{FontStyle, FontWeight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Helvetica,
    Times,
    Courier,
}

fn family_of(css_family: &str) -> Family {
    let family = css_family.to_lowercase();
    if family.contains("monospace") || family.contains("courier") {
        Family::Courier
    } else if family.contains("serif") && !family.contains("sans-serif") {
        Family::Times
    } else {
        Family::Helvetica
    }
}

/// Pick the standard font for a CSS-style family list plus weight and style.
///
/// Anything that is neither monospace nor a serif family renders as
/// Helvetica.
pub fn resolve_font(css_family: &str, weight: FontWeight, style: FontStyle) -> StandardFont {
    let bold = weight == FontWeight::Bold;
    let italic = style == FontStyle::Italic;

    match (family_of(css_family), bold, italic) {
        (Family::Helvetica, false, false) => StandardFont::Helvetica,
        (Family::Helvetica, true, false) => StandardFont::HelveticaBold,
        (Family::Helvetica, false, true) => StandardFont::HelveticaOblique,
        (Family::Helvetica, true, true) => StandardFont::HelveticaBoldOblique,
        (Family::Times, false, false) => StandardFont::TimesRoman,
        (Family::Times, true, false) => StandardFont::TimesBold,
        (Family::Times, false, true) => StandardFont::TimesItalic,
        (Family::Times, true, true) => StandardFont::TimesBoldItalic,
        (Family::Courier, false, false) => StandardFont::Courier,
        (Family::Courier, true, false) => StandardFont::CourierBold,
        (Family::Courier, false, true) => StandardFont::CourierOblique,
        (Family::Courier, true, true) => StandardFont::CourierBoldOblique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_matching() {
        let plain = |family| resolve_font(family, FontWeight::Normal, FontStyle::Normal);

        assert_eq!(plain("Helvetica, Arial, sans-serif"), StandardFont::Helvetica);
        assert_eq!(plain("Georgia, serif"), StandardFont::TimesRoman);
        assert_eq!(plain("'Courier New', monospace"), StandardFont::Courier);
        assert_eq!(plain("ui-monospace"), StandardFont::Courier);
        assert_eq!(plain("Comic Sans"), StandardFont::Helvetica);
    }

    #[test]
    fn test_bold_italic_serif() {
        assert_eq!(
            resolve_font("Times New Roman, serif", FontWeight::Bold, FontStyle::Italic),
            StandardFont::TimesBoldItalic
        );
    }

    #[test]
    fn test_variants() {
        assert_eq!(
            resolve_font("Arial", FontWeight::Bold, FontStyle::Normal),
            StandardFont::HelveticaBold
        );
        assert_eq!(
            resolve_font("monospace", FontWeight::Normal, FontStyle::Italic),
            StandardFont::CourierOblique
        );
        assert_eq!(
            resolve_font("SERIF", FontWeight::Bold, FontStyle::Normal),
            StandardFont::TimesBold
        );
    }
}
