//! Slug derivation
//!
//! Turns a display name into a URL-safe identifier: lowercase ASCII with
//! single hyphens between words. Cyrillic input is transliterated using the
//! Ukrainian official romanization (with the handful of Russian-only letters
//! covered as well), matching the catalog's source data.

/// Derive a slug from a display name
///
/// - ASCII letters and digits are kept, lowercased
/// - Cyrillic letters are transliterated to their ASCII equivalents
/// - Every other run of characters collapses into a single hyphen
/// - No leading or trailing hyphens; empty input yields an empty slug
///
/// The function is idempotent: feeding a slug back in returns it unchanged.
///
/// # Example
///
/// ```
/// use atlas_core::slug::derive_slug;
///
/// assert_eq!(derive_slug("Kyiv City"), "kyiv-city");
/// assert_eq!(derive_slug("Київ"), "kyiv");
/// ```
pub fn derive_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap_pending = false;

    for ch in name.chars() {
        match classify(ch) {
            Glyph::Literal(c) => {
                if gap_pending && !slug.is_empty() {
                    slug.push('-');
                }
                gap_pending = false;
                slug.push(c);
            }
            Glyph::Mapped(s) => {
                if gap_pending && !slug.is_empty() {
                    slug.push('-');
                }
                gap_pending = false;
                slug.push_str(s);
            }
            Glyph::Silent => {}
            Glyph::Separator => {
                gap_pending = true;
            }
        }
    }

    slug
}

/// How a single input character contributes to the slug
enum Glyph {
    /// Kept as-is (already lowercased)
    Literal(char),
    /// Replaced by a transliteration
    Mapped(&'static str),
    /// Dropped without acting as a word boundary (soft/hard signs)
    Silent,
    /// Acts as a word boundary
    Separator,
}

fn classify(ch: char) -> Glyph {
    if ch.is_ascii_alphanumeric() {
        return Glyph::Literal(ch.to_ascii_lowercase());
    }

    let lower = ch.to_lowercase().next().unwrap_or(ch);
    match transliterate(lower) {
        Some("") => Glyph::Silent,
        Some(mapped) => Glyph::Mapped(mapped),
        None => Glyph::Separator,
    }
}

/// Romanization table for lowercase Cyrillic letters
///
/// Ukrainian letters follow the official KMU-2010 system; the Russian-only
/// letters map to their closest equivalents.
fn transliterate(ch: char) -> Option<&'static str> {
    Some(match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "i",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' => "",
        'ю' => "iu",
        'я' => "ia",
        // Russian-only letters
        'ё' => "e",
        'ъ' => "",
        'ы' => "y",
        'э' => "e",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(derive_slug("Kyiv City"), "kyiv-city");
        assert_eq!(derive_slug("New   York"), "new-york");
    }

    #[test]
    fn transliterates_ukrainian() {
        assert_eq!(derive_slug("Київ"), "kyiv");
        assert_eq!(derive_slug("Львів"), "lviv");
        assert_eq!(derive_slug("Запоріжжя"), "zaporizhzhia");
        assert_eq!(derive_slug("Івано-Франківськ"), "ivano-frankivsk");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(derive_slug("a -- b!!c"), "a-b-c");
        assert_eq!(derive_slug("  trimmed  "), "trimmed");
    }

    #[test]
    fn no_leading_or_trailing_hyphens() {
        assert_eq!(derive_slug("---kyiv---"), "kyiv");
        assert_eq!(derive_slug("!?"), "");
    }

    #[test]
    fn empty_name_yields_empty_slug() {
        assert_eq!(derive_slug(""), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(derive_slug("Sector 7B"), "sector-7b");
    }

    #[test]
    fn is_idempotent() {
        for name in ["Kyiv City", "Київ", "a -- b!!c", "Sector 7B", ""] {
            let once = derive_slug(name);
            assert_eq!(derive_slug(&once), once, "not idempotent for {:?}", name);
        }
    }
}
