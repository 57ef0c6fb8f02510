//! Text normalization shared by the matcher and the classifier.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Words this long or shorter never count as significant.
pub const SHORT_WORD_MAX: usize = 3;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag regex"));
static HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("html entity regex"));

/// Lower-case, strip Spanish accents, drop everything outside `[a-z0-9 ]`,
/// collapse whitespace.
///
/// `"Río Hurtado: ¡Sequía!"` → `"rio hurtado sequia"`
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfc().flat_map(char::to_lowercase) {
        let mapped = match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            c if c.is_whitespace() => ' ',
            c => c,
        };
        if mapped == ' ' {
            pending_space = !out.is_empty();
        } else if mapped.is_ascii_lowercase() || mapped.is_ascii_digit() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(mapped);
        }
    }

    out
}

/// Replace markup with spaces and decode character references.
///
/// Catalog summaries arrive as HTML fragments; classification runs on the
/// visible text only.
pub fn clean_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = HTML_TAG.replace_all(text, " ");
    let decoded = HTML_ENTITY.replace_all(&stripped, |caps: &regex::Captures| {
        decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
    });
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "Aacute" => 'Á',
        "Eacute" => 'É',
        "Iacute" => 'Í',
        "Oacute" => 'Ó',
        "Uacute" => 'Ú',
        "ntilde" => 'ñ',
        "Ntilde" => 'Ñ',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "iexcl" => '¡',
        "iquest" => '¿',
        "laquo" => '«',
        "raquo" => '»',
        "ndash" => '–',
        "mdash" => '—',
        "ldquo" => '“',
        "rdquo" => '”',
        "lsquo" => '‘',
        "rsquo" => '’',
        "deg" => '°',
        "ordm" => 'º',
        _ => return None,
    };
    Some(c)
}

/// Distinct tokens of an already-normalized string longer than `min_len`,
/// in first-seen order.
pub fn significant_words(normalized: &str, min_len: usize) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for word in normalized.split(' ') {
        if word.chars().count() > min_len && !seen.contains(&word) {
            seen.push(word);
        }
    }
    seen
}
