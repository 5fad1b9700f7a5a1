/// Characters that survive slugification untouched (besides ASCII alphanumerics
/// and whitespace).
const KEPT_PUNCTUATION: &[char] = &[
    '*', '_', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@',
];

/// Slug for a taxonomy name, lower-cased.
///
/// - a small Latin/symbol map is transliterated first (`é` → `e`, `&` → `and`, `$` → `dollar`)
/// - hyphens count as whitespace
/// - anything else outside `[A-Za-z0-9]`, whitespace and [`KEPT_PUNCTUATION`] is dropped
/// - runs of whitespace collapse to a single `-`, leading/trailing ones vanish
pub fn slugify(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        match transliterate(ch) {
            Some(mapped) => cleaned.extend(mapped.chars().filter(|c| is_kept(*c))),
            None if ch == '-' => cleaned.push(' '),
            None if is_kept(ch) => cleaned.push(ch),
            None => {}
        }
    }

    let mut slug = String::with_capacity(cleaned.len());
    for word in cleaned.split_whitespace() {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(word);
    }
    slug.to_lowercase()
}

/// Game slugs come from the storefront already slugged, with `_` separators.
pub fn game_slug(product_slug: &str) -> String {
    product_slug.replace('_', "-")
}

fn is_kept(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch.is_whitespace() || KEPT_PUNCTUATION.contains(&ch)
}

fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' => "C",
        'ç' => "c",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        'Ł' => "L",
        'ł' => "l",
        'Ś' | 'Š' => "S",
        'ś' | 'š' => "s",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        '$' => "dollar",
        '&' => "and",
        '%' => "percent",
        '<' => "less",
        '>' => "greater",
        '|' => "or",
        '©' => "(c)",
        '®' => "(r)",
        '™' => "tm",
        '€' => "euro",
        '£' => "pound",
        _ => return None,
    };
    Some(s)
}
