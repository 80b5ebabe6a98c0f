//! URL fragment and path slugs.
//!
//! Non-ASCII letters are folded to ASCII with a fixed table covering Latin-1,
//! Latin Extended-A and the Turkish alphabet. Anything the table does not
//! cover is dropped, so slugs for non-Latin scripts may come out empty and
//! callers supply their own fallback.

/// Characters removed outright from post slugs before separators are placed.
const POST_SLUG_REMOVED: &[char] = &['*', '+', '~', '.', '(', ')', '\'', '"', '!', ':', '@'];

/// Generates a heading anchor slug.
///
/// Lowercases, folds non-ASCII letters, strips everything outside
/// `[a-z0-9- ]`, turns each whitespace run into one hyphen and trims
/// hyphens from both ends. Existing hyphens are kept as they are, so
/// `"a - b"` becomes `"a---b"`.
///
/// # Examples
///
/// ```
/// use blogmark::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("Çalışma Şekli"), "calisma-sekli");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in folded(text) {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            continue;
        }
        if pending_space && !slug.is_empty() {
            slug.push('-');
        }
        pending_space = false;
        slug.push(c);
    }

    slug.trim_matches('-').to_string()
}

/// Generates a post slug from a title.
///
/// Like [`slugify`] but drops `*+~.()'"!:@` and collapses any mix of
/// whitespace, hyphens and underscores into a single hyphen.
///
/// # Examples
///
/// ```
/// use blogmark::post_slug;
///
/// assert_eq!(post_slug("Merhaba Dünya!"), "merhaba-dunya");
/// assert_eq!(post_slug("Rust -- the good parts"), "rust-the-good-parts");
/// ```
pub fn post_slug(title: &str) -> String {
    folded(title)
        .filter(|c| !POST_SLUG_REMOVED.contains(c))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Lowercases and ASCII-folds text, one output char at a time.
fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(|c| {
        let replacement: &str = if c.is_ascii() {
            ""
        } else {
            fold_char(c).unwrap_or(if c.is_whitespace() { " " } else { "" })
        };
        let ascii = c.is_ascii().then(|| c.to_ascii_lowercase());
        ascii.into_iter().chain(replacement.chars())
    })
}

/// ASCII transliteration for a non-ASCII character, in lowercase.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'Ā' | 'ā' | 'Ă'
        | 'ă' | 'Ą' | 'ą' => "a",
        'Æ' | 'æ' => "ae",
        'Ç' | 'ç' | 'Ć' | 'ć' | 'Ĉ' | 'ĉ' | 'Ċ' | 'ċ' | 'Č' | 'č' => "c",
        'Ð' | 'ð' | 'Ď' | 'ď' | 'Đ' | 'đ' => "d",
        'È' | 'É' | 'Ê' | 'Ë' | 'è' | 'é' | 'ê' | 'ë' | 'Ē' | 'ē' | 'Ĕ' | 'ĕ' | 'Ė' | 'ė' | 'Ę'
        | 'ę' | 'Ě' | 'ě' => "e",
        'Ĝ' | 'ĝ' | 'Ğ' | 'ğ' | 'Ġ' | 'ġ' | 'Ģ' | 'ģ' => "g",
        'Ĥ' | 'ĥ' | 'Ħ' | 'ħ' => "h",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'ì' | 'í' | 'î' | 'ï' | 'Ĩ' | 'ĩ' | 'Ī' | 'ī' | 'Ĭ' | 'ĭ' | 'Į'
        | 'į' | 'İ' | 'ı' => "i",
        'Ĳ' | 'ĳ' => "ij",
        'Ĵ' | 'ĵ' => "j",
        'Ķ' | 'ķ' => "k",
        'Ĺ' | 'ĺ' | 'Ļ' | 'ļ' | 'Ľ' | 'ľ' | 'Ŀ' | 'ŀ' | 'Ł' | 'ł' => "l",
        'Ñ' | 'ñ' | 'Ń' | 'ń' | 'Ņ' | 'ņ' | 'Ň' | 'ň' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ō' | 'ō' | 'Ŏ'
        | 'ŏ' | 'Ő' | 'ő' => "o",
        'Œ' | 'œ' => "oe",
        'Ŕ' | 'ŕ' | 'Ŗ' | 'ŗ' | 'Ř' | 'ř' => "r",
        'Ś' | 'ś' | 'Ŝ' | 'ŝ' | 'Ş' | 'ş' | 'Š' | 'š' => "s",
        'ß' => "ss",
        'Ţ' | 'ţ' | 'Ť' | 'ť' | 'Ŧ' | 'ŧ' => "t",
        'Þ' | 'þ' => "th",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'ù' | 'ú' | 'û' | 'ü' | 'Ũ' | 'ũ' | 'Ū' | 'ū' | 'Ŭ' | 'ŭ' | 'Ů'
        | 'ů' | 'Ű' | 'ű' | 'Ų' | 'ų' => "u",
        'Ŵ' | 'ŵ' => "w",
        'Ý' | 'ý' | 'ÿ' | 'Ŷ' | 'ŷ' | 'Ÿ' => "y",
        'Ź' | 'ź' | 'Ż' | 'ż' | 'Ž' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("snake_case name"), "snakecase-name");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("tab\tseparated"), "tab-separated");
    }

    #[test]
    fn test_slugify_keeps_inner_hyphens() {
        assert_eq!(slugify("a - b"), "a---b");
        assert_eq!(slugify("-lead and trail-"), "lead-and-trail");
    }

    #[test]
    fn test_slugify_turkish_letters() {
        assert_eq!(slugify("Işık ve Gölge"), "isik-ve-golge");
        assert_eq!(slugify("İSTANBUL"), "istanbul");
        assert_eq!(slugify("Ağaç"), "agac");
    }

    #[test]
    fn test_slugify_latin_ligatures() {
        assert_eq!(slugify("Straße Æon"), "strasse-aeon");
    }

    #[test]
    fn test_slugify_unfoldable_script_is_dropped() {
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("日本 2"), "2");
    }

    #[test]
    fn test_slugify_non_ascii_whitespace() {
        assert_eq!(slugify("no\u{a0}break"), "no-break");
    }

    #[test]
    fn test_post_slug_removes_listed_characters() {
        assert_eq!(post_slug("Hello: World (v2.0)!"), "hello-world-v20");
    }

    #[test]
    fn test_post_slug_collapses_separators() {
        assert_eq!(post_slug("a - b __ c"), "a-b-c");
    }

    #[test]
    fn test_post_slug_turkish_title() {
        assert_eq!(post_slug("Şu Çılgın Türkler"), "su-cilgin-turkler");
    }

    #[test]
    fn test_post_slug_empty() {
        assert_eq!(post_slug(""), "");
        assert_eq!(post_slug("!!!"), "");
    }
}
