/// Canonicalize text for robust substring comparison against LLM output.
///
/// Typographic single quotes (U+2018/U+2019) become plain apostrophes; thin
/// space, narrow no-break space, and no-break space become ordinary spaces;
/// whitespace runs collapse to single spaces with the ends trimmed; the
/// result is lowercased. Idempotent and total.
pub fn normalize(text: &str) -> String {
    let unified: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2009}' | '\u{202f}' | '\u{00a0}' => ' ',
            other => other,
        })
        .collect();
    unified
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
