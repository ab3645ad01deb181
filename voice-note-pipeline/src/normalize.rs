//! Case and accent folding applied to transcripts before command matching.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block (U+0300..=U+036F).
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, strip diacritics and trim surrounding whitespace.
///
/// Total: every input yields an output, and already-normalized ASCII text is
/// returned unchanged.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .collect();
    folded.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents_and_case() {
        assert_eq!(normalize("  Evolução CLÍNICA  "), "evolucao clinica");
        assert_eq!(normalize("Joãozinho do LEITO 8"), "joaozinho do leito 8");
    }

    #[test]
    fn test_identity_on_normalized_ascii() {
        let text = "mostrar paciente 5";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_keeps_internal_whitespace() {
        assert_eq!(normalize("mostrar   paciente   5"), "mostrar   paciente   5");
    }
}
