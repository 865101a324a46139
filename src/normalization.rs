/// Normalizes a user-supplied name into a filesystem-safe path
/// segment: the text is decomposed into Unicode Normalization Form KD,
/// whitespace runs become a single `_`, everything outside
/// `[A-Za-z0-9._-]` is dropped, and leading/trailing dots and
/// underscores are stripped.
///
/// ```
/// use paraulins::normalization::sanitize;
/// assert_eq!(sanitize(" el  gos "), "el_gos");
/// assert_eq!(sanitize("canço"), "canco");
/// assert_eq!(sanitize("../../etc"), "etc");
/// ```
pub fn sanitize(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    let decomposed = name.as_ref().nfkd().collect::<String>();

    let joined = decomposed.split_whitespace().collect::<Vec<_>>().join("_");

    let kept = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Returns the lowercased extension of an uploaded filename, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;

    if extension.is_empty() {
        None
    } else {
        Some(extension.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{extension, sanitize};

    #[test]
    fn extensions_are_lowercased() {
        assert_eq!(extension("hola.MP3"), Some("mp3".to_owned()));
        assert_eq!(extension("archive.tar.gz"), Some("gz".to_owned()));
        assert_eq!(extension(".webm"), Some("webm".to_owned()));
        assert_eq!(extension("noextension"), None);
        assert_eq!(extension("trailingdot."), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 10000, ..ProptestConfig::default()
        })]

        #[test]
        fn sanitization_works(string in "\\PC*") {
            let sanitized = sanitize(&string);

            prop_assert!(
                sanitized
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')),
                "{:?} (sanitized form of {:?}) contains only safe characters",
                sanitized,
                string
            );

            prop_assert!(
                !sanitized.starts_with('.')
                    && !sanitized.starts_with('_')
                    && !sanitized.ends_with('.')
                    && !sanitized.ends_with('_'),
                "{:?} (sanitized form of {:?}) has no surrounding dots or underscores",
                sanitized,
                string
            );

            prop_assert_eq!(
                sanitize(&sanitized),
                sanitized.clone(),
                "sanitizing {:?} twice changes nothing",
                string
            );
        }
    }
}
