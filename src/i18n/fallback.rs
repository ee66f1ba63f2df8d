//! Fallback resolution of a requested culture to the best available text.

use crate::dictionary::Translations;
use crate::i18n::Culture;

/// The cultures consulted, in order, when looking up `target`.
///
/// 1. `target` itself
/// 2. its parent
/// 3. its two-letter reduction
/// 4. the parent's two-letter reduction
/// 5. `input`, the culture the text was authored in
///
/// With `exact`, only step 1 is consulted. Duplicates are removed, keeping the
/// first occurrence.
pub fn fallback_chain(target: &Culture, input: &Culture, exact: bool) -> Vec<Culture> {
    let mut chain = vec![target.clone()];
    if exact {
        return chain;
    }

    let parent = target.parent();
    let candidates = [
        parent.clone(),
        Some(target.two_letter()),
        parent.as_ref().map(Culture::two_letter),
        Some(input.clone()),
    ];

    for candidate in candidates.into_iter().flatten() {
        if !chain.contains(&candidate) {
            chain.push(candidate);
        }
    }
    chain
}

/// Look up `key` for `target`, walking the fallback chain.
pub fn get_translation<'a>(
    translations: &'a Translations,
    target: &Culture,
    key: &str,
    input: &Culture,
    exact: bool,
) -> Option<&'a str> {
    fallback_chain(target, input, exact)
        .iter()
        .find_map(|culture| translations.get(culture, key))
}
