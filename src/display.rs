//! Bridge between the store and host UI controls.
//!
//! The store never inspects control types. A host implements [`DisplayText`]
//! for each kind of control it wants to localize and hands the control to
//! [`apply_display_text`] or [`capture_display_text`].

use crate::error::Result;
use crate::i18n::Culture;
use crate::store::LocalizationStore;
use tracing::debug;

/// Read and write access to the text a control shows to the user.
pub trait DisplayText {
    fn display_text(&self) -> Option<String>;

    fn set_display_text(&mut self, text: &str);
}

/// Set `control`'s text to the best translation of `key` for `target`.
///
/// Returns `false` and leaves the control untouched when no culture in the
/// fallback chain has the key.
pub fn apply_display_text<C: DisplayText + ?Sized>(
    store: &LocalizationStore,
    key: &str,
    control: &mut C,
    target: &Culture,
) -> Result<bool> {
    match store.get_translation(target, key, false)? {
        Some(text) => {
            control.set_display_text(&text);
            Ok(true)
        }
        None => {
            debug!("No translation of {} for {}", key, target);
            Ok(false)
        }
    }
}

/// Store `control`'s current text as the `culture` translation of `key`.
///
/// Controls with no text are skipped and `false` is returned.
pub fn capture_display_text<C: DisplayText + ?Sized>(
    store: &LocalizationStore,
    key: &str,
    control: &C,
    culture: &Culture,
) -> Result<bool> {
    let Some(text) = control.display_text().filter(|text| !text.is_empty()) else {
        return Ok(false);
    };
    store.update(key, [(culture.clone(), text)])?;
    Ok(true)
}
