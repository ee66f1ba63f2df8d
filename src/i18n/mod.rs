//! Culture identities and fallback resolution.
//!
//! # Architecture
//!
//! - `registry`: the known languages a tag may name
//! - `culture`: validated, normalized `Culture` type with parent/two-letter forms
//! - `fallback`: the ordered chain of cultures consulted for a missing translation
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_l10n::i18n::{get_translation, Culture};
//!
//! let target = Culture::resolve("en-US", false)?;
//! let header = Culture::resolve_or_default("Svenska (sv)", false);
//! let text = get_translation(&translations, &target, "greeting", &input, false);
//! ```

mod culture;
mod fallback;
mod registry;

pub use culture::Culture;
pub use fallback::{fallback_chain, get_translation};
pub use registry::{CultureInfo, CultureRegistry};
