//! Vault codec
//!
//! Splits a block's markup into translatable text with inert placeholders and
//! a vault of verbatim fragments, and rebuilds markup from translated text.
//!
//! Element placeholders are `⟨elem:i⟩`; cross-article links travel as
//! `⟨wp_link title="T" ja="T"⟩label⟨/wp_link⟩` so the translator can propose a
//! target-language title in `ja`.

pub mod decode;
pub mod links;
pub mod placeholder;
pub mod vault;

pub use decode::{decode, restore_elements};
pub use links::LinkResolution;
pub use vault::{encode, Encoded, Shell, Vault};
