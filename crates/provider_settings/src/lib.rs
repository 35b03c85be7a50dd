mod checker;
mod debounce;
mod field;
mod form;
mod model_list;
mod provider;
mod settings;
mod store;

pub use checker::*;
pub use debounce::*;
pub use field::*;
pub use form::*;
pub use model_list::*;
pub use provider::*;
pub use settings::*;
pub use store::*;

use gpui::SharedString;

rust_i18n::i18n!("locales", fallback = "en");

/// Set the locale used by the translated labels, e.g. `en`, `zh-CN`.
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a key, a missing key returns the key itself.
pub(crate) fn tr(key: &str) -> SharedString {
    SharedString::from(rust_i18n::t!(key).to_string())
}
