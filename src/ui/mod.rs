pub mod composer_view;
pub mod form_field;
pub mod terminal_guard;

pub use composer_view::{ComposerView, Focus, StatusKind};
pub use form_field::FormField;
pub use terminal_guard::{install_panic_hook, TerminalGuard};
