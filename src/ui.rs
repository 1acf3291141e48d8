//! Page components that consume the language switcher.

/// Language dropdowns
pub mod dropdown;
/// Mobile navigation drawer
pub mod mobile_menu;

pub use dropdown::LanguageDropdowns;
pub use mobile_menu::MobileMenu;
