pub mod button;
pub mod card;
pub mod spinner;
pub mod textarea;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use button::*;
#[allow(unused_imports)]
pub use card::*;
pub use spinner::*;
pub use textarea::*;
