mod banner;
mod help_overlay;
mod status_bar;
mod text_input;

pub use banner::Banner;
pub use help_overlay::HelpOverlay;
pub use status_bar::StatusBar;
pub use text_input::TextInput;
