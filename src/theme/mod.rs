/// Color values and their JSON forms.
pub mod color;
/// Theme documents and the built-in themes.
pub mod model;
