/// Layout documents, key definitions and character lookup.
pub mod model;
