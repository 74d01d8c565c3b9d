//! Cover images: uploaded files as data URLs and generated placeholders.

pub mod payload;
pub mod placeholder;

pub use payload::{bytes_to_image_payload, decode_image_payload, file_to_image_payload};
pub use placeholder::{
    PlaceholderOptions, generate_placeholder, generate_placeholder_with, render_placeholder,
};
