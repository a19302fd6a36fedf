pub mod encoded_image;
pub mod source_label;

pub use encoded_image::EncodedImage;
pub use source_label::SourceLabel;
