pub mod decode;
pub mod media;
pub mod pixels;
pub mod source;
