pub mod riff;
pub mod tiff;
