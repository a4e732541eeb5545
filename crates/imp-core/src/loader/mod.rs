pub mod image;

pub use image::{ImageLoader, LoadedImage};
