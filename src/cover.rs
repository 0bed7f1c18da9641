/*!
 * Cover image resizing.
 *
 * Scales a cover image to a reference size (1146x717 by default). The default
 * mode scales until the image covers the whole reference box; `keep` scales it
 * to fit inside instead. With `padding`, the result is centered on a black
 * canvas of exactly the reference size, which crops the overflow of a covering
 * image and letterboxes a fitted one.
 */

use std::path::Path;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CoverError;

/// Options controlling the output geometry and format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverOptions {
    /// Reference width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Reference height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Fit inside the reference box instead of covering it
    #[serde(default)]
    pub keep: bool,

    /// Pad (or crop) to exactly the reference size
    #[serde(default)]
    pub padding: bool,

    /// Output format name, e.g. "jpeg" or "png"
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CoverOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            keep: false,
            padding: false,
            extension: default_extension(),
        }
    }
}

fn default_width() -> u32 {
    1146
}

fn default_height() -> u32 {
    717
}

fn default_extension() -> String {
    "jpeg".to_string()
}

/// Cover processor
pub struct Cover {
    options: CoverOptions,
}

impl Cover {
    pub fn new(options: CoverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CoverOptions {
        &self.options
    }

    /// Open an image file and convert it to RGB
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RgbImage, CoverError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| CoverError::InvalidImage {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(image.to_rgb8())
    }

    /// Resize an image according to the options
    pub fn resize(&self, image: &RgbImage) -> RgbImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = target_size(width, height, &self.options);
        debug!("Resizing cover from {}x{} to {}x{}", width, height, new_width, new_height);

        let resized = imageops::resize(image, new_width, new_height, FilterType::Lanczos3);

        if self.options.padding {
            pad_to(&resized, self.options.width, self.options.height)
        } else {
            resized
        }
    }

    /// Load, resize and save a cover in one go
    pub fn process<P1: AsRef<Path>, P2: AsRef<Path>>(&self, input: P1, output: P2) -> Result<(), CoverError> {
        let format = output_format(&self.options.extension)?;
        let image = Self::load(input)?;
        let resized = self.resize(&image);
        let output = output.as_ref();

        DynamicImage::ImageRgb8(resized)
            .save_with_format(output, format)
            .map_err(|source| CoverError::Save {
                path: output.to_path_buf(),
                source,
            })
    }
}

/// Compute the resized dimensions for an image of `width` x `height`
pub fn target_size(width: u32, height: u32, options: &CoverOptions) -> (u32, u32) {
    let (width, height) = (u64::from(width.max(1)), u64::from(height.max(1)));
    let (ref_width, ref_height) = (u64::from(options.width), u64::from(options.height));

    // Compare ref_width / width against ref_height / height without rounding.
    // Covering takes the larger factor, fitting the smaller one.
    let width_scale_larger = ref_width * height > ref_height * width;
    let scale_by_width = width_scale_larger != options.keep;

    let (new_width, new_height) = if scale_by_width {
        (ref_width, height * ref_width / width)
    } else {
        (width * ref_height / height, ref_height)
    };

    (clamp_dimension(new_width), clamp_dimension(new_height))
}

fn clamp_dimension(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX).max(1)
}

// @centers: Image on a black canvas, clipping any overflow
fn pad_to(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let x = (i64::from(width) - i64::from(image.width())) / 2;
    let y = (i64::from(height) - i64::from(image.height())) / 2;
    imageops::overlay(&mut canvas, image, x, y);
    canvas
}

/// Map an extension name to an image format
pub fn output_format(extension: &str) -> Result<ImageFormat, CoverError> {
    let ext = extension.trim_start_matches('.').to_lowercase();
    ImageFormat::from_extension(&ext).ok_or(CoverError::UnsupportedFormat(ext))
}
