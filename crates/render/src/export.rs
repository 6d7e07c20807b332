use std::io::{Seek, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use jyrobot_common::Picture;
use tracing::debug;

use crate::RenderError;

/// PNG keeps alpha; every other format gets the RGB channels only.
fn encodable(picture: &Picture, format: ImageFormat) -> DynamicImage {
    let image = DynamicImage::ImageRgba8(picture.as_image().clone());
    match format {
        ImageFormat::Png => image,
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// Encode `picture` into `out` in the given format.
pub fn write_picture<W: Write + Seek>(
    picture: &Picture,
    out: &mut W,
    format: ImageFormat,
) -> Result<(), RenderError> {
    encodable(picture, format).write_to(out, format)?;
    Ok(())
}

/// Save `picture` to `path`, choosing the encoder from the extension
/// (`.png`, `.ppm`, `.pnm`).
pub fn save_picture(picture: &Picture, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    encodable(picture, format).save_with_format(path, format)?;
    debug!(
        path = %path.display(),
        ?format,
        width = picture.width(),
        height = picture.height(),
        "picture saved"
    );
    Ok(())
}
