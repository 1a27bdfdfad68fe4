use app_state::CompressionSettings;
use color_eyre::eyre::eyre;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use futures_util::future::try_join_all;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageBuffer, ImageReader, Rgb};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Mime type of every compressed output, whatever the input format was.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// How much the jpeg quality drops for the single oversized-output retry.
const QUALITY_STEP_DOWN: f32 = 0.2;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("input could not be decoded as an image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("compressed output could not be produced: {0}")]
    Encode(#[source] color_eyre::Report),

    #[error("compression worker stopped unexpectedly: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A size- and dimension-bounded jpeg rendition of one input image.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_byte_size: u64,
}

impl CompressedImage {
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Scales dimensions down by a single factor so that both bounds are
/// satisfied and the binding bound is hit exactly. Images already inside the
/// bounds keep their dimensions.
fn bounded_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let target_w = (f64::from(width) * scale).round().max(1.0) as u32;
    let target_h = (f64::from(height) * scale).round().max(1.0) as u32;
    (target_w, target_h)
}

fn resample(
    src: ImageBuffer<Rgb<u8>, Vec<u8>>,
    target_w: u32,
    target_h: u32,
) -> Result<ImageBuffer<Rgb<u8>, Vec<u8>>, CompressError> {
    let (orig_w, orig_h) = src.dimensions();

    let src_image = Image::from_vec_u8(orig_w, orig_h, src.into_raw(), PixelType::U8x3)
        .map_err(|e| CompressError::Encode(e.into()))?;
    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .map_err(|e| CompressError::Encode(e.into()))?;

    ImageBuffer::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| CompressError::Encode(eyre!("failed to construct resized image")))
}

fn encode_jpeg(
    img: &ImageBuffer<Rgb<u8>, Vec<u8>>,
    quality: f32,
) -> Result<Vec<u8>, CompressError> {
    let quality = (quality.clamp(0.05, 1.0) * 100.0) as u8;
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CompressError::Encode(e.into()))?;
    if out.is_empty() {
        return Err(CompressError::Encode(eyre!("encoder produced no output")));
    }
    Ok(out)
}

/// Compresses one image in memory: decode, scale into the configured bounds
/// with the aspect ratio preserved, and re-encode as jpeg.
///
/// When the first encode misses the byte budget the quality is stepped down
/// once and that result is accepted regardless of its size, so the worst case
/// stays bounded. No network or disk side effects.
pub fn compress(
    input: &[u8],
    settings: &CompressionSettings,
) -> Result<CompressedImage, CompressError> {
    let decoded = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| CompressError::Decode(image::ImageError::IoError(e)))?
        .decode()
        .map_err(CompressError::Decode)?;

    let src = decoded.into_rgb8();
    let (orig_w, orig_h) = src.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(CompressError::Encode(eyre!(
            "source image has a zero dimension"
        )));
    }

    let (target_w, target_h) =
        bounded_dimensions(orig_w, orig_h, settings.max_width, settings.max_height);

    let raster = if (target_w, target_h) == (orig_w, orig_h) {
        src
    } else {
        resample(src, target_w, target_h)?
    };

    let mut bytes = encode_jpeg(&raster, settings.quality)?;
    if bytes.len() as u64 > settings.max_size_bytes() {
        debug!(
            "Compressed output of {} bytes misses the {} byte budget, stepping quality down",
            bytes.len(),
            settings.max_size_bytes()
        );
        bytes = encode_jpeg(&raster, settings.quality - QUALITY_STEP_DOWN)?;
    }

    Ok(CompressedImage {
        bytes,
        width: target_w,
        height: target_h,
        original_byte_size: input.len() as u64,
    })
}

/// Compresses a batch of images concurrently, preserving input order.
///
/// One failed image fails the whole batch; partial results are discarded.
pub async fn compress_batch(
    inputs: Vec<Vec<u8>>,
    settings: &CompressionSettings,
) -> Result<Vec<CompressedImage>, CompressError> {
    let handles = inputs.into_iter().map(|bytes| {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || compress(&bytes, &settings))
    });

    let joined = try_join_all(handles).await?;
    joined.into_iter().collect()
}
