use crate::renderer::PixelBuffer;
use anyhow::Result;

/// The denoiser exchange format: three interleaved-RGB float buffers in
/// [0, 1] of identical geometry — the beauty render plus the albedo and
/// normal guides that let the filter distinguish texture detail from noise.
pub struct FrameSet {
    pub width: u32,
    pub height: u32,
    pub color: Vec<f32>,
    pub albedo: Vec<f32>,
    pub normal: Vec<f32>,
}

impl FrameSet {
    pub fn new(color: &PixelBuffer, albedo: &PixelBuffer, normal: &PixelBuffer) -> Self {
        assert_eq!((color.width, color.height), (albedo.width, albedo.height));
        assert_eq!((color.width, color.height), (normal.width, normal.height));
        Self {
            width: color.width,
            height: color.height,
            color: color.to_float(),
            albedo: albedo.to_float(),
            normal: normal.to_float(),
        }
    }
}

/// Filters the beauty image through Open Image Denoise's generic ray-tracing
/// filter, guided by the auxiliary buffers. Errors (device or filter) are
/// returned to the caller, which falls back to the raw buffer.
#[cfg(feature = "denoise")]
pub fn denoise(frames: &FrameSet) -> Result<PixelBuffer> {
    let device = oidn::Device::new();
    let mut output = vec![0.0f32; frames.color.len()];

    oidn::RayTracing::new(&device)
        .srgb(true)
        .image_dimensions(frames.width as usize, frames.height as usize)
        .albedo_normal(&frames.albedo, &frames.normal)
        .clean_aux(false)
        .filter(&frames.color, &mut output)
        .map_err(|err| anyhow::anyhow!("denoise filter rejected the frame: {err:?}"))?;

    if let Err((_, message)) = device.get_error() {
        anyhow::bail!("denoiser reported: {message}");
    }

    Ok(PixelBuffer::from_float(frames.width, frames.height, &output))
}

#[cfg(not(feature = "denoise"))]
pub fn denoise(_frames: &FrameSet) -> Result<PixelBuffer> {
    anyhow::bail!("this build does not include the denoiser; rebuild with the `denoise` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_buffer(byte: u8) -> PixelBuffer {
        PixelBuffer {
            width: 2,
            height: 2,
            data: vec![byte; 12],
        }
    }

    #[test]
    fn frame_set_converts_all_three_planes() {
        let frames = FrameSet::new(&flat_buffer(255), &flat_buffer(51), &flat_buffer(0));
        assert_eq!(frames.width, 2);
        assert_eq!(frames.color.len(), 12);
        assert!(frames.color.iter().all(|&f| (f - 1.0).abs() < 1e-6));
        assert!(frames.albedo.iter().all(|&f| (f - 0.2).abs() < 1e-6));
        assert!(frames.normal.iter().all(|&f| f == 0.0));
    }

    #[cfg(not(feature = "denoise"))]
    #[test]
    fn denoise_reports_unavailability_without_the_feature() {
        let frames = FrameSet::new(&flat_buffer(10), &flat_buffer(20), &flat_buffer(30));
        assert!(denoise(&frames).is_err());
    }
}
