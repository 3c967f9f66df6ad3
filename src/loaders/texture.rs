use std::path::Path;

use super::error::LoadError;

/// Decoded RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }

    /// Single opaque pixel, used where a material has no image
    pub fn solid(color: [u8; 4]) -> Self {
        Self::new(1, 1, color.to_vec())
    }

    pub fn has_transparency(&self) -> bool {
        self.rgba.chunks_exact(4).any(|px| px[3] < 255)
    }
}

/// Load a PNG or JPEG file and convert it to RGBA8
pub fn load_texture(path: &Path) -> Result<TextureData, LoadError> {
    let img = image::open(path).map_err(|e| LoadError::ImageDecode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    log::debug!(
        "Decoded {}: {}x{} RGBA8 ({:.1} KB)",
        path.display(),
        width,
        height,
        (width * height * 4) as f64 / 1024.0
    );

    Ok(TextureData::new(width, height, rgba.into_raw()))
}

/// Convert glTF embedded image data to RGBA8, `None` for formats we cannot sample
pub fn from_gltf_image(image: &gltf::image::Data) -> Option<TextureData> {
    use gltf::image::Format;

    let rgba = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        other => {
            log::warn!("Unsupported glTF image format {:?}, using white", other);
            return None;
        }
    };

    Some(TextureData::new(image.width, image.height, rgba))
}
