//! Material texture kinds, decoding and the per-model texture cache

use std::{collections::HashMap, fmt, path::Path};

use image::RgbaImage;

use crate::{
    error::{report, Result, ViewerError},
    gfx::resources::TextureResource,
};

/// Role of a texture within a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    /// Order in which a mesh collects its textures
    pub const ALL: [TextureKind; 4] = [
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Normal,
        TextureKind::Height,
    ];

    /// Prefix of the shader slot name, e.g. `texture_diffuse` for
    /// `texture_diffuse1`.
    pub fn slot_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
            TextureKind::Height => "texture_height",
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_prefix())
    }
}

/// Key of an image stored inside the asset itself
pub fn embedded_key(index: usize) -> String {
    format!("*{}", index)
}

pub fn is_embedded_key(path: &str) -> bool {
    path.starts_with('*')
}

/// Decodes the image a material refers to
///
/// Embedded keys are looked up in `embedded`, anything else is read from disk
/// relative to `directory`.
pub fn decode_texture(
    path: &str,
    directory: &Path,
    embedded: &HashMap<String, RgbaImage>,
) -> Result<RgbaImage> {
    let full_path = directory.join(path);

    if let Some(image) = embedded.get(path) {
        if image.width() == 0 || image.height() == 0 {
            return Err(ViewerError::Io {
                path: full_path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "embedded texture has no pixels",
                ),
            });
        }
        return Ok(image.clone());
    }

    if is_embedded_key(path) {
        return Err(ViewerError::Io {
            path: full_path,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "embedded texture is missing from the asset",
            ),
        });
    }

    let image = image::open(&full_path).map_err(|source| ViewerError::Image {
        path: full_path,
        source,
    })?;
    Ok(image.to_rgba8())
}

/// GPU textures of one model, shared by path
///
/// Several meshes referencing the same file get the same GPU texture. Files
/// that fail to load are logged once and replaced by the white placeholder.
pub struct TextureCache {
    textures: HashMap<String, TextureResource>,
    white: TextureResource,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            textures: HashMap::new(),
            white: TextureResource::white(device, queue),
        }
    }

    pub fn white(&self) -> &TextureResource {
        &self.white
    }

    pub fn get(&self, path: &str) -> Option<&TextureResource> {
        self.textures.get(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns the texture for `path`, decoding and uploading it on first use
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
        directory: &Path,
        embedded: &HashMap<String, RgbaImage>,
    ) -> TextureResource {
        if let Some(texture) = self.textures.get(path) {
            log::debug!("Reusing texture {}", path);
            return texture.clone();
        }

        let texture = match decode_texture(path, directory, embedded) {
            Ok(image) => {
                log::debug!(
                    "Loaded texture {} ({}x{})",
                    path,
                    image.width(),
                    image.height()
                );
                TextureResource::from_image(device, queue, &image, path)
            }
            Err(err) => {
                log::warn!("Texture failed to load at path: {path}: {}", report(&err));
                self.white.clone()
            }
        };

        self.textures.insert(path.to_string(), texture.clone());
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_prefixes_follow_kind_order() {
        let prefixes: Vec<_> = TextureKind::ALL.iter().map(|k| k.slot_prefix()).collect();
        assert_eq!(
            prefixes,
            vec![
                "texture_diffuse",
                "texture_specular",
                "texture_normal",
                "texture_height"
            ]
        );
    }

    #[test]
    fn embedded_keys_start_with_star() {
        assert_eq!(embedded_key(3), "*3");
        assert!(is_embedded_key("*3"));
        assert!(!is_embedded_key("textures/wood.png"));
    }

    #[test]
    fn embedded_images_are_preferred() {
        let mut embedded = HashMap::new();
        embedded.insert(
            embedded_key(0),
            RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])),
        );
        let image = decode_texture("*0", Path::new("."), &embedded).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
    }

    #[test]
    fn missing_embedded_image_is_an_error() {
        let err = decode_texture("*7", Path::new("."), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }

    #[test]
    fn empty_embedded_image_is_an_error() {
        let mut embedded = HashMap::new();
        embedded.insert(embedded_key(1), RgbaImage::new(0, 0));
        let err = decode_texture("*1", Path::new("."), &embedded).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }

    #[test]
    fn files_are_resolved_against_the_directory() {
        let directory = std::env::temp_dir().join("model-viewer-texture-test");
        std::fs::create_dir_all(&directory).unwrap();
        RgbaImage::from_pixel(4, 2, image::Rgba([200, 100, 50, 255]))
            .save(directory.join("checker.png"))
            .unwrap();

        let image = decode_texture("checker.png", &directory, &HashMap::new()).unwrap();
        std::fs::remove_dir_all(&directory).ok();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1), &image::Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn unreadable_file_is_an_image_error() {
        let err = decode_texture("nope.png", Path::new("/definitely/missing"), &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, ViewerError::Image { .. }));
    }
}
