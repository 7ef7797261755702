//! Renderer configuration and draw technique selection.

/// Configuration for [`MsdfTextRenderer`](super::MsdfTextRenderer).
///
/// Controls the initial buffer sizes. Both buffers grow on demand, so these
/// only decide how early the first reallocation happens.
///
/// # Example
///
/// ```
/// use glint_msdf::TextRendererConfig;
///
/// let config = TextRendererConfig::large().with_style_prefix('^');
/// assert_eq!(config.style_prefix, '^');
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TextRendererConfig {
    /// Characters the vertex buffer holds before growing.
    /// Default: 64
    pub initial_capacity: u32,
    /// Instances the instance buffer holds before growing.
    /// Default: 16
    pub initial_instances: u32,
    /// Marker introducing a style word or tag.
    /// Default: `'|'`
    pub style_prefix: char,
    /// Apply kerning pairs from the atlas.
    /// Default: true
    pub kerning: bool,
}

impl Default for TextRendererConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            initial_instances: 16,
            style_prefix: '|',
            kerning: true,
        }
    }
}

impl TextRendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A few labels.
    pub fn small() -> Self {
        Self {
            initial_capacity: 16,
            initial_instances: 4,
            ..Default::default()
        }
    }

    /// Text-heavy scenes.
    pub fn large() -> Self {
        Self {
            initial_capacity: 4096,
            initial_instances: 256,
            ..Default::default()
        }
    }

    pub fn with_initial_capacity(mut self, characters: u32) -> Self {
        self.initial_capacity = characters;
        self
    }

    pub fn with_initial_instances(mut self, instances: u32) -> Self {
        self.initial_instances = instances;
        self
    }

    pub fn with_style_prefix(mut self, prefix: char) -> Self {
        self.style_prefix = prefix;
        self
    }

    pub fn with_kerning(mut self, enabled: bool) -> Self {
        self.kerning = enabled;
        self
    }
}

/// Fragment technique used for a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontDrawType {
    #[default]
    Standard,
    StandardWithStroke,
    /// Sharpened for text a few pixels tall.
    Tiny,
    TinyWithStroke,
    /// Per-channel coverage for LCD panels.
    SubPixel,
}

impl FontDrawType {
    /// Technique name understood by the device.
    pub const fn technique(self) -> &'static str {
        match self {
            Self::Standard => "msdf_standard",
            Self::StandardWithStroke => "msdf_standard_stroke",
            Self::Tiny => "msdf_tiny",
            Self::TinyWithStroke => "msdf_tiny_stroke",
            Self::SubPixel => "msdf_subpixel",
        }
    }
}
