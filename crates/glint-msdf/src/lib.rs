//! Glint MSDF - styled, batched text on multi-channel signed distance fields
//!
//! This crate turns strings into GPU geometry sampled from a pregenerated
//! MSDF font atlas:
//! - Inline styling through registered words (`|Excalibur`) and tags (`|<glowing>`)
//! - A single shared vertex/index pool carved up by a free-list allocator
//! - Persistent geometry handles that can be replaced in place
//! - Instanced drawing: every placement of every text in one draw per frame
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use glint_core::math::{Mat4, Vec2};
//! use glint_msdf::{FontDrawType, GlyphAtlas, MsdfTextRenderer, TextRendererConfig};
//! use glint_render::{Color, GraphicsContext, MsdfDevice, wgpu};
//!
//! let graphics = GraphicsContext::new_owned_sync().unwrap();
//! let device = Arc::new(MsdfDevice::new(graphics, wgpu::TextureFormat::Bgra8UnormSrgb));
//!
//! let metadata = std::fs::read("font.json").unwrap();
//! let pixels = std::fs::read("font.rgba").unwrap();
//! let atlas = GlyphAtlas::from_json_slice(&metadata).unwrap();
//! let texture = device.create_atlas_texture(atlas.atlas.width, atlas.atlas.height, &pixels);
//!
//! let mut renderer = MsdfTextRenderer::new(device.clone(), TextRendererConfig::default());
//! renderer.load_atlas(atlas, texture).unwrap();
//!
//! let label = renderer
//!     .generate_geometry("Hello, World!", Color::WHITE, Color::BLACK)
//!     .unwrap();
//! renderer
//!     .add_text_instance(Vec2::new(100.0, 100.0), 32.0, label.range())
//!     .unwrap();
//!
//! let projection = Mat4::orthographic_rh(0.0, 1280.0, 720.0, 0.0, -1.0, 1.0);
//! renderer.render_instances(Mat4::IDENTITY, projection, FontDrawType::Standard);
//! // device.encode(&mut render_pass);
//! ```
//!
//! ## Modules
//!
//! - [`style`]: trie matcher, word matcher, tag parser and the stylizer
//! - [`atlas`]: atlas metadata and the runtime glyph table
//! - [`preprocess`]: marker stripping and style span resolution
//! - [`buffer`]: the free-list vertex/index pool
//! - [`geometry`]: quad generation into a reserved range
//! - [`renderer`]: the orchestrating [`MsdfTextRenderer`]

pub mod atlas;
pub mod buffer;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod preprocess;
pub mod renderer;
pub mod style;

pub use atlas::{AtlasLayout, Bounds, FontAtlas, FontMetrics, Glyph, GlyphAtlas, GlyphMetrics, Kerning, YOrigin};
pub use buffer::{BufferRange, FreeList, GrowthEvent, TextBufferPool};
pub use error::{AtlasError, AtlasResult, StyleError, StyleResult};
pub use geometry::generate_geometry;
pub use layout::{GlyphQuad, LayoutContext, LayoutExtent, TextLayout};
pub use preprocess::{DrawGlyph, ProcessedText, TextPreprocessor};
pub use renderer::{FontDrawType, MsdfTextRenderer, TextBounds, TextGeometryHandle, TextRendererConfig};
pub use style::{GlyphStyle, StyleId, StyleRule, TagDefinition, TextStyle, TextStylizer};
