//! Graphics-device boundary for Glint.
//!
//! The text core never talks to wgpu directly. It creates and writes buffers
//! and issues one instanced draw per frame through the [`RenderContext`]
//! trait, which has a real implementation in `glint-render` and a recording
//! mock here.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use glint_test_utils::{MockRenderContext, RenderContext};
//! use wgpu::*;
//!
//! let mock = MockRenderContext::new();
//!
//! let buffer = mock.create_buffer(&BufferDescriptor {
//!     label: Some("text_vertices"),
//!     size: 1024,
//!     usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
//!     mapped_at_creation: false,
//! });
//! mock.write_buffer(&buffer, 0, &[1, 2, 3, 4]);
//!
//! assert_eq!(mock.count_buffer_creates(), 1);
//! assert_eq!(&mock.buffer_contents(&buffer).unwrap()[..4], &[1, 2, 3, 4]);
//! # }
//! ```
//!
//! # Design
//!
//! - Wrapper types are owned and cheap to clone, so no lifetimes leak into
//!   the renderer.
//! - The trait is object-safe; the renderer stores `Arc<dyn RenderContext>`.
//! - The mock records calls behind `parking_lot::Mutex` so `&self` methods
//!   can mutate.

pub mod gpu_types;
#[cfg(feature = "mock")]
pub mod mock_render;
pub mod render_context;

pub use gpu_types::*;
#[cfg(feature = "mock")]
pub use mock_render::*;
pub use render_context::*;
