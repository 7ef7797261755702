//! GPU plumbing for glint: the shared graphics context, colors, MSDF vertex
//! layouts and the wgpu device that draws text.

mod color;
mod context;
mod msdf_device;
mod vertex;

pub use color::Color;
pub use context::{GraphicsContext, GraphicsContextDescriptor, GraphicsError, GraphicsResult};
pub use msdf_device::{MsdfDevice, TECHNIQUES};
pub use vertex::{MsdfVertex, TextInstance};

pub use glint_test_utils::{GpuBuffer, GpuTexture, InstancedDraw, RenderContext};

pub use wgpu;
