use std::fmt;
use std::sync::Arc;

use glint_core::profiling::profile_function;

/// Errors raised while bringing up a [`GraphicsContext`].
#[derive(Debug)]
pub enum GraphicsError {
    /// No adapter matched the requested options.
    NoAdapter(String),
    /// The adapter refused to create a device.
    DeviceCreation(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::NoAdapter(msg) => {
                write!(f, "Failed to find a suitable GPU adapter: {}", msg)
            }
            GraphicsError::DeviceCreation(msg) => write!(f, "Failed to create device: {}", msg),
        }
    }
}

impl std::error::Error for GraphicsError {}

pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// Adapter and device selection for a [`GraphicsContext`].
#[derive(Debug, Clone)]
pub struct GraphicsContextDescriptor {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Force a software adapter (useful for CI).
    pub force_fallback_adapter: bool,
    pub limits: wgpu::Limits,
    pub label: Option<&'static str>,
}

impl Default for GraphicsContextDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            limits: wgpu::Limits::default(),
            label: None,
        }
    }
}

impl GraphicsContextDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn force_fallback_adapter(mut self, force: bool) -> Self {
        self.force_fallback_adapter = force;
        self
    }

    pub fn limits(mut self, limits: wgpu::Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

/// A shared graphics context.
///
/// Created behind an `Arc` so the text device and the application can both
/// hold it:
///
/// ```rust,no_run
/// use glint_render::GraphicsContext;
///
/// let ctx = GraphicsContext::new_owned_sync().expect("gpu");
/// let ctx2 = ctx.clone();
/// ```
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GraphicsContext {
    /// Creates a new graphics context with the default descriptor.
    pub async fn new_owned() -> GraphicsResult<Arc<Self>> {
        Self::new_owned_with_descriptor(GraphicsContextDescriptor::default()).await
    }

    /// Blocking version of [`GraphicsContext::new_owned`].
    pub fn new_owned_sync() -> GraphicsResult<Arc<Self>> {
        pollster::block_on(Self::new_owned())
    }

    /// Blocking version of [`GraphicsContext::new_owned_with_descriptor`].
    pub fn new_owned_sync_with_descriptor(
        descriptor: GraphicsContextDescriptor,
    ) -> GraphicsResult<Arc<Self>> {
        pollster::block_on(Self::new_owned_with_descriptor(descriptor))
    }

    pub async fn new_owned_with_descriptor(
        descriptor: GraphicsContextDescriptor,
    ) -> GraphicsResult<Arc<Self>> {
        profile_function!();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await
            .map_err(|e| GraphicsError::NoAdapter(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: descriptor.limits.clone(),
                label: descriptor.label,
                ..Default::default()
            })
            .await
            .map_err(|e| GraphicsError::DeviceCreation(e.to_string()))?;

        tracing::info!("Created graphics context on {}", adapter.get_info().name);

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }

    /// Get device info
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Get device limits
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Get the maximum buffer size in bytes.
    #[inline]
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    /// Get the maximum 2D texture dimension.
    #[inline]
    pub fn max_texture_dimension_2d(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let desc = GraphicsContextDescriptor::new()
            .backends(wgpu::Backends::VULKAN)
            .force_fallback_adapter(true)
            .label("glint");
        assert_eq!(desc.backends, wgpu::Backends::VULKAN);
        assert!(desc.force_fallback_adapter);
        assert_eq!(desc.label, Some("glint"));
    }

    #[test]
    fn test_error_display() {
        let err = GraphicsError::NoAdapter("none".to_string());
        assert!(err.to_string().contains("adapter"));
    }
}
