use std::sync::Arc;

use anyhow::Context as _;
use log::info;
use winit::window::Window;

/// GPU context wrapper:
/// - Owns `wgpu::Instance`, `wgpu::Adapter`, `wgpu::Device`, `wgpu::Queue`
/// - Owns the window `Surface` and the current `SurfaceConfiguration`
pub struct Gpu {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    /// The surface is tied to the window.
    pub surface: wgpu::Surface<'static>,
    pub surface_format: wgpu::TextureFormat,

    pub size: winit::dpi::PhysicalSize<u32>,
    pub config: wgpu::SurfaceConfiguration,
    present_mode: wgpu::PresentMode,
}

impl Gpu {
    /// Create a GPU context for the given window.
    ///
    /// Notes:
    /// - The adapter must be able to present to the window's surface.
    /// - Chooses the first surface format from surface capabilities.
    pub async fn new(window: Arc<Window>, present_mode: wgpu::PresentMode) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let size = window.inner_size();

        // The surface holds an `Arc<Window>`, so it cannot outlive the window.
        let surface = instance
            .create_surface(window)
            .context("wgpu: failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("wgpu: failed to request adapter")?;

        let info = adapter.get_info();
        info!("wgpu: using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("trance device"),
                ..Default::default()
            })
            .await
            .context("wgpu: failed to request device")?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .first()
            .copied()
            .context("wgpu: surface reported no supported formats")?;

        let config = Self::make_surface_config(size, surface_format, present_mode);
        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_format,
            size,
            config,
            present_mode,
        })
    }

    /// The format render pipelines should target (SRGB view of the surface).
    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.surface_format.add_srgb_suffix()
    }

    /// True when the surface has a drawable (non-zero) size.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.config.width > 0 && self.config.height > 0
    }

    /// Reconfigure the surface for a new size. Call on `WindowEvent::Resized`.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.size = new_size;

        // Minimized windows report 0; keep the old surface and skip frames until restored.
        if new_size.width == 0 || new_size.height == 0 {
            self.config.width = 0;
            self.config.height = 0;
            return;
        }

        self.config = Self::make_surface_config(new_size, self.surface_format, self.present_mode);
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the next frame and an SRGB view of it.
    ///
    /// `wgpu::SurfaceError` is returned as-is so the caller can decide to reconfigure,
    /// skip the frame, or give up.
    pub fn acquire_frame(
        &self,
    ) -> Result<(wgpu::SurfaceTexture, wgpu::TextureView), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.target_format()),
                ..Default::default()
            });

        Ok((surface_texture, view))
    }

    fn make_surface_config(
        size: winit::dpi::PhysicalSize<u32>,
        surface_format: wgpu::TextureFormat,
        present_mode: wgpu::PresentMode,
    ) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            view_formats: vec![surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: size.width,
            height: size.height,
            desired_maximum_frame_latency: 2,
            present_mode,
        }
    }
}
