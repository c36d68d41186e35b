use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::debug;

/// Manages shader modules and render pipeline caching.
///
/// Pipelines are keyed by shader name and fragment entry point, so one
/// module can back several pipelines.
pub struct ShaderManager {
    modules: HashMap<String, wgpu::ShaderModule>,
    pipelines: HashMap<String, wgpu::RenderPipeline>,
}

impl ShaderManager {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    pub fn load_shader(&mut self, device: &wgpu::Device, name: &str, source: &str) {
        debug!(name, "loading shader");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.insert(name.to_string(), module);
    }

    /// Fullscreen-triangle pipeline using `vs_main` and the given fragment entry.
    pub fn get_or_create_pipeline(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        fragment_entry: &str,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> Result<&wgpu::RenderPipeline> {
        let key = format!("{name}:{fragment_entry}");
        if !self.pipelines.contains_key(&key) {
            let module = self
                .modules
                .get(name)
                .with_context(|| format!("shader not loaded: {name}"))?;

            debug!(name, fragment_entry, "creating render pipeline");
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{key}_layout")),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&key),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some(fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            });

            self.pipelines.insert(key.clone(), pipeline);
        }

        self.pipelines
            .get(&key)
            .with_context(|| format!("pipeline missing after creation: {key}"))
    }
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}
