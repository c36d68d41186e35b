use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use tracing::debug;

use grada_core::params::{ColorSpace, InputRange};
use grada_core::resolve::{RenderPlan, ResolvedGradingState};
use grada_core::session::GradingSnapshot;

use crate::context::GpuContext;
use crate::curve_lut::CurveLutTexture;
use crate::shader::ShaderManager;
use crate::texture::{FRAME_FORMAT, GpuTexture};

const SHADER: &str = "grade";

/// Uniform block of the grading shader. Four vec4s, see `grade.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GradingUniforms {
    pub adjust: [f32; 4],
    pub balance: [f32; 4],
    pub tone: [f32; 4],
    pub flags: [f32; 4],
}

impl GradingUniforms {
    pub fn new(state: &ResolvedGradingState, has_curve: bool) -> Self {
        let color_space = match state.color_space {
            ColorSpace::Srgb => 0.0,
            ColorSpace::Rec709 => 1.0,
            ColorSpace::Linear => 2.0,
        };
        let input_range = match state.input_range {
            InputRange::Full => 0.0,
            InputRange::Limited => 1.0,
        };
        let [r, g, b] = state.color_balance;
        Self {
            adjust: [state.brightness, state.contrast, state.saturation, state.gamma],
            balance: [r, g, b, state.hue_radians()],
            tone: [state.shadows, state.highlights, state.temperature, state.blur],
            flags: [
                state.unsharp_amount,
                if has_curve { 1.0 } else { 0.0 },
                color_space,
                input_range,
            ],
        }
    }
}

/// GPU grading program: one fullscreen pass per rendered frame.
///
/// Owns the curve LUT texture. A new table is uploaded only when the
/// snapshot's curve revision changes; the old one is destroyed after the
/// new one is in place, and dropped entirely when curves go inactive.
pub struct GradingProgram {
    shaders: ShaderManager,
    bind_group_layout: wgpu::BindGroupLayout,
    curve_sampler: wgpu::Sampler,
    params_buf: wgpu::Buffer,
    /// Bound in place of the LUT when no curve is active.
    empty_lut: GpuTexture,
    curve: Option<CurveLutTexture>,
}

impl GradingProgram {
    pub fn new(ctx: &GpuContext) -> Result<Self> {
        let mut shaders = ShaderManager::new();
        shaders.load_shader(&ctx.device, SHADER, include_str!("../shaders/grade.wgsl"));

        let bind_group_layout = Self::create_layout(&ctx.device);

        let curve_sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("curve_lut_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let params_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grading_params"),
            size: std::mem::size_of::<GradingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let empty_lut =
            GpuTexture::from_rgba8(&ctx.device, &ctx.queue, 1, 1, &[0, 0, 0, 255], "empty_lut")?;

        Ok(Self {
            shaders,
            bind_group_layout,
            curve_sampler,
            params_buf,
            empty_lut,
            curve: None,
        })
    }

    fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grading_bgl"),
            entries: &[
                // Source frame
                texture_entry(0),
                // Curve LUT
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    /// Revision of the resident curve table, if any.
    pub fn curve_revision(&self) -> Option<u64> {
        self.curve.as_ref().map(CurveLutTexture::revision)
    }

    /// Bring the resident curve table in line with the snapshot.
    pub fn sync_curves(&mut self, ctx: &GpuContext, snapshot: &GradingSnapshot) -> Result<()> {
        match &snapshot.curves {
            None => {
                if let Some(old) = self.curve.take() {
                    old.destroy();
                }
            }
            Some(lut) if self.curve_revision() != Some(snapshot.curve_revision) => {
                let fresh = CurveLutTexture::upload(ctx, lut, snapshot.curve_revision)?;
                if let Some(old) = self.curve.replace(fresh) {
                    old.destroy();
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Render `source` through the snapshot's plan into a new texture of the same size.
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        source: &GpuTexture,
        snapshot: &GradingSnapshot,
    ) -> Result<GpuTexture> {
        self.sync_curves(ctx, snapshot)?;

        let (entry, uniforms) = match &snapshot.plan {
            RenderPlan::Passthrough => ("fs_passthrough", None),
            RenderPlan::Graded(state) => (
                "fs_main",
                Some(GradingUniforms::new(state, self.curve.is_some())),
            ),
        };
        debug!(
            entry,
            revision = snapshot.revision,
            width = source.width,
            height = source.height,
            "GPU grade"
        );

        if let Some(uniforms) = uniforms {
            ctx.queue
                .write_buffer(&self.params_buf, 0, bytemuck::bytes_of(&uniforms));
        }

        let output = GpuTexture::create_target(&ctx.device, source.width, source.height, "grade_out");

        let lut_view = match &self.curve {
            Some(curve) => curve.view(),
            None => &self.empty_lut.view,
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grading_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(lut_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.curve_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.params_buf.as_entire_binding(),
                },
            ],
        });

        let pipeline = self.shaders.get_or_create_pipeline(
            &ctx.device,
            SHADER,
            entry,
            &self.bind_group_layout,
            FRAME_FORMAT,
        )?;

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("grading_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("grading_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));

        Ok(output)
    }

    /// Render only when a source texture is bound. Without one the program
    /// does not run and the caller keeps showing its placeholder.
    pub fn render_if_ready(
        &mut self,
        ctx: &GpuContext,
        source: Option<&GpuTexture>,
        snapshot: &GradingSnapshot,
    ) -> Result<Option<GpuTexture>> {
        match source {
            Some(source) => self.render(ctx, source, snapshot).map(Some),
            None => {
                debug!("no source texture bound, skipping grade");
                Ok(None)
            }
        }
    }

    /// Release the curve table now. Later renders re-upload as needed.
    pub fn release_curves(&mut self) {
        if let Some(old) = self.curve.take() {
            old.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_four_vec4s() {
        assert_eq!(std::mem::size_of::<GradingUniforms>(), 64);
    }

    #[test]
    fn identity_state_packs_identity_values() {
        let state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Full);
        let u = GradingUniforms::new(&state, false);
        assert_eq!(u.adjust, [0.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.balance, [0.0; 4]);
        assert_eq!(u.tone, [0.0; 4]);
        assert_eq!(u.flags, [0.0; 4]);
    }

    #[test]
    fn flags_encode_color_space_range_and_curve() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Rec709, InputRange::Limited);
        state.unsharp_amount = 1.2;
        let u = GradingUniforms::new(&state, true);
        assert_eq!(u.flags, [1.2, 1.0, 1.0, 1.0]);

        state.color_space = ColorSpace::Linear;
        assert_eq!(GradingUniforms::new(&state, false).flags[2], 2.0);
    }

    #[test]
    fn hue_is_packed_in_radians() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Full);
        state.hue_degrees = 90.0;
        state.color_balance = [0.1, 0.2, 0.3];
        let u = GradingUniforms::new(&state, false);
        assert_eq!(&u.balance[..3], &[0.1, 0.2, 0.3]);
        assert!((u.balance[3] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn tone_fields_in_order() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Full);
        state.shadows = -0.3;
        state.highlights = 0.4;
        state.temperature = 25.0;
        state.blur = 2.0;
        state.brightness = 0.05;
        state.gamma = 1.1;
        let u = GradingUniforms::new(&state, false);
        assert_eq!(u.tone, [-0.3, 0.4, 25.0, 2.0]);
        assert_eq!(u.adjust[0], 0.05);
        assert_eq!(u.adjust[3], 1.1);
    }

    fn validate_wgsl(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("grade.wgsl parse failed: {}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("grade.wgsl validation failed: {}", e.emit_to_string(source)));
        module
    }

    #[test]
    fn grade_shader_validates_with_expected_entries() {
        let module = validate_wgsl(include_str!("../shaders/grade.wgsl"));
        let mut entries: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        entries.sort_unstable();
        assert_eq!(entries, ["fs_main", "fs_passthrough", "vs_main"]);
    }

    mod gpu {
        use std::sync::Arc;

        use grada_core::catalog::Catalog;
        use grada_core::frame::Frame;
        use grada_core::pipeline::Pipeline;
        use grada_core::resolve::MediaKind;
        use grada_core::session::GradingSession;

        use super::super::*;

        /// Max per-byte difference tolerated between GPU and CPU output.
        /// The LUT is filtered by the sampler on the GPU.
        const TOLERANCE: u8 = 2;

        async fn context() -> Option<GpuContext> {
            match GpuContext::new().await {
                Ok(ctx) => Some(ctx),
                Err(e) => {
                    eprintln!("skipping GPU test: {e:#}");
                    None
                }
            }
        }

        fn color_ramp() -> Frame {
            let (width, height) = (16u32, 8u32);
            let mut bytes = Vec::with_capacity((width * height * 4) as usize);
            for y in 0..height {
                for x in 0..width {
                    bytes.extend_from_slice(&[
                        (x * 255 / (width - 1)) as u8,
                        (y * 255 / (height - 1)) as u8,
                        ((x + y) * 255 / (width + height - 2)) as u8,
                        255,
                    ]);
                }
            }
            Frame::from_rgba8(width, height, &bytes).unwrap()
        }

        fn session_for(key: &str) -> GradingSession {
            let mut session = GradingSession::new(MediaKind::Image);
            session.select_preset(Arc::clone(Catalog::builtin().get(key).unwrap()));
            session
        }

        async fn assert_matches_cpu(session: &GradingSession) {
            let Some(ctx) = context().await else { return };
            let snapshot = session.snapshot();
            let input = color_ramp();

            let mut program = GradingProgram::new(&ctx).unwrap();
            let source = GpuTexture::from_frame(&ctx.device, &ctx.queue, &input, "test_src").unwrap();
            let graded = program.render(&ctx, &source, &snapshot).unwrap();
            let gpu = graded.download(&ctx.device, &ctx.queue).unwrap().to_rgba8();

            let cpu = Pipeline::new()
                .process_snapshot(input, &snapshot)
                .unwrap()
                .to_rgba8();

            assert_eq!(gpu.len(), cpu.len());
            for (i, (g, c)) in gpu.iter().zip(&cpu).enumerate() {
                assert!(
                    g.abs_diff(*c) <= TOLERANCE,
                    "byte {i} (pixel {}, channel {}): gpu {g} cpu {c}",
                    i / 4,
                    i % 4
                );
            }
        }

        #[tokio::test]
        async fn identity_preset_matches_cpu() {
            assert_matches_cpu(&session_for("none")).await;
        }

        #[tokio::test]
        async fn mono_classic_matches_cpu() {
            assert_matches_cpu(&session_for("mono_classic")).await;
        }

        #[tokio::test]
        async fn passthrough_matches_cpu() {
            assert_matches_cpu(&GradingSession::new(MediaKind::Image)).await;
        }

        #[tokio::test]
        async fn curve_table_released_when_curves_go_inactive() {
            let Some(ctx) = context().await else { return };
            let mut program = GradingProgram::new(&ctx).unwrap();
            let source =
                GpuTexture::from_frame(&ctx.device, &ctx.queue, &color_ramp(), "test_src").unwrap();

            let mut session = session_for("mono_classic");
            program.render(&ctx, &source, &session.snapshot()).unwrap();
            assert!(program.curve_revision().is_some());

            session.select_preset(Arc::clone(Catalog::builtin().get("none").unwrap()));
            program.render(&ctx, &source, &session.snapshot()).unwrap();
            assert!(program.curve_revision().is_none());
        }
    }
}
