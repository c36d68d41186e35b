use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use grada_core::frame::Frame;
use grada_core::pipeline::Pipeline;
use grada_core::session::GradingSnapshot;
use grada_gpu::context::GpuContext;
use grada_gpu::program::GradingProgram;
use grada_media::{
    AdapterConfig, FileImageDecoder, FrameSourceAdapter, GpuTextureFactory, ImageDecoder,
    LoadState, MediaSource, ProcessingSignal, UnsupportedVideo,
};
use tracing::{info, warn};

/// Grade one frame of `source`, on the GPU unless `cpu` is set or no
/// adapter is available.
pub async fn render(source: &MediaSource, snapshot: &GradingSnapshot, cpu: bool) -> Result<Frame> {
    if !cpu {
        match GpuContext::new().await {
            Ok(ctx) => return render_gpu(Arc::new(ctx), source, snapshot).await,
            Err(e) => warn!(error = %e, "GPU unavailable, grading on CPU"),
        }
    }
    render_cpu(source, snapshot).await
}

pub async fn render_gpu(
    ctx: Arc<GpuContext>,
    source: &MediaSource,
    snapshot: &GradingSnapshot,
) -> Result<Frame> {
    let mut adapter = FrameSourceAdapter::new(
        GpuTextureFactory::new(Arc::clone(&ctx)),
        FileImageDecoder,
        UnsupportedVideo,
        ProcessingSignal::new(),
        &AdapterConfig::default(),
    );

    if adapter.load(source.clone()).await != LoadState::Ready {
        let reason = match adapter.last_error() {
            Some(e) => anyhow!("{e}"),
            None => anyhow!("media did not load"),
        };
        return Err(reason.context(format!("load {}", source.uri())));
    }

    let mut program = GradingProgram::new(&ctx)?;
    let graded = program
        .render_if_ready(&ctx, adapter.texture(), snapshot)?
        .context("no source texture bound")?;
    let frame = graded.download(&ctx.device, &ctx.queue)?;
    graded.destroy();
    program.release_curves();

    info!(adapter = %ctx.adapter_name, "graded on GPU");
    Ok(frame)
}

pub async fn render_cpu(source: &MediaSource, snapshot: &GradingSnapshot) -> Result<Frame> {
    let MediaSource::Image(uri) = source else {
        anyhow::bail!("CPU grading needs a still image, got {}", source.uri());
    };
    let frame = FileImageDecoder
        .decode(uri.clone())
        .await
        .with_context(|| format!("load {uri}"))?;
    let graded = Pipeline::new().process_snapshot(frame, snapshot)?;
    info!("graded on CPU");
    Ok(graded)
}

pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    frame
        .to_rgba_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grada_core::catalog::Catalog;
    use grada_core::resolve::MediaKind;
    use grada_core::session::GradingSession;
    use image::{Rgba, RgbaImage};

    fn write_gray(path: &Path) {
        RgbaImage::from_pixel(4, 4, Rgba([128, 128, 128, 255]))
            .save(path)
            .unwrap();
    }

    #[tokio::test]
    async fn cpu_render_without_preset_is_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        write_gray(&input);

        let session = GradingSession::new(MediaKind::Image);
        let frame = render_cpu(&MediaSource::from_path(&input), &session.snapshot())
            .await
            .unwrap();
        assert_eq!(frame.to_rgba8()[..4], [128, 128, 128, 255]);
    }

    #[tokio::test]
    async fn cpu_render_mono_preset_stays_gray_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        write_gray(&input);

        let mut session = GradingSession::new(MediaKind::Image);
        let preset = Catalog::builtin().get("mono_classic").unwrap();
        session.select_preset(Arc::clone(preset));

        let frame = render_cpu(&MediaSource::from_path(&input), &session.snapshot())
            .await
            .unwrap();
        let [r, g, b, a] = frame.pixel(1, 1);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 1.0);

        let output = dir.path().join("out.png");
        save_png(&frame, &output).unwrap();
        let saved = image::open(&output).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn cli_overrides_without_preset_change_the_image() {
        use crate::cli::Args;
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        write_gray(&input);

        let args = Args::try_parse_from([
            "grada",
            input.to_str().unwrap(),
            "--brightness",
            "0.05",
            "--color-balance",
            "0.02,0,-0.02",
        ])
        .unwrap();
        let session = args
            .build_session(Catalog::builtin(), MediaKind::Image)
            .unwrap();
        let snapshot = session.snapshot();
        assert!(!snapshot.plan.is_passthrough());

        let frame = render_cpu(&MediaSource::from_path(&input), &snapshot)
            .await
            .unwrap();
        let [r, g, b, _] = frame.pixel(0, 0);
        assert!(g > 128.0 / 255.0);
        assert!(r > g);
        assert!(b < g);
    }

    #[tokio::test]
    async fn cpu_render_rejects_video() {
        let session = GradingSession::new(MediaKind::Video);
        let err = render_cpu(&MediaSource::video("clip.mp4"), &session.snapshot())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("still image"));
    }

    #[tokio::test]
    async fn cpu_render_reports_missing_file() {
        let session = GradingSession::new(MediaKind::Image);
        let err = render_cpu(&MediaSource::image("/no/such/file.png"), &session.snapshot())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/file.png"));
    }
}
