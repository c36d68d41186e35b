use anyhow::Result;

use crate::curve::CurveLut;
use crate::frame::Frame;
use crate::resolve::ResolvedGradingState;

/// Everything a stage may read besides the working frame.
pub struct StageContext<'a> {
    pub state: &'a ResolvedGradingState,
    pub curves: Option<&'a CurveLut>,
    /// The unmodified source frame, in its stored encoding.
    pub source: &'a Frame,
    /// 3x3 box blur of `source`, present when a detail stage needs it.
    pub source_blurred: Option<&'a Frame>,
}

/// A single step in the grading program.
pub trait GradingStage: Send + Sync {
    fn name(&self) -> &str;
    fn process_cpu(&self, working: Frame, ctx: &StageContext) -> Result<Frame>;
}

/// Apply `f` to the RGB of every pixel, leaving alpha alone.
pub(crate) fn map_rgb(frame: &mut Frame, f: impl Fn([f32; 3]) -> [f32; 3]) {
    for px in frame.data.chunks_exact_mut(4) {
        let [r, g, b] = f([px[0], px[1], px[2]]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}
