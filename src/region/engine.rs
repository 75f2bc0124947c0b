use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::RegionConfig,
    error::{RegionError, Result},
    video::types::Frame,
};

use super::{
    direction::{BelowRule, Direction},
    rect::{Point, Rect},
    traits::FrameRepair,
};

/// Where source pixels are read from during a repair pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Read from the frame being written, so values repaired earlier in the
    /// pass feed later pixels
    #[default]
    Cascade,
    /// Read every source pixel from an untouched copy of the input frame
    Snapshot,
}

/// One precomputed copy: write `target` with the value at `source`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyStep {
    pub target: Point,
    pub source: Point,
    pub direction: Direction,
}

/// Repairs a fixed defective rectangle by directional copying
///
/// The rectangle never moves, so the classification of every interior pixel
/// is computed once at construction. A repair pass replays those steps in
/// column-major order.
#[derive(Debug, Clone)]
pub struct RepairEngine {
    rect: Rect,
    reference: Point,
    read_mode: ReadMode,
    below_rule: BelowRule,
    steps: Vec<CopyStep>,
}

impl RepairEngine {
    pub fn new(rect: Rect, below_rule: BelowRule, read_mode: ReadMode) -> Result<Self> {
        if !rect.is_empty() && (rect.x0 == 0 || rect.y0 == 0) {
            return Err(RegionError::TouchesOrigin { x0: rect.x0, y0: rect.y0 }.into());
        }

        let reference = rect.reference();
        let steps: Vec<CopyStep> = rect
            .interior_column_major()
            .filter_map(|target| {
                Direction::classify(target, reference, below_rule).map(|direction| CopyStep {
                    target,
                    source: direction.source(target, &rect),
                    direction,
                })
            })
            .collect();

        let skipped = (rect.width() as usize * rect.height() as usize) - steps.len();
        debug!(
            "Repair plan for ({}, {})-({}, {}): reference ({}, {}), {} steps, {} pixels left as-is",
            rect.x0, rect.y0, rect.x1, rect.y1, reference.x, reference.y, steps.len(), skipped
        );

        Ok(Self {
            rect,
            reference,
            read_mode,
            below_rule,
            steps,
        })
    }

    pub fn from_config(config: &RegionConfig) -> Result<Self> {
        let rect = Rect::new(config.from, config.to)?;
        Self::new(rect, config.below_rule, config.read_mode)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn reference(&self) -> Point {
        self.reference
    }

    pub fn read_mode(&self) -> ReadMode {
        self.read_mode
    }

    pub fn below_rule(&self) -> BelowRule {
        self.below_rule
    }

    /// The copy steps in the order they are applied
    pub fn steps(&self) -> &[CopyStep] {
        &self.steps
    }

    /// Repair `frame` in place
    pub fn repair_frame(&self, frame: &mut Frame) -> Result<usize> {
        self.rect.check_fits(frame.width(), frame.height())?;

        match self.read_mode {
            ReadMode::Cascade => {
                for step in &self.steps {
                    frame.copy_pixel((step.source.x, step.source.y), (step.target.x, step.target.y));
                }
            }
            ReadMode::Snapshot => {
                let original = frame.clone();
                for step in &self.steps {
                    let value = original.get_pixel(step.source.x, step.source.y);
                    frame.set_pixel(step.target.x, step.target.y, value);
                }
            }
        }

        Ok(self.steps.len())
    }
}

impl FrameRepair for RepairEngine {
    fn name(&self) -> &str {
        "directional"
    }

    fn repair(&self, frame: &mut Frame) -> Result<usize> {
        self.repair_frame(frame)
    }
}
