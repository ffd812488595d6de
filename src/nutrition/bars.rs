//! Progress bars

/// Widths, in percent of the track, of a logged + planned stacked bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedBar {
    pub logged: f64,
    pub planned: f64,
    pub target: f64,
    /// Width of the logged segment, 0-100
    pub logged_width: f64,
    /// Width of the planned segment stacked after the logged one
    pub planned_width: f64,
    /// Logged plus planned exceeds the target
    pub over_target: bool,
}

impl StackedBar {
    /// Stack `planned` after `logged` against `target`
    ///
    /// Both segments together never exceed the track. A non-positive
    /// target gives empty segments.
    pub fn new(logged: f64, planned: f64, target: f64) -> Self {
        let logged = logged.max(0.0);
        let planned = planned.max(0.0);

        if target <= 0.0 {
            return Self {
                logged,
                planned,
                target,
                logged_width: 0.0,
                planned_width: 0.0,
                over_target: false,
            };
        }

        let logged_width = (logged / target).min(1.0) * 100.0;
        let combined_width = ((logged + planned) / target).min(1.0) * 100.0;

        Self {
            logged,
            planned,
            target,
            logged_width,
            planned_width: combined_width - logged_width,
            over_target: logged + planned > target,
        }
    }

    /// Amount still missing after logged and planned, never negative
    pub fn remaining(&self) -> f64 {
        (self.target - self.logged - self.planned).max(0.0)
    }

    /// Text bar such as `[#####+++.......]`
    pub fn render(&self, width: usize) -> String {
        let logged_cells = cells(self.logged_width, width);
        let planned_cells = cells(self.logged_width + self.planned_width, width) - logged_cells;
        let empty_cells = width - logged_cells - planned_cells;
        format!(
            "[{}{}{}]",
            "#".repeat(logged_cells),
            "+".repeat(planned_cells),
            ".".repeat(empty_cells)
        )
    }
}

fn cells(percent: f64, width: usize) -> usize {
    let n = (percent.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    n.min(width)
}

/// Hydration as shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrationDisplay {
    pub water_ml: f64,
    pub target_ml: f64,
    /// water / target, unclamped
    pub ratio: f64,
    /// Bar width, 0-100
    pub width: f64,
    pub score_adjustment: Option<f64>,
}

impl HydrationDisplay {
    /// `None` when the server sent no usable target
    pub fn new(water_ml: f64, target_ml: f64, score_adjustment: Option<f64>) -> Option<Self> {
        if target_ml <= 0.0 {
            return None;
        }
        let ratio = water_ml.max(0.0) / target_ml;
        Some(Self {
            water_ml,
            target_ml,
            ratio,
            width: (ratio * 100.0).min(100.0),
            score_adjustment,
        })
    }

    pub fn percent(&self) -> f64 {
        self.ratio * 100.0
    }
}

/// Server-provided nutrition score as a bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDisplay {
    /// 0-10
    pub score: f64,
    /// Bar width, 0-100
    pub width: f64,
}

impl ScoreDisplay {
    pub const MAX_SCORE: f64 = 10.0;

    pub fn new(score: f64) -> Self {
        Self {
            score,
            width: (score / Self::MAX_SCORE * 100.0).clamp(0.0, 100.0),
        }
    }

    /// Qualitative band used for the label
    pub fn band(&self) -> &'static str {
        if self.score >= 7.0 {
            "Good"
        } else if self.score >= 4.0 {
            "Fair"
        } else {
            "Poor"
        }
    }
}
