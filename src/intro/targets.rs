//! Per-element animation targets for each intro phase.
//!
//! Targets are declared as sparse keyframes: a phase only names the fields it
//! changes. [`TargetTable::resolve`] folds them over each element's initial
//! state, so a field a keyframe leaves out keeps the value it had in the
//! previous phase. Transitions are never carried over: a keyframe without one
//! snaps to its target.

use serde::Serialize;

use super::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Text1,
    Text2,
    Bull,
    FinalLogo,
}

impl Element {
    pub const COUNT: usize = 4;
    pub const ALL: [Element; Element::COUNT] = [
        Element::Text1,
        Element::Text2,
        Element::Bull,
        Element::FinalLogo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Text1 => "text_1",
            Element::Text2 => "text_2",
            Element::Bull => "bull",
            Element::FinalLogo => "final_logo",
        }
    }

    /// Image the host must serve for this element, if it is an image.
    pub fn asset_path(&self) -> Option<&'static str> {
        match self {
            Element::Bull => Some("/karion-bull.png"),
            Element::FinalLogo => Some("/karion-full-logo.png"),
            Element::Text1 | Element::Text2 => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    EaseOut,
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub duration_ms: u64,
    /// `None` leaves the curve to the renderer's default.
    pub easing: Option<Easing>,
    pub delay_ms: u64,
}

impl Transition {
    fn new(duration_ms: u64, easing: Option<Easing>) -> Self {
        Self { duration_ms, easing, delay_ms: 0 }
    }

    fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Clip rectangle as insets from each edge, in percent of the element box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipInset {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl ClipInset {
    pub const NONE: ClipInset = ClipInset::left_right(0.0, 0.0);

    /// Hidden behind its right edge; revealing shrinks `right` to 0 (left to right wipe).
    pub const HIDDEN_RIGHT: ClipInset = ClipInset::left_right(0.0, 100.0);

    /// Hidden behind its left edge; revealing shrinks `left` to 0 (right to left wipe).
    pub const HIDDEN_LEFT: ClipInset = ClipInset::left_right(100.0, 0.0);

    const fn left_right(left: f32, right: f32) -> Self {
        Self {
            top: 0.0,
            right,
            bottom: 0.0,
            left,
        }
    }

    pub fn css(&self) -> String {
        format!("inset({}% {}% {}% {}%)", self.top, self.right, self.bottom, self.left)
    }
}

/// Fully resolved visual state of one element during one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualState {
    /// Horizontal offset from center, in viewport widths.
    pub x_vw: f32,
    pub scale: f32,
    pub opacity: f32,
    pub blur_px: f32,
    pub clip: ClipInset,
    pub transition: Option<Transition>,
}

impl VisualState {
    const fn at_rest() -> Self {
        Self {
            x_vw: 0.0,
            scale: 1.0,
            opacity: 1.0,
            blur_px: 0.0,
            clip: ClipInset::NONE,
            transition: None,
        }
    }
}

/// Sparse target: only the fields a phase changes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keyframe {
    pub x_vw: Option<f32>,
    pub scale: Option<f32>,
    pub opacity: Option<f32>,
    pub blur_px: Option<f32>,
    pub clip: Option<ClipInset>,
    pub transition: Option<Transition>,
}

impl Keyframe {
    fn new() -> Self {
        Self::default()
    }

    fn x(mut self, v: f32) -> Self {
        self.x_vw = Some(v);
        self
    }

    fn scale(mut self, v: f32) -> Self {
        self.scale = Some(v);
        self
    }

    fn opacity(mut self, v: f32) -> Self {
        self.opacity = Some(v);
        self
    }

    fn blur(mut self, v: f32) -> Self {
        self.blur_px = Some(v);
        self
    }

    fn clip(mut self, v: ClipInset) -> Self {
        self.clip = Some(v);
        self
    }

    fn over(mut self, t: Transition) -> Self {
        self.transition = Some(t);
        self
    }

    /// Bull sprite pose shared by most phases: full size, visible, sharp.
    fn bull_at(x: f32) -> Self {
        Self::new().x(x).scale(1.0).opacity(1.0).blur(0.0)
    }

    fn apply(&self, prev: &VisualState) -> VisualState {
        VisualState {
            x_vw: self.x_vw.unwrap_or(prev.x_vw),
            scale: self.scale.unwrap_or(prev.scale),
            opacity: self.opacity.unwrap_or(prev.opacity),
            blur_px: self.blur_px.unwrap_or(prev.blur_px),
            clip: self.clip.unwrap_or(prev.clip),
            transition: self.transition,
        }
    }
}

/// State an element holds before the first phase is applied.
pub fn initial_state(element: Element) -> VisualState {
    match element {
        Element::Bull => VisualState {
            scale: 0.0,
            opacity: 0.0,
            blur_px: 10.0,
            ..VisualState::at_rest()
        },
        other => declared(other, Phase::Entering).apply(&VisualState::at_rest()),
    }
}

/// Keyframe declared for `element` in `phase`. Every element arm yields a
/// keyframe for every phase; texts and the final logo fall through to their
/// resting keyframe outside the phases that animate them.
pub fn declared(element: Element, phase: Phase) -> Keyframe {
    use Easing::{EaseInOut, EaseOut};

    match element {
        Element::Bull => match phase {
            Phase::Entering => Keyframe::bull_at(0.0).over(Transition::new(1500, Some(EaseOut))),
            Phase::Ready1 => Keyframe::bull_at(-40.0).over(Transition::new(800, Some(EaseInOut))),
            Phase::Write1 => Keyframe::bull_at(40.0).over(Transition::new(1600, Some(EaseInOut))),
            Phase::Erase1 => Keyframe::bull_at(-40.0).over(Transition::new(1400, Some(EaseInOut))),
            // jumps right while hidden
            Phase::Ready2 => Keyframe::new()
                .x(40.0)
                .scale(0.8)
                .opacity(0.0)
                .blur(5.0)
                .over(Transition::new(500, None)),
            Phase::Write2 => Keyframe::new()
                .x(-40.0)
                .scale(0.8)
                .opacity(1.0)
                .blur(0.0)
                .over(Transition::new(1600, Some(EaseInOut))),
            Phase::WriteKarion => Keyframe::new()
                .x(10.0)
                .scale(0.9)
                .opacity(0.0)
                .blur(10.0)
                .over(Transition::new(2000, Some(EaseInOut))),
            Phase::Final => Keyframe::new().opacity(0.0),
        },
        Element::Text1 => match phase {
            Phase::Write1 => Keyframe::new()
                .clip(ClipInset::NONE)
                .over(Transition::new(1600, Some(EaseInOut))),
            Phase::Erase1 => Keyframe::new()
                .clip(ClipInset::HIDDEN_RIGHT)
                .over(Transition::new(1400, Some(EaseInOut))),
            _ => Keyframe::new().clip(ClipInset::HIDDEN_RIGHT),
        },
        Element::Text2 => match phase {
            Phase::Write2 => Keyframe::new()
                .clip(ClipInset::NONE)
                .over(Transition::new(1600, Some(EaseInOut))),
            Phase::WriteKarion => Keyframe::new()
                .clip(ClipInset::HIDDEN_LEFT)
                .over(Transition::new(1200, Some(EaseInOut))),
            _ => Keyframe::new().clip(ClipInset::HIDDEN_LEFT),
        },
        Element::FinalLogo => match phase {
            Phase::WriteKarion => Keyframe::new()
                .opacity(1.0)
                .scale(1.0)
                .blur(0.0)
                .over(Transition::new(2000, Some(EaseOut)).delayed(500)),
            Phase::Final => Keyframe::new().opacity(1.0).scale(1.0).blur(0.0),
            _ => Keyframe::new().opacity(0.0).scale(0.95).blur(10.0),
        },
    }
}

/// Resolved `element x phase` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetTable {
    states: [[VisualState; Phase::COUNT]; Element::COUNT],
}

impl TargetTable {
    pub fn resolve() -> Self {
        let mut states = [[VisualState::at_rest(); Phase::COUNT]; Element::COUNT];
        for element in Element::ALL {
            let mut prev = initial_state(element);
            for phase in Phase::ALL {
                let resolved = declared(element, phase).apply(&prev);
                states[element.index()][phase.index()] = resolved;
                prev = resolved;
            }
        }
        Self { states }
    }

    pub fn get(&self, element: Element, phase: Phase) -> &VisualState {
        &self.states[element.index()][phase.index()]
    }

    /// Every element's target for one phase, in [`Element::ALL`] order.
    pub fn frame(&self, phase: Phase) -> [(Element, VisualState); Element::COUNT] {
        Element::ALL.map(|e| (e, *self.get(e, phase)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, Phase, &VisualState)> + '_ {
        Element::ALL.into_iter().flat_map(move |e| {
            Phase::ALL.into_iter().map(move |p| (e, p, self.get(e, p)))
        })
    }
}

impl Default for TargetTable {
    fn default() -> Self {
        Self::resolve()
    }
}
