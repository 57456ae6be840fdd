//! Circuit diagram layout.
//!
//! Turns sparse per-step gate metadata into geometric primitives: the
//! target glyph, control dots, the vertical connector of controlled gates,
//! dashed step-boundary markers and the `|ψᵢ⟩` label. Nothing here draws;
//! renderers consume [`DiagramLayout`].
//!
//! Coordinates are in canvas units with the origin at the top left. Step
//! `i` starts at `x = i * (gate_width + spacing)`; qubit `q`'s wire sits at
//! `y = q * wire_pitch + wire_pitch / 2`.

use serde::{Deserialize, Serialize};

use crate::gate::{Color, GateKind, palette};
use crate::timeline::{StepTimeline, ViewMode};
use crate::trace::CircuitStep;

/// Gate box height.
pub const GATE_HEIGHT: f64 = 30.0;
/// Distance from the top of a wire's band to the top of its gate box.
pub const GATE_TOP_INSET: f64 = 10.0;
/// Distance from the top of a wire's band to the gate label baseline.
pub const LABEL_BASELINE: f64 = 30.0;
pub const CORNER_RADIUS: f64 = 5.0;
pub const CONTROL_DOT_RADIUS: f64 = 5.0;
/// Distance below the last wire band to the ket label baseline.
pub const KET_OFFSET: f64 = 35.0;
/// Extra canvas width beyond the last step.
pub const CANVAS_MARGIN_X: f64 = 100.0;
/// Extra canvas height beyond the last wire band.
pub const CANVAS_MARGIN_Y: f64 = 60.0;

/// Diagram dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a gate box.
    pub gate_width: f64,
    /// Horizontal gap between consecutive steps.
    pub spacing: f64,
    /// Vertical distance between qubit wires.
    pub wire_pitch: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gate_width: 60.0,
            spacing: 20.0,
            wire_pitch: 50.0,
        }
    }
}

/// Logical placement of one step, independent of coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLayout {
    pub index: usize,
    pub kind: GateKind,
    pub has_gate: bool,
    pub has_qubits: bool,
    pub is_controlled: bool,
    pub target_qubit: u32,
    pub control_qubits: Vec<u32>,
    /// `(min, max)` qubit touched; `(0, 0)` when the step has no qubits.
    pub connector_span: (u32, u32),
    /// The step sits under the cursor.
    pub is_current: bool,
    /// The step is drawn highlighted (current, interactive mode only).
    pub highlighted: bool,
    /// A boundary marker is also drawn left of this step.
    pub show_left_marker: bool,
}

impl StepLayout {
    /// Analyze `step` at position `index` of a timeline whose cursor is at
    /// `cursor`.
    ///
    /// Malformed steps never fail: a gate without qubits targets qubit 0.
    pub fn analyze(step: &CircuitStep, index: usize, cursor: usize, mode: ViewMode) -> Self {
        let kind = step.kind();
        let qubits = &step.qubits;

        let has_gate = kind.is_drawable();
        let has_qubits = !qubits.is_empty();
        let is_controlled = has_gate && kind.is_controlled_form() && qubits.len() > 1;

        let target_qubit = match (is_controlled, qubits.first(), qubits.last()) {
            (true, _, Some(&last)) => last,
            (false, Some(&first), _) => first,
            _ => 0,
        };

        let control_qubits = if is_controlled {
            qubits[..qubits.len() - 1].to_vec()
        } else {
            Vec::new()
        };

        let connector_span = match (qubits.iter().min(), qubits.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0, 0),
        };

        let is_current = index == cursor;
        let highlighted = is_current && mode == ViewMode::Interactive;

        Self {
            index,
            kind,
            has_gate,
            has_qubits,
            is_controlled,
            target_qubit,
            control_qubits,
            connector_span,
            is_current,
            highlighted,
            show_left_marker: highlighted && cursor == 0,
        }
    }
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Color,
    pub dashed: bool,
}

/// Rounded gate box with its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateGlyph {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: Color,
    pub stroke: Color,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
}

/// Filled dot on a control qubit's wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlDot {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: Color,
}

/// `|ψᵢ⟩` label under the highlighted step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KetLabel {
    pub x: f64,
    pub y: f64,
    pub index: usize,
}

impl KetLabel {
    pub fn text(&self) -> String {
        format!("|ψ{}⟩", subscript(self.index))
    }
}

fn subscript(n: usize) -> String {
    const DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

/// Everything needed to draw one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPrimitives {
    pub layout: StepLayout,
    pub glyph: Option<GateGlyph>,
    pub controls: Vec<ControlDot>,
    pub connector: Option<Segment>,
    pub markers: Vec<Segment>,
    pub ket: Option<KetLabel>,
}

/// A full diagram: canvas size, qubit wires and per-step primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    pub width: f64,
    pub height: f64,
    pub num_qubits: u32,
    pub wires: Vec<Segment>,
    pub steps: Vec<StepPrimitives>,
}

/// Computes diagram geometry from a [`StepTimeline`].
#[derive(Debug, Clone, Default)]
pub struct CircuitLayoutEngine {
    config: LayoutConfig,
}

impl CircuitLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Left edge of step `index`.
    pub fn step_x(&self, index: usize) -> f64 {
        index as f64 * self.column_width()
    }

    /// Vertical position of qubit `qubit`'s wire.
    pub fn wire_y(&self, qubit: u32) -> f64 {
        self.band_top(qubit) + self.config.wire_pitch / 2.0
    }

    fn band_top(&self, qubit: u32) -> f64 {
        f64::from(qubit) * self.config.wire_pitch
    }

    fn column_width(&self) -> f64 {
        self.config.gate_width + self.config.spacing
    }

    /// Primitives for `step` at `index`, given the cursor position.
    pub fn layout_step(
        &self,
        step: &CircuitStep,
        index: usize,
        cursor: usize,
        mode: ViewMode,
        num_qubits: u32,
    ) -> StepPrimitives {
        let layout = StepLayout::analyze(step, index, cursor, mode);
        let cfg = &self.config;
        let x = self.step_x(index);
        let center_x = x + cfg.gate_width / 2.0;
        let wires_bottom = f64::from(num_qubits) * cfg.wire_pitch;

        let glyph = layout.has_gate.then(|| {
            let band = self.band_top(layout.target_qubit);
            GateGlyph {
                x,
                y: band + GATE_TOP_INSET,
                width: cfg.gate_width,
                height: GATE_HEIGHT,
                corner_radius: CORNER_RADIUS,
                fill: if layout.highlighted {
                    palette::HIGHLIGHT
                } else {
                    layout.kind.color()
                },
                stroke: palette::INK,
                label: layout.kind.label(),
                label_x: center_x,
                label_y: band + LABEL_BASELINE,
            }
        });

        let controls = layout
            .control_qubits
            .iter()
            .map(|&q| ControlDot {
                cx: center_x,
                cy: self.wire_y(q),
                radius: CONTROL_DOT_RADIUS,
                fill: palette::INK,
            })
            .collect();

        let connector = layout.is_controlled.then(|| Segment {
            x1: center_x,
            y1: self.wire_y(layout.connector_span.0),
            x2: center_x,
            y2: self.wire_y(layout.connector_span.1),
            stroke: palette::INK,
            dashed: false,
        });

        let mut markers = Vec::new();
        if layout.highlighted {
            let marker = |mx: f64| Segment {
                x1: mx,
                y1: 0.0,
                x2: mx,
                y2: wires_bottom,
                stroke: palette::MARKER,
                dashed: true,
            };
            markers.push(marker(x + cfg.gate_width + cfg.spacing / 2.0));
            if layout.show_left_marker {
                markers.push(marker(x - cfg.spacing / 2.0));
            }
        }

        let ket = layout.highlighted.then(|| KetLabel {
            x: center_x,
            y: wires_bottom + KET_OFFSET,
            index,
        });

        StepPrimitives {
            layout,
            glyph,
            controls,
            connector,
            markers,
            ket,
        }
    }

    /// Lay out every step of `timeline`.
    pub fn layout_diagram(&self, timeline: &StepTimeline) -> DiagramLayout {
        let num_qubits = timeline.num_qubits();
        let steps_len = timeline.len();
        let wire_end = steps_len as f64 * self.column_width();

        let wires = (0..num_qubits)
            .map(|q| {
                let y = self.wire_y(q);
                Segment {
                    x1: 0.0,
                    y1: y,
                    x2: wire_end,
                    y2: y,
                    stroke: palette::WIRE,
                    dashed: false,
                }
            })
            .collect();

        let steps = timeline
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| {
                self.layout_step(step, i, timeline.cursor(), timeline.mode(), num_qubits)
            })
            .collect();

        DiagramLayout {
            width: wire_end + CANVAS_MARGIN_X,
            height: f64::from(num_qubits) * self.config.wire_pitch + CANVAS_MARGIN_Y,
            num_qubits,
            wires,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::tests::{sample_trace, uniform_step};

    fn controlled_step() -> CircuitStep {
        uniform_step("cx", vec![0, 2], 3)
    }

    #[test]
    fn test_controlled_gate_analysis() {
        let layout = StepLayout::analyze(&controlled_step(), 1, 0, ViewMode::Interactive);
        assert!(layout.is_controlled);
        assert_eq!(layout.control_qubits, vec![0]);
        assert_eq!(layout.target_qubit, 2);
        assert_eq!(layout.connector_span, (0, 2));
        assert!(!layout.is_current);
    }

    #[test]
    fn test_multi_controlled_id_is_drawn_uncontrolled() {
        let step = uniform_step("mcry", vec![0, 1, 2], 3);
        let layout = StepLayout::analyze(&step, 0, 0, ViewMode::Interactive);
        assert!(layout.has_gate);
        assert!(!layout.is_controlled);
        assert_eq!(layout.target_qubit, 0);
        assert!(layout.control_qubits.is_empty());

        let engine = CircuitLayoutEngine::new(LayoutConfig::default());
        let primitives = engine.layout_step(&step, 0, 0, ViewMode::Interactive, 3);
        assert!(primitives.controls.is_empty());
        assert!(primitives.connector.is_none());
    }

    #[test]
    fn test_controlled_marker_with_single_qubit_is_not_controlled() {
        let step = uniform_step("cx", vec![1], 2);
        let layout = StepLayout::analyze(&step, 0, 0, ViewMode::Interactive);
        assert!(!layout.is_controlled);
        assert_eq!(layout.target_qubit, 1);
        assert!(layout.control_qubits.is_empty());
    }

    #[test]
    fn test_uncontrolled_multi_qubit_targets_first() {
        let step = uniform_step("swap", vec![1, 0], 2);
        let layout = StepLayout::analyze(&step, 0, 0, ViewMode::Interactive);
        assert!(!layout.is_controlled);
        assert_eq!(layout.target_qubit, 1);
        assert_eq!(layout.connector_span, (0, 1));
    }

    #[test]
    fn test_gate_without_qubits_degrades() {
        let step = uniform_step("ry", vec![], 2);
        let layout = StepLayout::analyze(&step, 0, 0, ViewMode::Interactive);
        assert!(layout.has_gate);
        assert!(!layout.has_qubits);
        assert_eq!(layout.target_qubit, 0);
        assert_eq!(layout.connector_span, (0, 0));
    }

    #[test]
    fn test_initial_step_has_no_gate() {
        let step = CircuitStep::initial(2);
        let engine = CircuitLayoutEngine::default();
        let prims = engine.layout_step(&step, 0, 0, ViewMode::Interactive, 2);
        assert!(!prims.layout.has_gate);
        assert!(prims.glyph.is_none());
        assert!(prims.connector.is_none());
        // Still current, so the boundary markers and ket label are drawn.
        assert_eq!(prims.markers.len(), 2);
        assert!(prims.ket.is_some());
    }

    #[test]
    fn test_controlled_geometry() {
        let engine = CircuitLayoutEngine::default();
        let prims = engine.layout_step(&controlled_step(), 2, 0, ViewMode::Interactive, 3);

        let glyph = prims.glyph.unwrap();
        assert_eq!(glyph.x, 160.0);
        assert_eq!(glyph.y, 110.0);
        assert_eq!(glyph.label, "CX");
        assert_eq!(glyph.fill, palette::DEFAULT);

        assert_eq!(prims.controls.len(), 1);
        assert_eq!(prims.controls[0].cx, 190.0);
        assert_eq!(prims.controls[0].cy, 25.0);

        let connector = prims.connector.unwrap();
        assert_eq!((connector.y1, connector.y2), (25.0, 125.0));
        assert!(prims.markers.is_empty());
        assert!(prims.ket.is_none());
    }

    #[test]
    fn test_highlight_only_in_interactive_mode() {
        let engine = CircuitLayoutEngine::default();
        let step = uniform_step("ry", vec![0], 1);

        let interactive = engine.layout_step(&step, 1, 1, ViewMode::Interactive, 1);
        assert_eq!(interactive.glyph.unwrap().fill, palette::HIGHLIGHT);
        assert_eq!(interactive.markers.len(), 1);
        assert_eq!(interactive.markers[0].x1, 80.0 + 60.0 + 10.0);

        let view_only = engine.layout_step(&step, 1, 1, ViewMode::ViewOnly, 1);
        assert!(view_only.layout.is_current);
        assert_eq!(view_only.glyph.unwrap().fill, palette::RY);
        assert!(view_only.markers.is_empty());
        assert!(view_only.ket.is_none());
    }

    #[test]
    fn test_retreat_at_start_draws_left_marker() {
        let mut timeline = StepTimeline::new(ViewMode::Interactive).with_initial_step(false);
        timeline.load(sample_trace(2, 5)).unwrap();
        timeline.retreat();

        let diagram = CircuitLayoutEngine::default().layout_diagram(&timeline);
        let first = &diagram.steps[0];
        assert!(first.layout.is_current);
        assert!(first.layout.show_left_marker);
        let xs: Vec<f64> = first.markers.iter().map(|m| m.x1).collect();
        assert_eq!(xs, vec![70.0, -10.0]);
        assert!(diagram.steps[1..].iter().all(|s| s.markers.is_empty()));
    }

    #[test]
    fn test_diagram_dimensions() {
        let mut timeline = StepTimeline::new(ViewMode::Interactive);
        timeline.load(sample_trace(3, 3)).unwrap();

        let diagram = CircuitLayoutEngine::default().layout_diagram(&timeline);
        assert_eq!(diagram.steps.len(), 4);
        assert_eq!(diagram.width, 4.0 * 80.0 + 100.0);
        assert_eq!(diagram.height, 3.0 * 50.0 + 60.0);
        assert_eq!(diagram.wires.len(), 3);
        assert_eq!(diagram.wires[2].y1, 125.0);
        assert_eq!(diagram.wires[0].x2, 320.0);
    }

    #[test]
    fn test_ket_label_text() {
        let ket = KetLabel {
            x: 0.0,
            y: 0.0,
            index: 12,
        };
        assert_eq!(ket.text(), "|ψ₁₂⟩");
    }
}
