//! Terminal and SVG renderings of a [`DiagramLayout`].

use std::fmt::{self, Write};

use qdice_view::DiagramLayout;
use qdice_view::layout::{Segment, StepPrimitives};

/// Characters per step column in the text diagram.
const CELL_WIDTH: usize = 7;

/// Widest gate label that fits in a text cell.
const LABEL_WIDTH: usize = CELL_WIDTH - 2;

fn cell_for(step: &StepPrimitives, qubit: u32) -> String {
    let layout = &step.layout;

    if let Some(glyph) = &step.glyph {
        if layout.target_qubit == qubit {
            let label: String = glyph.label.chars().take(LABEL_WIDTH).collect();
            let (open, close) = if layout.highlighted { ('╡', '╞') } else { ('┤', '├') };
            return format!("{open}{label:^LABEL_WIDTH$}{close}");
        }
    }

    if layout.control_qubits.contains(&qubit) {
        return "───●───".to_string();
    }

    let (lo, hi) = layout.connector_span;
    if step.connector.is_some() && lo < qubit && qubit < hi {
        return "───┼───".to_string();
    }

    "─".repeat(CELL_WIDTH)
}

/// One line per qubit wire, plus a pointer line under the highlighted step.
pub fn text_diagram(diagram: &DiagramLayout) -> Vec<String> {
    let index_width = diagram.num_qubits.saturating_sub(1).to_string().len();
    let mut lines: Vec<String> = (0..diagram.num_qubits)
        .map(|q| {
            let cells: String = diagram.steps.iter().map(|s| cell_for(s, q)).collect();
            format!("q{q:<index_width$}: {cells}")
        })
        .collect();

    if let Some(current) = diagram.steps.iter().position(|s| s.layout.highlighted) {
        // "q", the padded index, then ": ".
        let prefix = 1 + index_width + 2;
        let offset = prefix + current * CELL_WIDTH + CELL_WIDTH / 2;
        let ket = diagram.steps[current]
            .ket
            .as_ref()
            .map(|k| k.text())
            .unwrap_or_default();
        lines.push(format!("{}▲ {ket}", " ".repeat(offset)));
    }

    lines
}

fn svg_line(out: &mut String, seg: &Segment) -> fmt::Result {
    let dash = if seg.dashed {
        r#" stroke-dasharray="4 4""#
    } else {
        ""
    };
    writeln!(
        out,
        r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}"{dash}/>"#,
        seg.x1, seg.y1, seg.x2, seg.y2, seg.stroke
    )
}

/// Standalone SVG document for the diagram.
pub fn svg(diagram: &DiagramLayout) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        diagram.width, diagram.height
    )?;

    for wire in &diagram.wires {
        svg_line(&mut out, wire)?;
    }

    for step in &diagram.steps {
        if let Some(connector) = &step.connector {
            svg_line(&mut out, connector)?;
        }
        for dot in &step.controls {
            writeln!(
                out,
                r#"  <circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                dot.cx, dot.cy, dot.radius, dot.fill
            )?;
        }
        if let Some(glyph) = &step.glyph {
            writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}"/>"#,
                glyph.x,
                glyph.y,
                glyph.width,
                glyph.height,
                glyph.corner_radius,
                glyph.fill,
                glyph.stroke
            )?;
            writeln!(
                out,
                r#"  <text x="{}" y="{}" text-anchor="middle" fill="{}">{}</text>"#,
                glyph.label_x, glyph.label_y, glyph.stroke, glyph.label
            )?;
        }
        for marker in &step.markers {
            svg_line(&mut out, marker)?;
        }
        if let Some(ket) = &step.ket {
            writeln!(
                out,
                r#"  <text x="{}" y="{}" text-anchor="middle">{}</text>"#,
                ket.x,
                ket.y,
                ket.text()
            )?;
        }
    }

    out.push_str("</svg>\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdice_view::{
        CircuitLayoutEngine, CircuitStep, CircuitTrace, LayoutConfig, StepTimeline, ViewMode,
    };

    fn step(gate: &str, qubits: Vec<u32>) -> CircuitStep {
        step_on(gate, qubits, 3)
    }

    fn step_on(gate: &str, qubits: Vec<u32>, num_qubits: u32) -> CircuitStep {
        let mut step = CircuitStep::initial(num_qubits);
        step.gate_id = gate.to_string();
        step.qubits = qubits;
        step
    }

    fn diagram(mode: ViewMode) -> DiagramLayout {
        let trace = CircuitTrace::new(3, vec![step("ry", vec![0]), step("cry", vec![0, 2])]);
        let mut timeline = StepTimeline::new(mode);
        timeline.load(trace).unwrap();
        timeline.advance();
        CircuitLayoutEngine::new(LayoutConfig::default()).layout_diagram(&timeline)
    }

    #[test]
    fn test_text_diagram_draws_controls() {
        let lines = text_diagram(&diagram(ViewMode::Interactive));
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("╡ RY  ╞"));
        assert!(lines[0].contains('●'));
        assert!(lines[1].contains('┼'));
        assert!(lines[2].contains("┤ CRY ├"));
        assert!(lines[3].contains("|ψ₁⟩"));
    }

    #[test]
    fn test_view_only_has_no_pointer() {
        let lines = text_diagram(&diagram(ViewMode::ViewOnly));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_wide_register_keeps_columns_aligned() {
        let trace = CircuitTrace::new(
            12,
            vec![step_on("ry", vec![0], 12), step_on("x", vec![11], 12)],
        );
        let mut timeline = StepTimeline::new(ViewMode::Interactive);
        timeline.load(trace).unwrap();
        timeline.advance();
        let lines = text_diagram(
            &CircuitLayoutEngine::new(LayoutConfig::default()).layout_diagram(&timeline),
        );

        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("q0 : "));
        assert!(lines[11].starts_with("q11: "));
        let widths: Vec<usize> = lines[..12].iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]));

        // The pointer sits under the middle of the highlighted column.
        let pointer = lines[12].chars().position(|c| c == '▲').unwrap();
        let column = lines[0].chars().position(|c| c == '╡').unwrap();
        assert_eq!(pointer, column + CELL_WIDTH / 2);
    }

    #[test]
    fn test_svg_contains_primitives() {
        let svg = svg(&diagram(ViewMode::Interactive)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("#ffeaa7"));
        assert!(svg.contains(">CRY</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
