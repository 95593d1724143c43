use std::fmt::Write;

use workflow::{Graph, PortRole};

const DRIVER_COLOR: &str = "#AA3939";
const SUB_LOOP_COLOR: &str = "#D4AA6A";
const TO_OUTER_COLOR: &str = "#55AA55";
const FROM_OUTER_COLOR: &str = "#4B698B";
const INNER_COLOR: &str = "#8B4B8B";

/// Render `graph` as a Graphviz `digraph`.
pub fn write_dot(graph: &Graph, out: &mut impl Write) -> std::fmt::Result {
    writeln!(out, "digraph wf_graph {{")?;
    writeln!(out, "  node [shape=rectangle, fontsize=10, fontname=\"Consolas\"];")?;
    writeln!(out, "  edge [fontsize=10, fontname=\"Consolas\"];")?;

    for node in graph.nodes() {
        write!(
            out,
            "  \"{}\" [label=\"{}\"",
            escape(node.exe_id()),
            escape(node.name())
        )?;
        if node.is_driver() {
            write!(out, ", color=\"{DRIVER_COLOR}\"")?;
        } else if graph.is_sub_loop_controller(node.id()) {
            write!(out, ", color=\"{SUB_LOOP_COLOR}\"")?;
        }
        writeln!(out, "];")?;
    }

    for (_, edge) in graph.edges() {
        let source = graph.get(edge.source);
        let target = graph.get(edge.target);
        write!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{} > {}\"",
            escape(source.exe_id()),
            escape(target.exe_id()),
            escape(&source.output(edge.output).name),
            escape(&target.input(edge.input).name),
        )?;
        let color = if edge.target_role == PortRole::Outer {
            Some(TO_OUTER_COLOR)
        } else if edge.source_role == PortRole::Outer {
            Some(FROM_OUTER_COLOR)
        } else if edge.source_role.is_inner() || edge.target_role.is_inner() {
            Some(INNER_COLOR)
        } else {
            None
        };
        if let Some(color) = color {
            write!(out, ", color=\"{color}\"")?;
        }
        writeln!(out, "];")?;
    }

    writeln!(out, "}}")
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
