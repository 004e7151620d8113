//! Scene construction.
//!
//! [`build_scene`] is a pure function of the tree and its layout. Surfaces
//! only execute the result, so everything the diagram shows is decided here:
//! direction colours, node roles, level-of-detail text, hover cards and the
//! degraded message for trees too large to draw.

use super::command::{Circle, Color, Label, Line, NodeGroup, Primitive, Scene, TextAnchor, palette};
use super::overlay::HoverCard;
use crate::graph::{Direction, NodeId, NodeRole, TreeGraph};
use crate::layout::{Position, TreeLayout};

const EDGE_WIDTH: f64 = 2.0;
const EDGE_OPACITY: f64 = 0.9;
const EDGE_LABEL_DY: f64 = -5.0;

/// Colour of an edge by branch direction.
pub fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => palette::UP,
        Direction::Middle => palette::MIDDLE,
        Direction::Down => palette::DOWN,
        Direction::Other => palette::NEUTRAL,
    }
}

/// Fill of a node by structural role.
pub fn role_color(role: NodeRole) -> Color {
    match role {
        NodeRole::Root => palette::ROOT,
        NodeRole::Interior => palette::INTERIOR,
        NodeRole::Leaf => palette::LEAF,
    }
}

/// Build the scene for a laid-out tree.
pub fn build_scene(graph: &TreeGraph<'_>, layout: &TreeLayout) -> Scene {
    if !layout.profile.render {
        return oversize_message(graph.dataset().nodes.len(), layout);
    }

    let dataset = graph.dataset();
    let profile = &layout.profile;
    let depth = graph.depth();
    let mut scene = Scene::default();
    let mut missing = 0usize;

    let mut position_of = |id: &NodeId| match layout.positions.get(id) {
        Some(&position) => position,
        None => {
            missing += 1;
            Position::ORIGIN
        }
    };

    let segments: Vec<(Position, Position)> = dataset
        .edges
        .iter()
        .map(|edge| (position_of(&edge.source), position_of(&edge.target)))
        .collect();

    if missing > 0 {
        log::warn!("{missing} edge endpoint(s) reference unknown nodes, drawn at the origin");
    }

    for (edge, &(from, to)) in dataset.edges.iter().zip(&segments) {
        scene.push(Primitive::Line(Line {
            key: edge.key(),
            class: "link",
            from,
            to,
            color: direction_color(edge.direction),
            width: EDGE_WIDTH,
            opacity: EDGE_OPACITY,
        }));
    }

    for (edge, &(from, to)) in dataset.edges.iter().zip(&segments) {
        scene.push(Primitive::Label(Label {
            key: format!("label:{}", edge.key()),
            class: "link-label",
            position: from.midpoint(to),
            dy: EDGE_LABEL_DY,
            content: profile.edge_label(edge.probability),
            font_size: profile.label_font_size,
            font_weight: 600,
            color: direction_color(edge.direction),
            anchor: TextAnchor::Middle,
        }));
    }

    for node in &dataset.nodes {
        let translate = layout
            .positions
            .get(&node.id)
            .copied()
            .unwrap_or(Position::ORIGIN);

        let mut labels = vec![Label {
            key: format!("value:{}", node.id),
            class: "node-value",
            position: Position::ORIGIN,
            dy: -0.3 * profile.font_size,
            content: profile.value_label(node.value),
            font_size: profile.font_size,
            font_weight: 600,
            color: palette::NODE_TEXT,
            anchor: TextAnchor::Middle,
        }];
        if let Some(content) = profile.secondary_label(node.option_value) {
            labels.push(Label {
                key: format!("option:{}", node.id),
                class: "node-option",
                position: Position::ORIGIN,
                dy: profile.secondary_font_size,
                content,
                font_size: profile.secondary_font_size,
                font_weight: 500,
                color: palette::NODE_TEXT,
                anchor: TextAnchor::Middle,
            });
        }

        scene.push(Primitive::Node(NodeGroup {
            key: format!("node:{}", node.id),
            class: "node",
            translate,
            circle: Circle {
                center: Position::ORIGIN,
                radius: profile.node_radius,
                fill: role_color(node.role(depth)),
                stroke: palette::NODE_STROKE,
                stroke_width: profile.stroke_width,
            },
            labels,
            hover: HoverCard::for_node(node),
        }));
    }

    log::debug!(
        "scene: {} primitives for {} nodes / {} edges",
        scene.len(),
        dataset.nodes.len(),
        dataset.edges.len()
    );
    scene
}

/// Two centred lines replacing the diagram.
fn oversize_message(node_count: usize, layout: &TreeLayout) -> Scene {
    let center = Position::new(layout.frame.width / 2.0, layout.frame.height / 2.0);
    let title = Label {
        key: "message:title".to_string(),
        class: "message",
        position: center,
        dy: 0.0,
        content: format!("N > 50, Tree too large for visualization ({node_count} nodes)"),
        font_size: 16.0,
        font_weight: 400,
        color: palette::MESSAGE,
        anchor: TextAnchor::Middle,
    };
    let detail = Label {
        key: "message:detail".to_string(),
        class: "message",
        position: Position::new(center.x, center.y + 30.0),
        dy: 0.0,
        content: "Calculations are correct, only visualization is simplified".to_string(),
        font_size: 14.0,
        font_weight: 400,
        color: palette::MESSAGE_DETAIL,
        anchor: TextAnchor::Middle,
    };

    log::info!("tree too large to draw ({node_count} nodes), showing message");
    Scene {
        primitives: vec![Primitive::Label(title), Primitive::Label(detail)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{TreeDataset, TreeEdge, TreeNode, TreeParams};
    use crate::layout::StepLayout;

    fn node(id: &str, step: u32) -> TreeNode {
        TreeNode {
            id: NodeId::from(id),
            step,
            value: 100.0,
            option_value: 4.5,
            payoff: 0.0,
            prob_up: Some(0.25),
            prob_mid: Some(0.5),
            prob_down: Some(0.25),
        }
    }

    fn edge(source: &str, target: &str, direction: Direction, probability: f64) -> TreeEdge {
        TreeEdge {
            source: NodeId::from(source),
            target: NodeId::from(target),
            direction,
            probability: Some(probability),
        }
    }

    fn one_step() -> TreeDataset {
        TreeDataset {
            nodes: vec![node("r", 0), node("u", 1), node("m", 1), node("d", 1)],
            edges: vec![
                edge("r", "u", Direction::Up, 0.25),
                edge("r", "m", Direction::Middle, 0.5),
                edge("r", "d", Direction::Down, 0.25),
            ],
            tree_params: TreeParams {
                n: 1,
                final_price: 4.5,
            },
        }
    }

    fn scene_of(dataset: &TreeDataset) -> Scene {
        let graph = TreeGraph::build(dataset);
        let layout = StepLayout::default().compute(&graph, 1000.0, 600.0);
        build_scene(&graph, &layout)
    }

    #[test]
    fn test_draw_order() {
        let scene = scene_of(&one_step());
        let kinds: Vec<u8> = scene
            .primitives
            .iter()
            .map(|p| match p {
                Primitive::Line(_) => 0,
                Primitive::Label(_) => 1,
                Primitive::Node(_) => 2,
            })
            .collect();
        assert_eq!(kinds, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_colours() {
        let scene = scene_of(&one_step());

        let Some(Primitive::Line(up)) = scene.get("edge:r->u") else {
            panic!("missing up edge");
        };
        assert_eq!(up.color, palette::UP);
        assert_eq!(up.width, 2.0);
        assert_eq!(up.opacity, 0.9);

        let fills: Vec<Color> = scene.nodes().map(|n| n.circle.fill).collect();
        assert_eq!(fills, vec![palette::ROOT, palette::LEAF, palette::LEAF, palette::LEAF]);
        assert!(scene.nodes().all(|n| n.circle.stroke == palette::NODE_STROKE));
    }

    #[test]
    fn test_edge_labels_at_midpoint() {
        let scene = scene_of(&one_step());
        let Some(Primitive::Label(label)) = scene.get("label:edge:r->m") else {
            panic!("missing label");
        };
        assert_eq!(label.content, "0.500");
        assert_eq!(label.color, palette::MIDDLE);
        assert_eq!(label.font_weight, 600);
        assert_eq!(label.dy, -5.0);
        assert_eq!(label.position, Position::new(300.0, 300.0));
    }

    #[test]
    fn test_node_text() {
        let scene = scene_of(&one_step());
        let root = scene.nodes().next().unwrap();
        assert_eq!(root.key, "node:r");
        assert_eq!(root.labels[0].content, "100.0");
        assert_eq!(root.labels[1].content, "(4.500)");
        assert_eq!(root.hover.title, "Step 0");
    }

    #[test]
    fn test_dangling_endpoint_at_origin() {
        let mut dataset = one_step();
        dataset.edges.push(edge("r", "ghost", Direction::Up, 0.1));

        let scene = scene_of(&dataset);
        let Some(Primitive::Line(line)) = scene.get("edge:r->ghost") else {
            panic!("dangling edge not drawn");
        };
        assert_eq!(line.to, Position::ORIGIN);
        assert_eq!(line.from, Position::new(50.0, 300.0));
        assert_eq!(scene.nodes().count(), 4);
    }

    #[test]
    fn test_unknown_direction_is_neutral() {
        assert_eq!(direction_color(Direction::Other), palette::NEUTRAL);
    }

    #[test]
    fn test_oversize_message() {
        let dataset = TreeDataset {
            nodes: vec![node("r", 0)],
            edges: vec![],
            tree_params: TreeParams {
                n: 60,
                final_price: 1.0,
            },
        };
        let scene = scene_of(&dataset);

        assert_eq!(scene.len(), 2);
        let Some(Primitive::Label(title)) = scene.get("message:title") else {
            panic!("missing message");
        };
        assert_eq!(
            title.content,
            "N > 50, Tree too large for visualization (1 nodes)"
        );
        assert_eq!(title.position, Position::new(500.0, 300.0));
        assert_eq!(scene.nodes().count(), 0);
    }
}
