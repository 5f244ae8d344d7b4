use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::flow::{FlowCanvas, FlowData, FlowEdge, FlowNode, NodeKind, NodeStyle, Position};

fn goal_style(background: &str, border: &str) -> NodeStyle {
	NodeStyle {
		background: background.into(),
		border_color: border.into(),
		border_width: 2.0,
		border_radius: 10.0,
		font_size: 12.0,
		bold: false,
		width: 160.0,
		height: 70.0,
	}
}

fn milestone_style(background: &str, border: &str, border_width: f64) -> NodeStyle {
	NodeStyle {
		border_width,
		border_radius: 15.0,
		bold: true,
		width: 180.0,
		height: 80.0,
		..goal_style(background, border)
	}
}

fn link(source: &str, target: &str, stroke: &str, width: f64) -> FlowEdge {
	FlowEdge::new(format!("e-{source}-{target}"), source, target)
		.animated(true)
		.with_stroke(stroke, width)
}

/// The career roadmap with hand-placed nodes.
pub fn goals_roadmap_data() -> FlowData {
	let nodes = vec![
		FlowNode::new("start", "🎯 Current State\nDefine Starting Point", Position::new(250.0, 0.0))
			.with_kind(NodeKind::Input)
			.with_style(NodeStyle {
				width: 180.0,
				height: 80.0,
				..goal_style("#e3f2fd", "#1976d2")
			}),
		FlowNode::new("goal1", "📚 Learn Fundamentals\n(Month 1-2)", Position::new(100.0, 150.0))
			.with_style(goal_style("#f3e5f5", "#7b1fa2")),
		FlowNode::new("goal2", "🛠️ Build First Project\n(Month 3-4)", Position::new(400.0, 150.0))
			.with_style(goal_style("#e8f5e8", "#388e3c")),
		FlowNode::new("goal3", "🤝 Network & Collaborate\n(Month 4-6)", Position::new(50.0, 300.0))
			.with_style(goal_style("#fff3e0", "#f57c00")),
		FlowNode::new("goal4", "🚀 Advanced Skills\n(Month 6-9)", Position::new(250.0, 300.0))
			.with_style(goal_style("#fce4ec", "#c2185b")),
		FlowNode::new("goal5", "💼 Portfolio & Resume\n(Month 9-10)", Position::new(450.0, 300.0))
			.with_style(goal_style("#e0f2f1", "#00695c")),
		FlowNode::new("milestone", "🎉 Major Milestone\nJob/Certification", Position::new(250.0, 450.0))
			.with_style(milestone_style("#fff8e1", "#ff8f00", 3.0)),
		FlowNode::new("final", "🏆 Ultimate Goal\nCareer Success", Position::new(250.0, 600.0))
			.with_kind(NodeKind::Output)
			.with_style(milestone_style("#f1f8e9", "#558b2f", 3.0)),
	];

	let edges = vec![
		link("start", "goal1", "#1976d2", 2.0),
		link("start", "goal2", "#1976d2", 2.0),
		link("goal1", "goal3", "#7b1fa2", 2.0),
		link("goal1", "goal4", "#7b1fa2", 2.0),
		link("goal2", "goal4", "#388e3c", 2.0),
		link("goal2", "goal5", "#388e3c", 2.0),
		link("goal3", "milestone", "#f57c00", 2.0),
		link("goal4", "milestone", "#c2185b", 2.0),
		link("goal5", "milestone", "#00695c", 2.0),
		link("milestone", "final", "#ff8f00", 3.0),
	];

	FlowData { nodes, edges }
}

/// Static goals roadmap.
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(goals_roadmap_data);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<FlowCanvas data=graph_data fullscreen=true />
				<div class="graph-overlay">
					<h1>"🗺️ Goals Roadmap"</h1>
					<p class="subtitle">"Interactive career development journey"</p>
					<A href="/auto">"Auto-layout version"</A>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn roadmap_edges_reference_existing_nodes() {
		let data = goals_roadmap_data();
		let ids: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(data.nodes.len(), 8);
		assert_eq!(data.edges.len(), 10);
		for edge in &data.edges {
			assert!(ids.contains(edge.source.as_str()), "{}", edge.id);
			assert!(ids.contains(edge.target.as_str()), "{}", edge.id);
		}
	}

	#[test]
	fn roadmap_has_one_source_and_one_sink() {
		let data = goals_roadmap_data();
		let kinds: Vec<_> = data.nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
		assert_eq!(kinds.first(), Some(&("start", NodeKind::Input)));
		assert_eq!(kinds.last(), Some(&("final", NodeKind::Output)));
		assert!(data.edges.iter().all(|e| e.animated && !e.marker_end));
	}
}
