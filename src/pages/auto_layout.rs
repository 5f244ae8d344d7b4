use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::flow::{
	EdgeCurve, FlowCanvas, FlowData, FlowEdge, FlowNode, LayoutDirection, LayoutOptions,
	LayoutStrategy, NodeKind, Position,
};

/// Four-step sample; positions are placeholders replaced by the layout pass.
pub fn sample_pipeline_data() -> FlowData {
	let origin = Position::default();
	let nodes = vec![
		FlowNode::new("start", "Start", origin).with_kind(NodeKind::Input),
		FlowNode::new("learn", "Learn", origin),
		FlowNode::new("build", "Build", origin),
		FlowNode::new("finish", "Finish", origin).with_kind(NodeKind::Output),
	];
	let edges = vec![
		FlowEdge::new("e-start-learn", "start", "learn")
			.animated(true)
			.with_curve(EdgeCurve::SmoothStep),
		FlowEdge::new("e-learn-build", "learn", "build").with_curve(EdgeCurve::SmoothStep),
		FlowEdge::new("e-build-finish", "build", "finish")
			.animated(true)
			.with_curve(EdgeCurve::SmoothStep),
	];
	FlowData { nodes, edges }
}

pub fn sample_layout() -> LayoutOptions {
	LayoutOptions {
		direction: LayoutDirection::LeftRight,
		..Default::default()
	}
}

fn sized(mut data: FlowData, options: &LayoutOptions) -> FlowData {
	for node in &mut data.nodes {
		node.style.width = options.node_width;
		node.style.height = options.node_height;
	}
	data
}

/// Roadmap laid out automatically, left to right.
#[component]
pub fn AutoLayout() -> impl IntoView {
	let options = sample_layout();
	let graph_data = {
		let options = options.clone();
		Signal::derive(move || sized(sample_pipeline_data(), &options))
	};

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
				<FlowCanvas data=graph_data strategy=LayoutStrategy::Auto(options.clone()) fullscreen=true />
				<div class="graph-overlay">
					<h1>"🗺️ Goals Roadmap"</h1>
					<p class="subtitle">"Automatic layered layout"</p>
					<A href="/">"Hand-placed version"</A>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow::layout_nodes;

	#[test]
	fn start_ranks_before_finish_left_to_right() {
		let options = sample_layout();
		let data = sized(sample_pipeline_data(), &options);
		let out = layout_nodes(&data.nodes, &data.edges, &options);
		let x = |id: &str| out.iter().find(|n| n.id == id).map(|n| n.position.x).unwrap();
		assert!(x("start") < x("finish"));
		assert!(x("start") < x("learn") && x("learn") < x("build"));
	}

	#[test]
	fn every_sample_node_gets_a_distinct_position() {
		let options = sample_layout();
		let data = sample_pipeline_data();
		let out = layout_nodes(&data.nodes, &data.edges, &options);
		assert_eq!(out.len(), 4);
		for (i, a) in out.iter().enumerate() {
			for b in &out[i + 1..] {
				assert_ne!(a.position, b.position);
			}
		}
	}
}
