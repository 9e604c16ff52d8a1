use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{
	Architecture, CompressedInput, DiagramEdge, DiagramNode, GraphModel, LayerLabel, NodeId,
};

/// Input layers wider than this are drawn compressed when compression is on.
pub const COMPRESSION_THRESHOLD: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
	/// "Input layer", "3 neurons", "Output layer".
	#[default]
	Role,
	/// "Hidden Layer ∈ ℝ³".
	Dimension,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
	pub show_bias: bool,
	/// Number of representative nodes for a wide input layer.
	pub input_compression: Option<usize>,
	pub label_style: LabelStyle,
}

/// Builds the node, edge and label sets for `architecture`.
///
/// Keys depend only on layer and node indices, so two builds of the same
/// architecture can be matched element by element. Edge weights are drawn
/// from `rng` and carry no meaning.
pub fn build<R: Rng>(
	architecture: &Architecture,
	options: BuildOptions,
	rng: &mut R,
) -> GraphModel {
	let last = architecture.len() - 1;
	let compressed_input = options
		.input_compression
		.filter(|&k| k > 0 && architecture.width(0) > COMPRESSION_THRESHOLD)
		.map(|representatives| CompressedInput {
			true_width: architecture.width(0),
			representatives,
		});

	let drawn = |layer: usize| match compressed_input {
		Some(c) if layer == 0 => c.representatives,
		_ => architecture.width(layer),
	};

	let nodes = (0..=last)
		.flat_map(|layer| {
			(0..drawn(layer)).map(move |index| DiagramNode {
				id: NodeId::new(layer, index),
				is_bias: options.show_bias && index == 0 && layer != last,
				representative: layer == 0 && compressed_input.is_some(),
			})
		})
		.collect();

	let mut edges = Vec::with_capacity(architecture.connection_count().min(1 << 16));
	for layer in 0..last {
		for target in 0..drawn(layer + 1) {
			// index 0 of a hidden layer is its bias unit, which has no inputs
			if !options.show_bias && target == 0 && layer + 1 != last {
				continue;
			}
			for source in 0..drawn(layer) {
				edges.push(DiagramEdge {
					source: NodeId::new(layer, source),
					target: NodeId::new(layer + 1, target),
					weight: rng.gen_range(-1.0..=1.0),
				});
			}
		}
	}
	edges.sort_by(|a, b| (a.source, a.target).cmp(&(b.source, b.target)));

	let labels = architecture
		.widths()
		.iter()
		.enumerate()
		.map(|(layer, &width)| LayerLabel {
			layer,
			text: label_text(options.label_style, layer, last, width),
		})
		.collect();

	GraphModel {
		nodes,
		edges,
		labels,
		compressed_input,
	}
}

fn label_text(style: LabelStyle, layer: usize, last: usize, width: usize) -> String {
	match style {
		LabelStyle::Role if layer == 0 => "Input layer".into(),
		LabelStyle::Role if layer == last => "Output layer".into(),
		LabelStyle::Role if width == 1 => "1 neuron".into(),
		LabelStyle::Role => format!("{width} neurons"),
		LabelStyle::Dimension => {
			let role = if layer == 0 {
				"Input"
			} else if layer == last {
				"Output"
			} else {
				"Hidden"
			};
			format!("{role} Layer ∈ ℝ{}", superscript(width))
		}
	}
}

fn superscript(n: usize) -> String {
	const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
	n.to_string()
		.chars()
		.filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
		.collect()
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn arch(widths: &[usize]) -> Architecture {
		Architecture::new(widths.to_vec()).unwrap()
	}

	fn with_bias() -> BuildOptions {
		BuildOptions {
			show_bias: true,
			..Default::default()
		}
	}

	fn keys(model: &GraphModel) -> (Vec<String>, Vec<String>, Vec<String>) {
		(
			model.nodes.iter().map(|n| n.key()).collect(),
			model.edges.iter().map(|e| e.key()).collect(),
			model.labels.iter().map(|l| l.key()).collect(),
		)
	}

	#[test]
	fn counts_match_full_bipartite_graph() {
		let mut rng = SmallRng::seed_from_u64(7);
		for widths in [vec![1, 1], vec![4, 3, 2], vec![2, 6, 6, 6, 1], vec![5, 1, 5]] {
			let a = arch(&widths);
			let model = build(&a, with_bias(), &mut rng);
			assert_eq!(model.nodes.len(), widths.iter().sum::<usize>());
			assert_eq!(model.edges.len(), a.connection_count());
			assert_eq!(model.labels.len(), widths.len());
		}
	}

	#[test]
	fn four_three_two_with_bias() {
		let mut rng = SmallRng::seed_from_u64(1);
		let model = build(&arch(&[4, 3, 2]), with_bias(), &mut rng);
		assert_eq!(model.nodes.len(), 9);
		assert_eq!(model.edges.len(), 18);
		let bias: Vec<String> = model.nodes.iter().filter(|n| n.is_bias).map(|n| n.key()).collect();
		assert_eq!(bias, vec!["0_0", "1_0"]);
	}

	#[test]
	fn hidden_bias_targets_are_dropped_without_bias() {
		let mut rng = SmallRng::seed_from_u64(2);
		let a = arch(&[3, 4, 4, 2]);
		let model = build(&a, BuildOptions::default(), &mut rng);
		for edge in &model.edges {
			assert!(edge.target.index != 0 || a.is_output(edge.target.layer));
		}
		// 3*3 + 4*3 + 4*2
		assert_eq!(model.edges.len(), 29);
		assert!(model.nodes.iter().all(|n| !n.is_bias));
	}

	#[test]
	fn single_unit_chain_keeps_only_output_edge() {
		let mut rng = SmallRng::seed_from_u64(3);
		let model = build(&arch(&[1, 1, 1]), BuildOptions::default(), &mut rng);
		assert_eq!(model.nodes.len(), 3);
		let edges: Vec<String> = model.edges.iter().map(|e| e.key()).collect();
		assert_eq!(edges, vec!["1_0-2_0"]);
	}

	#[test]
	fn keys_are_stable_across_builds() {
		let a = arch(&[3, 5, 2]);
		let first = build(&a, with_bias(), &mut SmallRng::seed_from_u64(10));
		let second = build(&a, with_bias(), &mut SmallRng::seed_from_u64(11));
		assert_eq!(keys(&first), keys(&second));
		assert_ne!(first.edges[0].weight, second.edges[0].weight);
	}

	#[test]
	fn weights_stay_in_unit_range() {
		let model = build(&arch(&[6, 6, 6]), with_bias(), &mut SmallRng::seed_from_u64(4));
		assert!(model.edges.iter().all(|e| (-1.0..=1.0).contains(&e.weight)));
	}

	#[test]
	fn growing_a_layer_preserves_existing_keys() {
		let mut rng = SmallRng::seed_from_u64(5);
		let before = build(&arch(&[1, 1, 1]), BuildOptions::default(), &mut rng);
		let after = build(&arch(&[1, 2, 1]), BuildOptions::default(), &mut rng);
		let (old_nodes, _, _) = keys(&before);
		let (new_nodes, _, _) = keys(&after);
		assert!(old_nodes.iter().all(|k| new_nodes.contains(k)));
		assert!(new_nodes.contains(&"1_1".to_string()));
		assert_eq!(new_nodes.len(), 4);
	}

	#[test]
	fn wide_input_is_compressed() {
		let options = BuildOptions {
			show_bias: true,
			input_compression: Some(5),
			..Default::default()
		};
		let model = build(&arch(&[784, 4, 10]), options, &mut SmallRng::seed_from_u64(6));
		assert_eq!(
			model.compressed_input,
			Some(CompressedInput {
				true_width: 784,
				representatives: 5
			})
		);
		assert_eq!(model.nodes.iter().filter(|n| n.id.layer == 0).count(), 5);
		assert!(model.nodes.iter().filter(|n| n.id.layer == 0).all(|n| n.representative));
		assert_eq!(model.edges.len(), 5 * 4 + 4 * 10);
	}

	#[test]
	fn narrow_input_ignores_compression() {
		let options = BuildOptions {
			show_bias: true,
			input_compression: Some(5),
			..Default::default()
		};
		let model = build(&arch(&[8, 2]), options, &mut SmallRng::seed_from_u64(8));
		assert_eq!(model.compressed_input, None);
		assert_eq!(model.nodes.len(), 10);
	}

	#[test]
	fn label_text_by_role() {
		let mut rng = SmallRng::seed_from_u64(9);
		let model = build(&arch(&[2, 1, 3, 1]), BuildOptions::default(), &mut rng);
		let texts: Vec<&str> = model.labels.iter().map(|l| l.text.as_str()).collect();
		assert_eq!(texts, vec!["Input layer", "1 neuron", "3 neurons", "Output layer"]);

		let options = BuildOptions {
			label_style: LabelStyle::Dimension,
			..Default::default()
		};
		let model = build(&arch(&[784, 12, 10]), options, &mut SmallRng::seed_from_u64(9));
		assert_eq!(model.labels[0].text, "Input Layer ∈ ℝ⁷⁸⁴");
		assert_eq!(model.labels[1].text, "Hidden Layer ∈ ℝ¹²");
		assert_eq!(model.labels[2].text, "Output Layer ∈ ℝ¹⁰");
	}

	fn widths() -> impl Strategy<Value = Vec<usize>> {
		(1usize..=100, prop::collection::vec(1usize..=64, 1..=4), 1usize..=10).prop_map(
			|(input, hidden, output)| {
				let mut widths = vec![input];
				widths.extend(hidden);
				widths.push(output);
				widths
			},
		)
	}

	proptest! {
		#[test]
		fn counts_and_bias_filter_hold_for_any_architecture(
			widths in widths(),
			show_bias in any::<bool>(),
			compression in prop::option::of(1usize..=8),
			seed in any::<u64>(),
		) {
			let a = arch(&widths);
			let options = BuildOptions {
				show_bias,
				input_compression: compression,
				..Default::default()
			};
			let model = build(&a, options, &mut SmallRng::seed_from_u64(seed));
			let last = widths.len() - 1;

			let drawn: Vec<usize> = widths
				.iter()
				.enumerate()
				.map(|(layer, &w)| match compression {
					Some(k) if layer == 0 && w > COMPRESSION_THRESHOLD => k,
					_ => w,
				})
				.collect();
			let expected_edges: usize = (0..last)
				.map(|l| {
					let skipped = usize::from(!show_bias && l + 1 != last);
					drawn[l] * (drawn[l + 1] - skipped)
				})
				.sum();
			prop_assert_eq!(model.nodes.len(), drawn.iter().sum::<usize>());
			prop_assert_eq!(model.edges.len(), expected_edges);
			prop_assert_eq!(model.labels.len(), widths.len());

			for edge in &model.edges {
				prop_assert!((-1.0..=1.0).contains(&edge.weight));
				if !show_bias {
					prop_assert!(edge.target.index != 0 || edge.target.layer == last);
				}
			}
			for node in &model.nodes {
				let bias_slot = node.id.index == 0 && node.id.layer != last;
				prop_assert_eq!(node.is_bias, show_bias && bias_slot);
			}

			let (nodes, edges, _) = keys(&model);
			prop_assert_eq!(nodes.iter().collect::<HashSet<_>>().len(), nodes.len());
			prop_assert_eq!(edges.iter().collect::<HashSet<_>>().len(), edges.len());
		}
	}
}
