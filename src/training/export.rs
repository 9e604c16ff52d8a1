//! "Download model" payload: the trained parameters together with the
//! architecture and the diagram look they were shown with.

use serde::Serialize;

use super::model::DenseModel;
use crate::components::network_diagram::LayoutParams;
use crate::error::TrainingError;

pub const EXPORT_FILE_NAME: &str = "visualnet-model.json";

#[derive(Serialize)]
struct ModelExport<'a> {
	architecture: &'a [usize],
	epochs_trained: usize,
	diagram: &'a LayoutParams,
	model: &'a DenseModel,
}

pub fn export_json(model: &DenseModel, diagram: &LayoutParams) -> Result<String, TrainingError> {
	let export = ModelExport {
		architecture: model.widths(),
		epochs_trained: model.epochs_trained(),
		diagram,
		model,
	};
	Ok(serde_json::to_string_pretty(&export)?)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::network_diagram::Architecture;
	use crate::training::model::{ModelSpec, TrainableModel};

	#[test]
	fn export_bundles_model_and_diagram() {
		let arch = Architecture::new(vec![1, 3, 1]).unwrap();
		let model = DenseModel::new(&ModelSpec::regression(arch), &mut SmallRng::seed_from_u64(1));
		let json = export_json(&model, &LayoutParams::mnist()).unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		assert_eq!(value["architecture"], serde_json::json!([1, 3, 1]));
		assert_eq!(value["epochs_trained"], 0);
		assert_eq!(value["diagram"]["node_shape"], "square");
		assert_eq!(value["diagram"]["positive_color"], "#3b82f6");
		assert_eq!(value["model"]["output"], "regression");
		assert_eq!(value["model"]["layers"].as_array().map(Vec::len), Some(2));
	}

	#[test]
	fn exported_model_loads_back() {
		let arch = Architecture::new(vec![2, 2]).unwrap();
		let mut rng = SmallRng::seed_from_u64(2);
		let model = DenseModel::new(&ModelSpec::classification(arch), &mut rng);
		let json = export_json(&model, &LayoutParams::default()).unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		let back: DenseModel = serde_json::from_value(value["model"].clone()).unwrap();
		assert_eq!(back.widths(), model.widths());
		let (a, b) = (back.predict(&[0.3, -0.7]).unwrap(), model.predict(&[0.3, -0.7]).unwrap());
		assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9));
	}
}
