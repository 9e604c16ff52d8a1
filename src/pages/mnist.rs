use std::sync::Arc;

use leptos::prelude::*;
use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::{LayerCountControl, drawable_architecture};
use crate::architecture::ArchitectureState;
use crate::components::controls::{Slider, Toggle};
use crate::components::header::Header;
use crate::components::network_diagram::{LayoutParams, NetworkDiagram, ViewportPolicy};
use crate::components::notification::{Notice, Notification};
use crate::components::probability_bars::ProbabilityBars;
use crate::error::TrainingError;
use crate::training::dataset::{DIGIT_CLASSES, accuracy};
use crate::training::export::{EXPORT_FILE_NAME, export_json};
use crate::training::model::EpochMetrics;
use crate::training::run::drive;
use crate::training::{
	DenseModel, Generation, LabeledImageDataset, ModelSpec, TrainableModel, TrainingPlan,
	TrainingRun,
};

const MAX_EPOCHS: usize = 2000;
const MAX_BATCH_SIZE: usize = 128;

/// Digit images made available to the page through context.
#[derive(Clone)]
pub struct DigitDataset(pub Arc<dyn LabeledImageDataset + Send + Sync>);

/// Digit classifier page: a 784-input network drawn with a compressed input
/// layer, with class probabilities for a held-out image.
#[component]
pub fn Mnist() -> impl IntoView {
	let dataset = use_context::<DigitDataset>();

	let state = RwSignal::new(ArchitectureState::mnist());
	let architecture = drawable_architecture(state);
	let show_bias = RwSignal::new(true);
	let params = Memo::new(move |_| LayoutParams::mnist().with_bias(show_bias.get()));

	let batch_size = RwSignal::new(32usize);
	let epochs = RwSignal::new(50usize);
	let probabilities = RwSignal::new(vec![0.0; DIGIT_CLASSES]);
	let progress = RwSignal::new(None::<EpochMetrics>);
	let training = RwSignal::new(false);
	let export = RwSignal::new(None::<String>);
	let notice = RwSignal::new(None::<Notice>);

	let generation = Generation::default();
	let generation_reset = generation.clone();
	Effect::new(move |_| {
		architecture.track();
		generation_reset.bump();
		probabilities.set(vec![0.0; DIGIT_CLASSES]);
		progress.set(None);
		training.set(false);
		export.set(None);
	});

	let on_train = move |_| {
		let Some(DigitDataset(ref data)) = dataset else {
			notice.set(Some(Notice::error(TrainingError::DatasetUnavailable.to_string())));
			return;
		};
		let seed: u64 = rand::random();
		let spec = ModelSpec::classification(architecture.get_untracked());
		let model = DenseModel::new(&spec, &mut SmallRng::seed_from_u64(seed));
		let plan = TrainingPlan::digits(epochs.get_untracked(), batch_size.get_untracked());
		let run = match TrainingRun::new(model, data.train().to_vec(), plan, seed) {
			Ok(run) => run,
			Err(e) => {
				notice.set(Some(Notice::error(e.to_string())));
				return;
			}
		};
		info!("training {} on {} digit images", spec.architecture, data.train().len());
		let token = generation.bump();
		training.set(true);
		notice.set(None);

		let preview_image = data
			.test()
			.first()
			.or(data.train().first())
			.map(|s| s.input.clone());
		let test = data.clone();
		drive(
			run,
			token,
			move |model: &DenseModel, metrics| {
				let predicted = preview_image.as_ref().and_then(|input| model.predict(input).ok());
				if let Some(p) = predicted {
					probabilities.set(p);
				}
				progress.set(Some(metrics));
			},
			move |result| {
				training.set(false);
				let outcome = result.and_then(|run| {
					let json = export_json(run.model(), &params.get_untracked())?;
					let acc = if test.test().is_empty() {
						None
					} else {
						Some(accuracy(run.model(), test.test())?)
					};
					Ok((json, acc))
				});
				match outcome {
					Ok((json, acc)) => {
						export.set(Some(json));
						if let Some(acc) = acc {
							let message = format!("Test accuracy {:.1}%", acc * 100.0);
							notice.set(Some(Notice::info(message)));
						}
					}
					Err(e) => notice.set(Some(Notice::error(e.to_string()))),
				}
			},
		);
	};

	let max_neurons = state.with_untracked(|s| s.bounds().max_neurons);
	let neuron_sliders = move || {
		(0..state.with(ArchitectureState::hidden_layer_count))
			.map(|i| {
				view! {
					<Slider
						label=format!("Neurons in layer {}", i + 1)
						value=Signal::derive(move || state.with(|s| s.neuron_count(i).unwrap_or(1)))
						min=1
						max=max_neurons
						on_input=Callback::new(move |n| {
							state.update(|s| *s = s.set_neuron_count(i, n))
						})
					/>
				}
			})
			.collect_view()
	};

	let diagram_policy = ViewportPolicy::Window {
		width_fraction: 1.0 / 3.0,
		height_fraction: 0.8,
	};

	let status = move || {
		progress.get().map(|m| format!("Epoch {} · loss {:.4}", m.epoch, m.loss))
	};

	view! {
		<div class="page">
			<Header title="MNIST Classification" export=export file_name=EXPORT_FILE_NAME />
			<Notification notice=notice />
			<div class="columns">
				<div class="column">
					<ProbabilityBars probabilities=probabilities />
					<p class="status">{status}</p>
				</div>
				<div class="column diagram-column">
					<NetworkDiagram
						architecture=architecture
						params=params
						policy=diagram_policy
					/>
				</div>
				<div class="column settings">
					<h1>"Settings"</h1>
					<LayerCountControl state=state />
					{neuron_sliders}
					<Toggle
						label="Show bias"
						checked=show_bias
						on_toggle=Callback::new(move |v| show_bias.set(v))
					/>
					<Slider
						label="Epochs"
						value=epochs
						min=1
						max=MAX_EPOCHS
						on_input=Callback::new(move |v| epochs.set(v))
					/>
					<button class="train-button" prop:disabled=training on:click=on_train>
						"Train Model"
					</button>
				</div>
			</div>
		</div>
	}
}
