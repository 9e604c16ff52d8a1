//! In-page training collaborator for the diagram pages.

pub mod dataset;
pub mod export;
pub mod functions;
pub mod model;
pub mod run;

pub use dataset::{InMemoryDataset, LabeledImageDataset};
pub use functions::TargetFunction;
pub use model::{DenseModel, ModelSpec, Sample, TrainableModel};
pub use run::{Generation, TrainingPlan, TrainingRun};
