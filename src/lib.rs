//! Leptos client-side app wiring and routes.

use getrandom as _;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod architecture;
mod components;
mod error;
mod pages;
mod training;

pub use crate::error::{ArchitectureError, TrainingError};
pub use crate::pages::mnist::DigitDataset;
pub use crate::training::{InMemoryDataset, LabeledImageDataset, Sample};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::mlp::Mlp;
use crate::pages::mnist::Mnist;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router for the landing page, the two playgrounds and 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="VisualNet" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/mlp") view=Mlp />
				<Route path=path!("/mnist") view=Mnist />
			</Routes>
		</Router>
	}
}
