use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use web_sys::Element;

use super::layout::layout;
use super::model::build;
use super::params::LayoutParams;
use super::svg::SvgBackend;
use super::sync::VisualState;
use super::types::{Architecture, GraphModel, Viewport};
use super::viewport::{ResizeWatcher, ViewportPolicy, measure};

struct Diagram {
	backend: SvgBackend,
	visual: VisualState<Option<Element>>,
	built: Option<(Architecture, GraphModel)>,
	params: LayoutParams,
	viewport: Viewport,
}

impl Diagram {
	fn new(backend: SvgBackend) -> Self {
		Self {
			backend,
			visual: VisualState::new(),
			built: None,
			params: LayoutParams::default(),
			viewport: Viewport::DEFAULT,
		}
	}

	/// Rebuilds the graph model only when the structure it depends on
	/// changed; style-only changes keep the current weights.
	fn set_input(&mut self, architecture: Architecture, params: LayoutParams) {
		let stale = match &self.built {
			Some((arch, _)) => {
				*arch != architecture || self.params.build_options() != params.build_options()
			}
			None => true,
		};
		if stale {
			let model = build(&architecture, params.build_options(), &mut rand::thread_rng());
			debug!(
				"built {architecture}: {} nodes, {} edges",
				model.nodes.len(),
				model.edges.len()
			);
			self.built = Some((architecture, model));
		}
		self.params = params;
	}

	fn redraw(&mut self, viewport: Viewport) {
		let Some((ref architecture, ref model)) = self.built else {
			return;
		};
		self.viewport = viewport;
		self.backend.resize(viewport);
		let placed = layout(model, architecture, &self.params, viewport);
		let visual = std::mem::take(&mut self.visual);
		self.visual = visual.sync(&mut self.backend, &placed, &self.params);
		debug!("diagram synced: {:?}", self.visual.report());
	}

	/// Removes every element this diagram created.
	fn clear(self) {
		let Diagram {
			mut backend, visual, ..
		} = self;
		visual.clear(&mut backend);
		debug!("diagram cleared");
	}
}

/// SVG diagram of a layered network that keeps itself in sync with its
/// inputs and with the size of its container.
#[component]
pub fn NetworkDiagram(
	#[prop(into)] architecture: Signal<Architecture>,
	#[prop(into)] params: Signal<LayoutParams>,
	#[prop(optional)] policy: ViewportPolicy,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let diagram: Rc<RefCell<Option<Diagram>>> = Rc::new(RefCell::new(None));
	let watcher = StoredValue::new_local(None::<ResizeWatcher>);
	let teardown = StoredValue::new_local(diagram.clone());

	let container = move || container_ref.get_untracked().map(Element::from);

	let diagram_effect = diagram.clone();
	Effect::new(move |_| {
		let architecture = architecture.get();
		let params = params.get();
		let Some(svg) = svg_ref.get() else {
			return;
		};

		let mut slot = diagram_effect.borrow_mut();
		if slot.is_none() {
			match SvgBackend::new(Element::from(svg)) {
				Ok(backend) => *slot = Some(Diagram::new(backend)),
				Err(e) => {
					warn!("could not set up diagram svg: {e:?}");
					return;
				}
			}
			let diagram_resize = diagram_effect.clone();
			let on_resize = move || {
				let viewport = measure(&policy, container().as_ref());
				if let Some(ref mut d) = *diagram_resize.borrow_mut() {
					if d.viewport != viewport {
						d.redraw(viewport);
					}
				}
			};
			watcher.set_value(Some(ResizeWatcher::attach(container().as_ref(), on_resize)));
		}

		if let Some(ref mut d) = *slot {
			d.set_input(architecture, params);
			d.redraw(measure(&policy, container().as_ref()));
		}
	});

	on_cleanup(move || {
		watcher.set_value(None);
		let _ = teardown.try_with_value(|diagram| {
			if let Some(d) = diagram.borrow_mut().take() {
				d.clear();
			}
		});
	});

	view! {
		<div
			node_ref=container_ref
			class="network-diagram"
			style="position: relative; width: 100%; height: 100%; overflow: hidden;"
		>
			<svg node_ref=svg_ref style="position: absolute; top: 0; left: 0; display: block;" />
		</div>
	}
}
