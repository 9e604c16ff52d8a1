use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Saves `contents` as a JSON file through a temporary object URL.
pub fn download_json(file_name: &str, contents: &str) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| JsValue::from_str("<a> is not an anchor"))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	Url::revoke_object_url(&url)?;
	info!("downloaded {file_name} ({} bytes)", contents.len());
	Ok(())
}

/// Top bar with a home link, the page title and an optional model download.
#[component]
pub fn Header(
	#[prop(into)] title: String,
	/// Serialised model; the download button is disabled while `None`.
	#[prop(optional, into)]
	export: Option<Signal<Option<String>>>,
	#[prop(default = "model.json")] file_name: &'static str,
) -> impl IntoView {
	let download = export.map(|export| {
		let disabled = move || export.with(Option::is_none);
		let on_click = move |_| {
			export.with(|json| {
				if let Some(json) = json {
					if let Err(e) = download_json(file_name, json) {
						warn!("model download failed: {e:?}");
					}
				}
			})
		};
		view! {
			<button class="header-button" prop:disabled=disabled on:click=on_click>
				"Download model"
			</button>
		}
	});

	view! {
		<nav class="header">
			<div class="header-left">
				<a href="/">"Home"</a>
			</div>
			<div class="header-title">
				<h2>{title}</h2>
			</div>
			<div class="header-right">{download}</div>
		</nav>
	}
}
