use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
	Info,
	Error,
}

impl Level {
	fn class(self) -> &'static str {
		match self {
			Level::Info => "notification info",
			Level::Error => "notification error",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
	pub level: Level,
	pub message: String,
}

impl Notice {
	pub fn info(message: impl Into<String>) -> Self {
		Self {
			level: Level::Info,
			message: message.into(),
		}
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self {
			level: Level::Error,
			message: message.into(),
		}
	}
}

/// Dismissible banner; renders nothing while `notice` is `None`.
#[component]
pub fn Notification(notice: RwSignal<Option<Notice>>) -> impl IntoView {
	move || {
		notice.get().map(|n| {
			view! {
				<div class=n.level.class() role="status">
					<span>{n.message}</span>
					<button class="dismiss" on:click=move |_| notice.set(None)>
						"×"
					</button>
				</div>
			}
		})
	}
}
