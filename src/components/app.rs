use super::spawner_view::SpawnerView;
use crate::model::{CanvasState, ViewSettings};
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    // Real bounds arrive via a Resized dispatch once the canvas mounts.
    let canvas_state = use_reducer(|| CanvasState::new(800.0, 600.0));
    let settings = use_state(ViewSettings::default);

    // Load persisted view settings
    {
        let settings = settings.clone();
        use_effect_with((), move |_| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(Some(raw)) = store.get_item("ss_settings") {
                        if let Ok(s) = serde_json::from_str(&raw) {
                            settings.set(s);
                        }
                    }
                }
            }
            || ()
        });
    }
    // Persist view settings changes
    {
        let settings = settings.clone();
        use_effect_with(*settings, move |_| {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    if let Ok(s) = serde_json::to_string(&*settings) {
                        let _ = store.set_item("ss_settings", &s);
                    }
                }
            }
            || ()
        });
    }

    html! { <SpawnerView canvas_state={canvas_state} settings={settings} /> }
}
