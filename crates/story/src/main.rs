use gpui::Application;
use gpui_component_assets::Assets;
use llm_provider_settings_story::{LlmSettingsStory, create_new_window, init, load_store};

fn main() {
    let app = Application::new().with_assets(Assets);

    // Parse `cargo run -- <locale>`, e.g. `zh-CN`
    if let Some(locale) = std::env::args().nth(1) {
        llm_provider_settings::set_locale(&locale);
    }

    app.run(move |cx| {
        init(cx);
        cx.activate(true);

        let store = load_store(cx);
        create_new_window(
            "LLM Provider Settings",
            move |window, cx| LlmSettingsStory::view(store, window, cx),
            cx,
        );
    });
}
