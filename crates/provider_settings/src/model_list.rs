use std::rc::Rc;

use gpui::{
    App, ClickEvent, ElementId, Entity, InteractiveElement as _, IntoElement, ParentElement as _,
    RenderOnce, SharedString, Styled as _, Window, prelude::FluentBuilder as _,
};
use gpui_component::{
    ActiveTheme as _, IconName, Sizable as _,
    button::{Button, ButtonVariants as _},
    h_flex,
    input::{Input, InputState},
    label::Label,
    v_flex,
};

use crate::{ModelListOptions, ModelProvider, tr};

/// Emitted by the provider form when the fetch models button is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelListEvent {
    FetchModels(ModelProvider),
}

/// Add a model id to the list, ignoring blanks and duplicates.
///
/// Returns `None` if the list is unchanged.
pub fn add_model(models: &[SharedString], model: &str) -> Option<Vec<SharedString>> {
    let model = model.trim();
    if model.is_empty() || models.iter().any(|m| m.as_str() == model) {
        return None;
    }

    let mut models = models.to_vec();
    models.push(SharedString::from(model.to_string()));
    Some(models)
}

/// Select the enabled models of a provider.
///
/// The selected ids are shown as removable tags, new ids are typed in the input.
#[derive(IntoElement)]
pub struct ModelListSelect {
    id: ElementId,
    models: Vec<SharedString>,
    options: ModelListOptions,
    input: Entity<InputState>,
    on_change: Option<Rc<dyn Fn(&Vec<SharedString>, &mut Window, &mut App)>>,
    on_fetch: Option<Rc<dyn Fn(&ClickEvent, &mut Window, &mut App)>>,
}

impl ModelListSelect {
    pub fn new(
        id: impl Into<ElementId>,
        input: &Entity<InputState>,
        models: Vec<SharedString>,
        options: ModelListOptions,
    ) -> Self {
        Self {
            id: id.into(),
            models,
            options,
            input: input.clone(),
            on_change: None,
            on_fetch: None,
        }
    }

    /// Called with the whole new list when a model is added or removed.
    pub fn on_change(
        mut self,
        f: impl Fn(&Vec<SharedString>, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    /// Called when the fetch button is clicked, only shown with `show_model_fetcher`.
    pub fn on_fetch(mut self, f: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static) -> Self {
        self.on_fetch = Some(Rc::new(f));
        self
    }
}

impl RenderOnce for ModelListSelect {
    fn render(self, _: &mut Window, cx: &mut App) -> impl IntoElement {
        let models = self.models.clone();
        let on_change = self.on_change.clone();
        let input = self.input.clone();

        v_flex()
            .id(self.id)
            .gap_2()
            .w_full()
            .child(
                h_flex()
                    .flex_wrap()
                    .gap_1()
                    .when(self.models.is_empty(), |this| {
                        this.child(
                            Label::new(
                                self.options
                                    .not_found_content
                                    .clone()
                                    .unwrap_or_else(|| tr("setting.llm.modelList.empty")),
                            )
                            .text_sm()
                            .text_color(cx.theme().muted_foreground),
                        )
                    })
                    .children(self.models.iter().enumerate().map(|(ix, model)| {
                        let models = models.clone();
                        let on_change = on_change.clone();

                        h_flex()
                            .gap_1()
                            .pl_2()
                            .rounded(cx.theme().radius)
                            .bg(cx.theme().secondary)
                            .text_xs()
                            .child(model.clone())
                            .child(
                                Button::new(("remove-model", ix))
                                    .icon(IconName::Close)
                                    .ghost()
                                    .xsmall()
                                    .on_click(move |_, window, cx| {
                                        let mut models = models.clone();
                                        models.remove(ix);
                                        if let Some(on_change) = &on_change {
                                            on_change(&models, window, cx);
                                        }
                                    }),
                            )
                    })),
            )
            .child(
                h_flex()
                    .gap_2()
                    .child(
                        Input::new(&self.input)
                            .small()
                            .cleanable(true)
                            .flex_1(),
                    )
                    .child(
                        Button::new("add-model")
                            .icon(IconName::Plus)
                            .ghost()
                            .small()
                            .on_click(move |_, window, cx| {
                                let value = input.read(cx).value();
                                let Some(models) = add_model(&models, &value) else {
                                    return;
                                };
                                input.update(cx, |input, cx| input.set_value("", window, cx));
                                if let Some(on_change) = &on_change {
                                    on_change(&models, window, cx);
                                }
                            }),
                    )
                    .when_some(
                        self.on_fetch.filter(|_| self.options.show_model_fetcher),
                        |this, on_fetch| {
                            this.child(
                                Button::new("fetch-models")
                                    .small()
                                    .label(tr("setting.llm.modelList.fetch"))
                                    .on_click(move |event, window, cx| on_fetch(event, window, cx)),
                            )
                        },
                    ),
            )
            .when(self.options.azure_deploy_name, |this| {
                this.child(
                    Label::new(tr("setting.llm.modelList.azureDeployName"))
                        .text_xs()
                        .text_color(cx.theme().muted_foreground),
                )
            })
    }
}
