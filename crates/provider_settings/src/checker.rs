use std::rc::Rc;

use anyhow::Result;
use gpui::{
    App, Context, IntoElement, ParentElement as _, Render, SharedString, Styled as _, Task, Window,
    prelude::FluentBuilder as _,
};
use gpui_component::{
    ActiveTheme as _, Disableable as _, Icon, IconName, Sizable as _,
    button::{Button, ButtonVariants as _},
    h_flex,
};

use crate::{ModelProvider, tr};

/// Probes a provider with a model, e.g. by sending a tiny chat request.
pub trait ConnectivityCheck: 'static {
    fn check(&self, provider: ModelProvider, model: SharedString, cx: &mut App) -> Task<Result<()>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckStatus {
    #[default]
    Idle,
    Checking,
    Passed,
    Failed(SharedString),
}

/// The connectivity checker shown at the bottom of a provider form.
///
/// It never writes settings, the result is only displayed.
pub struct Checker {
    provider: ModelProvider,
    model: Option<SharedString>,
    check: Option<Rc<dyn ConnectivityCheck>>,
    status: CheckStatus,
    _task: Task<()>,
}

impl Checker {
    pub fn new(provider: ModelProvider, model: Option<SharedString>) -> Self {
        Self {
            provider,
            model,
            check: None,
            status: CheckStatus::Idle,
            _task: Task::ready(()),
        }
    }

    pub fn set_connectivity_check(&mut self, check: Rc<dyn ConnectivityCheck>) {
        self.check = Some(check);
    }

    pub fn status(&self) -> &CheckStatus {
        &self.status
    }

    /// Start a check, replacing the one in flight.
    pub fn check(&mut self, cx: &mut Context<Self>) {
        let (Some(check), Some(model)) = (self.check.clone(), self.model.clone()) else {
            self.status = CheckStatus::Failed(tr("setting.llm.checker.unavailable"));
            cx.notify();
            return;
        };

        tracing::debug!("checking {} with model {}", self.provider, model);
        self.status = CheckStatus::Checking;
        let task = check.check(self.provider, model, cx);
        self._task = cx.spawn(async move |this, cx| {
            let result = task.await;
            _ = this.update(cx, |this, cx| {
                this.status = match result {
                    Ok(()) => CheckStatus::Passed,
                    Err(err) => {
                        tracing::debug!("check failed for {}: {:?}", this.provider, err);
                        CheckStatus::Failed(err.to_string().into())
                    }
                };
                cx.notify();
            });
        });
        cx.notify();
    }
}

impl Render for Checker {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let checking = self.status == CheckStatus::Checking;

        h_flex()
            .gap_2()
            .items_center()
            .map(|this| match &self.status {
                CheckStatus::Idle | CheckStatus::Checking => this,
                CheckStatus::Passed => this.child(
                    h_flex()
                        .gap_1()
                        .text_sm()
                        .text_color(cx.theme().success)
                        .child(Icon::new(IconName::CircleCheck).small())
                        .child(tr("setting.llm.checker.pass")),
                ),
                CheckStatus::Failed(message) => this.child(
                    h_flex()
                        .gap_1()
                        .text_sm()
                        .text_color(cx.theme().danger)
                        .child(Icon::new(IconName::CircleX).small())
                        .child(message.clone()),
                ),
            })
            .child(
                Button::new("check")
                    .small()
                    .loading(checking)
                    .disabled(checking)
                    .label(tr("setting.llm.checker.button"))
                    .on_click(cx.listener(|this, _, _, cx| this.check(cx))),
            )
    }
}
