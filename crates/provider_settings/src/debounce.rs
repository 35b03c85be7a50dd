use std::time::Duration;

use gpui::{Context, Task};

/// Delay between the last form edit and the settings write.
pub const PROVIDER_FORM_DEBOUNCE: Duration = Duration::from_millis(100);

/// Trailing debounce on the GPUI executor.
///
/// Only one call is pending at a time, scheduling again drops the pending
/// task, which cancels it.
pub struct Debounce {
    delay: Duration,
    pending: Option<Task<()>>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Run `f` on the view once `delay` has elapsed without another call.
    pub fn schedule<V, F>(&mut self, cx: &mut Context<V>, f: F)
    where
        V: 'static,
        F: FnOnce(&mut V, &mut Context<V>) + 'static,
    {
        let delay = self.delay;
        self.pending = Some(cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;
            _ = this.update(cx, |this, cx| f(this, cx));
        }));
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(PROVIDER_FORM_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gpui::{AppContext as _, Context, TestAppContext};

    use super::Debounce;

    struct Recorder {
        debounce: Debounce,
        emitted: Vec<u32>,
    }

    impl Recorder {
        fn push(&mut self, value: u32, cx: &mut Context<Self>) {
            self.debounce
                .schedule(cx, move |this, _| this.emitted.push(value));
        }
    }

    #[gpui::test]
    fn test_debounce_coalesces_calls(cx: &mut TestAppContext) {
        let recorder = cx.new(|_| Recorder {
            debounce: Debounce::default(),
            emitted: vec![],
        });

        recorder.update(cx, |this, cx| this.push(1, cx));
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(60));
        recorder.update(cx, |this, cx| this.push(2, cx));
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(60));
        cx.run_until_parked();
        recorder.read_with(cx, |this, _| assert!(this.emitted.is_empty()));

        cx.executor().advance_clock(Duration::from_millis(50));
        cx.run_until_parked();
        recorder.read_with(cx, |this, _| assert_eq!(this.emitted, vec![2]));

        recorder.update(cx, |this, cx| this.push(3, cx));
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(110));
        cx.run_until_parked();
        recorder.read_with(cx, |this, _| assert_eq!(this.emitted, vec![2, 3]));
    }
}
