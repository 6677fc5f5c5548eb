use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

pub const BANNER_ROTATION: &str = "banner-rotation";
pub const CURATION_ROTATION: &str = "curation-rotation";
pub const CURATION_RESUME: &str = "curation-resume";
pub const MAP_LOAD_TIMEOUT: &str = "map-load-timeout";

/// One-shot named timers. Starting an id that is already armed replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOperation {
    Start { id: String, millis: u64 },
    Cancel { id: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerOutput {
    Fired,
    Cancelled,
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: 'static + Send,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    /// Sends `event` back once the timer fires. A cancelled timer sends
    /// nothing.
    pub fn start(&self, id: &str, millis: u64, event: Ev) {
        let ctx = self.context.clone();
        let operation = TimerOperation::Start {
            id: id.to_string(),
            millis,
        };
        self.context.spawn(async move {
            if ctx.request_from_shell(operation).await == TimerOutput::Fired {
                ctx.update_app(event);
            }
        });
    }

    pub fn cancel(&self, id: &str) {
        let ctx = self.context.clone();
        let operation = TimerOperation::Cancel { id: id.to_string() };
        self.context.spawn(async move {
            ctx.notify_shell(operation).await;
        });
    }
}
