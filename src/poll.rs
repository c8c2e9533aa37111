use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A periodic task that runs for as long as its handle is alive.
///
/// The first tick fires immediately, subsequent ones every `period`. Dropping the handle aborts
/// the task, including a tick that is still waiting on the network.
#[derive(Debug)]
pub struct PollHandle {
    name: String,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        log::debug!("starting poller {} every {:?}", name, period);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            /* a slow tick delays the schedule instead of triggering a burst of catch-up fetches */
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });

        PollHandle { name, task }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        log::debug!("stopping poller {}", self.name);
        self.task.abort();
    }
}
