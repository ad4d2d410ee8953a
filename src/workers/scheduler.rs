//! Minimal periodic job runner on top of tokio.
//!
//! Each job gets its own loop. Jobs are blocking (they talk to SQLite), so
//! every run goes through `spawn_blocking`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Work executed on a fixed interval.
pub trait PeriodicJob: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// One full run. Returns how many items were processed.
    fn run_once(&self) -> anyhow::Result<usize>;
}

#[derive(Debug)]
pub enum JobMessage {
    /// Run now instead of waiting for the next tick.
    RunNow,
    Shutdown,
}

/// Handle to a running job loop.
pub struct JobHandle {
    sender: mpsc::Sender<JobMessage>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn run_now(&self) {
        let _ = self.sender.try_send(JobMessage::RunNow);
    }

    /// Stops the loop and waits for an in-flight run to finish.
    pub async fn shutdown(self) {
        let _ = self.sender.send(JobMessage::Shutdown).await;
        if let Err(e) = self.task.await {
            log::error!("Job loop ended abnormally: {}", e);
        }
    }
}

/// Spawns the loop. The first run happens one `every` after start.
pub fn start_job<J: PeriodicJob>(job: Arc<J>, every: Duration) -> JobHandle {
    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(job_loop(job, every, rx));
    JobHandle { sender: tx, task }
}

async fn job_loop<J: PeriodicJob>(job: Arc<J>, every: Duration, mut rx: mpsc::Receiver<JobMessage>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() completes its first tick immediately
    ticker.tick().await;

    log::info!("Job {} scheduled every {:?}", job.name(), every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            message = rx.recv() => match message {
                Some(JobMessage::RunNow) => {}
                Some(JobMessage::Shutdown) | None => break,
            },
        }
        run(job.clone()).await;
    }
    log::info!("Job {} stopped", job.name());
}

async fn run<J: PeriodicJob>(job: Arc<J>) {
    let name = job.name();
    match tokio::task::spawn_blocking(move || job.run_once()).await {
        Ok(Ok(processed)) => log::info!("Job {} finished, {} items processed", name, processed),
        Ok(Err(e)) => log::error!("Job {} failed: {:#}", name, e),
        Err(e) => log::error!("Job {} panicked: {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        runs: AtomicUsize,
    }

    impl PeriodicJob for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn run_once(&self) -> anyhow::Result<usize> {
            Ok(self.runs.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    struct Failing;

    impl PeriodicJob for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run_once(&self) -> anyhow::Result<usize> {
            anyhow::bail!("always fails")
        }
    }

    async fn wait_for(counter: &Counter, at_least: usize) {
        for _ in 0..200 {
            if counter.runs.load(Ordering::SeqCst) >= at_least {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job ran fewer than {at_least} times");
    }

    #[tokio::test]
    async fn runs_repeatedly_until_shutdown() {
        let counter = Arc::new(Counter::default());
        let handle = start_job(counter.clone(), Duration::from_millis(20));

        wait_for(&counter, 3).await;
        handle.shutdown().await;

        let after_shutdown = counter.runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[tokio::test]
    async fn first_run_waits_for_the_interval() {
        let counter = Arc::new(Counter::default());
        let handle = start_job(counter.clone(), Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.runs.load(Ordering::SeqCst), 0);

        handle.run_now();
        wait_for(&counter, 1).await;
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn failing_job_keeps_its_loop_alive() {
        let handle = start_job(Arc::new(Failing), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;
    }
}
