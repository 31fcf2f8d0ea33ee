//! Poll loops as explicit state machines.
//!
//! A [`Poller`] turns a fallible check into a stream of [`PollState`]s:
//! every check yields [`PollState::Waiting`] until it produces a value
//! ([`PollState::Ready`]) or fails ([`PollState::Failed`]), after which the
//! stream ends. Time only passes through the provided `sleep` function and
//! every suspension point observes the [`CancellationToken`].

use std::{pin::pin, time::Duration};

use futures::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::error::FdcError;

/// State of a poll loop after a single check.
#[derive(Debug)]
pub enum PollState<T> {
    Waiting,
    Ready(T),
    Failed(FdcError),
}

impl<T> PollState<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting)
    }

    fn from_check(result: Result<Option<T>, FdcError>) -> Self {
        match result {
            Ok(Some(value)) => Self::Ready(value),
            Ok(None) => Self::Waiting,
            Err(err) => Self::Failed(err),
        }
    }
}

/// Sleep for `duration` unless cancelled first.
pub async fn sleep_or_cancel<S, SFut>(
    sleep: S,
    duration: Duration,
    cancel: &CancellationToken,
) -> Result<(), FdcError>
where
    S: Fn(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FdcError::Cancelled),
        _ = sleep(duration) => Ok(()),
    }
}

/// Fixed-interval poll schedule without attempt limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    delay_first: bool,
}

impl Poller {
    /// Checks immediately, then every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            delay_first: false,
        }
    }

    /// Sleeps `interval` before the first check as well.
    pub fn delay_first(mut self) -> Self {
        self.delay_first = true;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stream of states produced by repeatedly running `check`.
    ///
    /// `check` returns `Ok(None)` while the awaited condition does not hold.
    /// The stream ends right after the first terminal state.
    pub fn states<T, C, CFut, S, SFut>(
        &self,
        check: C,
        sleep: S,
        cancel: CancellationToken,
    ) -> impl Stream<Item = PollState<T>>
    where
        C: FnMut() -> CFut,
        CFut: Future<Output = Result<Option<T>, FdcError>>,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let interval = self.interval;
        stream::unfold(
            (check, self.delay_first, false),
            move |(mut check, delay, done)| {
                let cancel = cancel.clone();
                async move {
                    if done {
                        return None;
                    }
                    if delay {
                        if let Err(err) = sleep_or_cancel(sleep, interval, &cancel).await {
                            return Some((PollState::Failed(err), (check, true, true)));
                        }
                    }
                    let state = if cancel.is_cancelled() {
                        PollState::Failed(FdcError::Cancelled)
                    } else {
                        PollState::from_check(check().await)
                    };
                    let done = state.is_terminal();
                    Some((state, (check, true, done)))
                }
            },
        )
    }

    /// Drive [`Self::states`] to the terminal state.
    pub async fn until_ready<T, C, CFut, S, SFut>(
        &self,
        check: C,
        sleep: S,
        cancel: CancellationToken,
    ) -> Result<T, FdcError>
    where
        C: FnMut() -> CFut,
        CFut: Future<Output = Result<Option<T>, FdcError>>,
        S: Fn(Duration) -> SFut + Copy,
        SFut: Future<Output = ()>,
    {
        let mut states = pin!(self.states(check, sleep, cancel));
        while let Some(state) = states.next().await {
            match state {
                PollState::Waiting => continue,
                PollState::Ready(value) => return Ok(value),
                PollState::Failed(err) => return Err(err),
            }
        }
        Err(FdcError::Fatal("poll stream ended without a result".to_string()))
    }
}
