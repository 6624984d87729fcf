//! Profile-status change feed.
//!
//! A `Subscription` polls a `StatusSource`, diffs consecutive snapshots and
//! yields one `ChangeEvent` per changed or newly seen profile. It never ends
//! on its own; cancel it through its `CancelToken`.

use crate::errors::AppResult;
use crate::models::change::ChangeEvent;
use crate::models::profile::ProfileStatus;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub type StatusSnapshot = BTreeMap<String, ProfileStatus>;

pub trait StatusSource {
    fn snapshot(&mut self) -> AppResult<StatusSnapshot>;
}

impl<F> StatusSource for F
where
    F: FnMut() -> AppResult<StatusSnapshot>,
{
    fn snapshot(&mut self) -> AppResult<StatusSnapshot> {
        self()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

const SLEEP_STEP: Duration = Duration::from_millis(100);

/// Sleep for `total`, waking early on cancellation. False if cancelled.
/// A `total` past what `Instant` can represent only ends on cancellation.
fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) -> bool {
    let deadline = Instant::now().checked_add(total);
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let step = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return true;
                }
                SLEEP_STEP.min(deadline - now)
            }
            None => SLEEP_STEP,
        };
        thread::sleep(step);
    }
}

/// Events turning `before` into `after`. Profiles that disappear are ignored.
pub fn diff(before: &StatusSnapshot, after: &StatusSnapshot) -> Vec<ChangeEvent> {
    after
        .iter()
        .filter_map(|(id, &current)| {
            let previous = before.get(id).copied();
            (previous != Some(current)).then(|| ChangeEvent {
                user_id: id.clone(),
                previous,
                current,
            })
        })
        .collect()
}

pub struct Subscription<S: StatusSource> {
    source: S,
    last: StatusSnapshot,
    pending: VecDeque<ChangeEvent>,
    interval: Duration,
    cancel: CancelToken,
}

impl<S: StatusSource> Subscription<S> {
    /// Takes the baseline snapshot now; only later changes are reported.
    pub fn new(mut source: S, interval: Duration, cancel: CancelToken) -> AppResult<Self> {
        let last = source.snapshot()?;
        Ok(Self {
            source,
            last,
            pending: VecDeque::new(),
            interval,
            cancel,
        })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Poll once without waiting.
    pub fn poll(&mut self) -> AppResult<Vec<ChangeEvent>> {
        let snap = self.source.snapshot()?;
        let events = diff(&self.last, &snap);
        self.last = snap;
        Ok(events)
    }
}

impl<S: StatusSource> Iterator for Subscription<S> {
    type Item = AppResult<ChangeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Some(ev) = self.pending.pop_front() {
                return Some(Ok(ev));
            }
            if !sleep_unless_cancelled(self.interval, &self.cancel) {
                return None;
            }
            match self.poll() {
                Ok(events) => self.pending.extend(events),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use ProfileStatus::*;

    fn snap(items: &[(&str, ProfileStatus)]) -> StatusSnapshot {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// Replays snapshots in order, then repeats the last one.
    struct Scripted {
        frames: VecDeque<AppResult<StatusSnapshot>>,
        last: StatusSnapshot,
    }

    impl Scripted {
        fn new(frames: Vec<AppResult<StatusSnapshot>>) -> Self {
            Self {
                frames: frames.into(),
                last: StatusSnapshot::new(),
            }
        }
    }

    impl StatusSource for Scripted {
        fn snapshot(&mut self) -> AppResult<StatusSnapshot> {
            match self.frames.pop_front() {
                Some(Ok(s)) => {
                    self.last = s.clone();
                    Ok(s)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last.clone()),
            }
        }
    }

    #[test]
    fn diff_reports_changes_and_new_profiles() {
        let before = snap(&[("a", UnderReview), ("b", Approved), ("gone", Approved)]);
        let after = snap(&[("a", Approved), ("b", Approved), ("c", UnderReview)]);

        let events = diff(&before, &after);
        assert_eq!(
            events,
            vec![
                ChangeEvent {
                    user_id: "a".into(),
                    previous: Some(UnderReview),
                    current: Approved
                },
                ChangeEvent {
                    user_id: "c".into(),
                    previous: None,
                    current: UnderReview
                },
            ]
        );
    }

    #[test]
    fn baseline_is_silent_and_later_changes_stream() {
        let source = Scripted::new(vec![
            Ok(snap(&[("a", UnderReview)])),
            Ok(snap(&[("a", UnderReview)])),
            Ok(snap(&[("a", Approved)])),
            Ok(snap(&[("a", Rejected), ("b", UnderReview)])),
        ]);
        let sub = Subscription::new(source, Duration::ZERO, CancelToken::new()).unwrap();

        let got: Vec<(String, ProfileStatus)> = sub
            .take(3)
            .map(|r| r.map(|e| (e.user_id, e.current)))
            .collect::<AppResult<_>>()
            .unwrap();

        assert_eq!(
            got,
            vec![
                ("a".to_string(), Approved),
                ("a".to_string(), Rejected),
                ("b".to_string(), UnderReview),
            ]
        );
    }

    #[test]
    fn errors_surface_and_polling_continues() {
        let source = Scripted::new(vec![
            Ok(snap(&[("a", UnderReview)])),
            Err(AppError::Other("backend down".into())),
            Ok(snap(&[("a", Approved)])),
        ]);
        let mut sub = Subscription::new(source, Duration::ZERO, CancelToken::new()).unwrap();

        assert!(matches!(sub.next(), Some(Err(AppError::Other(_)))));
        let ev = sub.next().unwrap().unwrap();
        assert_eq!(ev.current, Approved);
    }

    #[test]
    fn cancel_stops_a_waiting_subscription() {
        let source = || -> AppResult<StatusSnapshot> { Ok(snap(&[("a", Approved)])) };
        let cancel = CancelToken::new();
        let mut sub = Subscription::new(source, Duration::from_secs(60), cancel.clone()).unwrap();

        let handle = thread::spawn({
            let cancel = sub.cancel_token();
            move || {
                thread::sleep(Duration::from_millis(50));
                cancel.cancel();
            }
        });

        let started = Instant::now();
        assert!(sub.next().is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(cancel.is_cancelled());
        handle.join().unwrap();
    }

    #[test]
    fn unrepresentable_wait_still_honours_cancel() {
        let cancel = CancelToken::new();
        let handle = thread::spawn({
            let cancel = cancel.clone();
            move || {
                thread::sleep(Duration::from_millis(50));
                cancel.cancel();
            }
        });

        assert!(!sleep_unless_cancelled(Duration::MAX, &cancel));
        handle.join().unwrap();
    }
}
