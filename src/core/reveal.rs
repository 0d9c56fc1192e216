/// Reveal scheduler — timed, cancellable, one-character-at-a-time output.
///
/// The scheduler never sleeps. Drivers call [`RevealScheduler::tick`] with
/// the current time and it emits every character that has come due. Each
/// call to [`RevealScheduler::reveal`] starts a new generation and drops the
/// previous task, so output from a superseded reveal can never reach the
/// sink afterwards.
use std::time::Duration;

use super::segment::Segment;
use super::sink::RenderSink;

/// Identifies one reveal. Handles from earlier generations are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealHandle {
    generation: u64,
}

impl RevealHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStatus {
    /// Nothing in flight.
    Idle,
    /// Characters remain; the next one is due at `next_due`.
    Revealing { next_due: Duration },
    /// The reveal behind this handle emitted its last character during this
    /// tick. Reported exactly once.
    Finished(RevealHandle),
}

#[derive(Debug)]
struct RevealTask {
    handle: RevealHandle,
    segments: Vec<Segment>,
    segment: usize,
    /// Byte offset into the current segment's text.
    offset: usize,
    next_due: Duration,
    delay: Duration,
}

impl RevealTask {
    /// Skip exhausted segments; true once everything has been emitted.
    fn settle(&mut self) -> bool {
        while let Some(seg) = self.segments.get(self.segment) {
            if self.offset < seg.text.len() {
                return false;
            }
            self.segment += 1;
            self.offset = 0;
        }
        true
    }

    fn emit_due<S: RenderSink + ?Sized>(&mut self, now: Duration, sink: &mut S) {
        while !self.settle() && self.next_due <= now {
            let seg = &self.segments[self.segment];
            let Some(ch) = seg.text[self.offset..].chars().next() else {
                break;
            };
            sink.emit_char(ch, seg.effect.as_ref());
            self.offset += ch.len_utf8();
            // Line breaks land together with the character after them.
            if ch != '\n' {
                self.next_due += self.delay;
            }
        }
    }
}

/// Drives at most one reveal at a time.
#[derive(Debug, Default)]
pub struct RevealScheduler {
    generation: u64,
    task: Option<RevealTask>,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin revealing `segments`, superseding any reveal in flight.
    ///
    /// The first character is due at `now`; each later one follows `delay`
    /// after its predecessor, except that a newline adds no delay. Nothing
    /// is emitted until the next [`tick`](Self::tick).
    pub fn reveal(&mut self, segments: Vec<Segment>, delay: Duration, now: Duration) -> RevealHandle {
        self.generation += 1;
        let handle = RevealHandle {
            generation: self.generation,
        };
        self.task = Some(RevealTask {
            handle,
            segments,
            segment: 0,
            offset: 0,
            next_due: now,
            delay,
        });
        handle
    }

    /// Drop the reveal in flight, if any. Its handle becomes stale.
    pub fn cancel(&mut self) {
        if self.task.take().is_some() {
            self.generation += 1;
        }
    }

    /// True if `handle` belongs to the reveal currently in flight.
    pub fn is_current(&self, handle: RevealHandle) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| task.handle == handle)
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// When the next character is due, if a reveal is in flight.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.task.as_ref().map(|task| task.next_due)
    }

    /// Emit every character due at or before `now`.
    ///
    /// A late tick catches up: characters come out in order, in one batch,
    /// without shifting the schedule of the ones still pending.
    pub fn tick<S: RenderSink + ?Sized>(&mut self, now: Duration, sink: &mut S) -> RevealStatus {
        let Some(task) = self.task.as_mut() else {
            return RevealStatus::Idle;
        };

        task.emit_due(now, sink);

        if task.settle() {
            let handle = task.handle;
            self.task = None;
            RevealStatus::Finished(handle)
        } else {
            RevealStatus::Revealing {
                next_due: task.next_due,
            }
        }
    }
}
