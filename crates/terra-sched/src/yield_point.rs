//! Host continuation points.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Where a chunked pass suspends between slices.
///
/// The host decides what "next frame" means: an animation tick, a vsync
/// signal, or simply another turn of its executor.
pub trait YieldPoint {
    /// Resolve once the host is ready for the next slice of work.
    fn next_frame(&mut self) -> impl Future<Output = ()>;
}

/// Yields exactly one executor turn per slice.
#[derive(Clone, Copy, Debug, Default)]
pub struct YieldNow;

impl YieldPoint for YieldNow {
    fn next_frame(&mut self) -> impl Future<Output = ()> {
        yield_now()
    }
}

/// A future that is pending once, wakes itself, then completes.
pub fn yield_now() -> YieldOnce {
    YieldOnce { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_once_completes_under_block_on() {
        pollster::block_on(yield_now());
    }

    #[test]
    fn test_yield_now_point_can_be_awaited_repeatedly() {
        let mut host = YieldNow;
        pollster::block_on(async {
            for _ in 0..10 {
                host.next_frame().await;
            }
        });
    }
}
