use std::time::Duration;

use engine::scheduler::{Scheduler, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ev {
    Tick,
    Stop,
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Drives the queue the way a game loop does: fixed frames, every due timer dispatched in order,
/// and a handler that cancels the tick when the stop fires.
#[test]
fn handler_can_cancel_a_repeating_timer_mid_frame() {
    let mut q = TimerQueue::new();
    let tick = q.schedule_repeating(ms(70), Ev::Tick);
    q.schedule_once(ms(4000), Ev::Stop);

    let mut ticks = 0;
    let mut stopped_at = None;
    let frame = ms(1000);
    for _ in 0..6 {
        let deadline = q.now() + frame;
        while let Some(fired) = q.poll(deadline) {
            match fired.event {
                Ev::Tick => ticks += 1,
                Ev::Stop => {
                    stopped_at = Some(fired.at);
                    assert!(q.cancel(tick));
                }
            }
        }
        q.advance_to(deadline);
    }

    assert_eq!(stopped_at, Some(ms(4000)));
    // 70, 140, ... 3990: ticks strictly before the stop.
    assert_eq!(ticks, 57);
    assert!(q.is_empty());
    assert_eq!(q.now(), ms(6000));
}

#[test]
fn one_big_step_and_many_small_steps_fire_the_same_sequence() {
    let record = |steps: &[u64]| {
        let mut q = TimerQueue::new();
        q.schedule_repeating(ms(30), Ev::Tick);
        q.schedule_once(ms(100), Ev::Stop);
        let mut out = Vec::new();
        for &s in steps {
            let deadline = q.now() + ms(s);
            while let Some(f) = q.poll(deadline) {
                out.push((f.event, f.at));
            }
            q.advance_to(deadline);
        }
        out
    };

    let big = record(&[200]);
    let small = record(&[16; 13]);
    assert_eq!(big[..7], small[..7]);
    assert_eq!(big[2], (Ev::Tick, ms(90)));
    assert_eq!(big[3], (Ev::Stop, ms(100)));
}
