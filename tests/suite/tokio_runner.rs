//! Runner behavior on a real (paused-clock) tokio runtime.

use std::time::Duration;

use cadence_core::{Delay, IntervalRunner, RunnerState};
use cadence_runtime::TokioTimer;
use tokio::task::LocalSet;
use tokio::time::sleep;

use crate::common::Recorder;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn swap_action_then_disable() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("A"), Delay::millis(1000));
            sleep(ms(3500)).await;
            assert_eq!(rec.take(), ["A", "A", "A"]);

            runner.configure(rec.action("B"), Delay::millis(1000));
            assert_eq!(runner.stats().registrations, 1);
            sleep(ms(1000)).await;
            assert_eq!(rec.take(), ["B"]);

            runner.configure(rec.action("B"), Delay::Disabled);
            assert_eq!(runner.state(), RunnerState::Idle);
            sleep(Duration::from_secs(600)).await;
            assert!(rec.take().is_empty());
            assert_eq!(runner.stats().releases, 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn action_update_between_ticks_applies_from_next_tick() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("first"), Delay::millis(100));
            sleep(ms(150)).await;
            runner.set_action(rec.action("second"));
            sleep(ms(100)).await;
            runner.set_action(rec.action("third"));
            sleep(ms(100)).await;

            assert_eq!(rec.take(), ["first", "second", "third"]);
            assert_eq!(runner.stats().registrations, 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn delay_change_restarts_cadence() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("x"), Delay::millis(1000));
            sleep(ms(900)).await;
            runner.configure(rec.action("x"), Delay::millis(400));

            // Old cadence would fire at 1000; the new one fires at 1300.
            sleep(ms(350)).await;
            assert!(rec.take().is_empty());
            sleep(ms(100)).await;
            assert_eq!(rec.take(), ["x"]);

            let stats = runner.stats();
            assert_eq!(stats.registrations, 2);
            assert_eq!(stats.releases, 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn dropping_runner_stops_ticks() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());
            runner.configure(rec.action("x"), Delay::millis(50));
            sleep(ms(120)).await;

            let stats = runner.teardown();
            assert_eq!(stats.releases, 1);
            assert_eq!(stats.ticks, 2);

            sleep(Duration::from_secs(10)).await;
            assert_eq!(rec.take(), ["x", "x"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn ticks_before_any_action_are_noops() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());
            runner.set_delay(Delay::millis(100));
            sleep(ms(250)).await;
            assert_eq!(runner.stats().ticks, 2);

            runner.set_action(rec.action("late"));
            sleep(ms(100)).await;
            assert_eq!(rec.take(), ["late"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn disabled_then_reenabled_gets_fresh_timer_and_cadence() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("x"), Delay::millis(100));
            let RunnerState::Active(first) = runner.state() else {
                panic!("expected an active timer");
            };
            sleep(ms(250)).await;
            assert_eq!(rec.take(), ["x", "x"]);

            runner.configure(rec.action("x"), Delay::Disabled);
            sleep(ms(1000)).await;
            assert!(rec.take().is_empty());

            runner.configure(rec.action("x"), Delay::millis(100));
            let RunnerState::Active(second) = runner.state() else {
                panic!("expected an active timer");
            };
            assert_ne!(first, second);

            // Cadence restarts from re-enable, not from the original phase.
            sleep(ms(90)).await;
            assert!(rec.take().is_empty());
            sleep(ms(20)).await;
            assert_eq!(rec.take(), ["x"]);

            let stats = runner.stats();
            assert_eq!(stats.registrations, 2);
            assert_eq!(stats.releases, 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn constant_delay_registers_once_across_many_configurations() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("a"), Delay::millis(100));
            let state = runner.state();
            for label in ["b", "c", "d", "e"] {
                sleep(ms(30)).await;
                runner.configure(rec.action(label), Delay::millis(100));
                runner.set_delay(Delay::millis(100));
                assert_eq!(runner.state(), state);
            }
            sleep(ms(200)).await;

            let stats = runner.stats();
            assert_eq!(stats.registrations, 1);
            assert_eq!(stats.releases, 0);
            // Ticks at 100, 200 and 300; the last configuration was at 120.
            assert_eq!(rec.take(), ["d", "e", "e"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn unbounded_delay_keeps_timer_alive() {
    LocalSet::new()
        .run_until(async {
            let rec = Recorder::new();
            let mut runner = IntervalRunner::new(TokioTimer::new());

            runner.configure(rec.action("far"), Delay::Every(Duration::MAX));
            sleep(Duration::from_secs(3600)).await;
            assert!(runner.state().is_active());
            assert!(rec.take().is_empty());

            sleep(Delay::MAX_PERIOD).await;
            assert_eq!(rec.take(), ["far"]);

            runner.configure(rec.action("near"), Delay::millis(10));
            sleep(ms(25)).await;
            assert_eq!(rec.take(), ["near", "near"]);
            assert_eq!(runner.stats().releases, 1);
        })
        .await;
}
