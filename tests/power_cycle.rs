//! Whole power cycles against recording drivers

use std::time::Duration;

use chrono::Utc;
use tyzr::{
    app::CycleError,
    drivers::{
        format_clock,
        mock::{MemoryPower, RecordingAudio, RecordingDisplay, ScriptedInput},
        Button, FilePower,
    },
    power::BootKind,
    run_power_cycle,
    state::{Phase, RetainedImage, RetainedStore, TimerState},
    tasks::PowerDownReason,
    Drivers, TimerConfig,
};

fn config() -> TimerConfig {
    TimerConfig {
        work_duration: 1500,
        break_duration: 300,
        idle_timeout: Duration::from_secs(60),
        idle_timeout_when_stopped: Duration::from_secs(2),
        ..TimerConfig::BUILT_IN
    }
}

struct Bench {
    display: RecordingDisplay,
    audio: RecordingAudio,
    input: ScriptedInput,
}

impl Bench {
    fn new(presses: &[(u64, Button)]) -> Self {
        Self {
            display: RecordingDisplay::new(),
            audio: RecordingAudio::new(),
            input: ScriptedInput::new(presses),
        }
    }

    fn drivers(&self, power: impl tyzr::drivers::PowerControl + 'static) -> Drivers {
        Drivers {
            display: Box::new(self.display.clone()),
            audio: Box::new(self.audio.clone()),
            input: Box::new(self.input.clone()),
            power: Box::new(power),
        }
    }
}

fn never() -> std::future::Pending<()> {
    std::future::pending()
}

#[tokio::test(start_paused = true)]
async fn cold_boot_shows_work_duration_and_sleeps_when_idle() {
    let bench = Bench::new(&[]);
    let power = MemoryPower::cold();
    let config = TimerConfig { idle_timeout: Duration::from_secs(1), ..config() };

    let outcome = run_power_cycle(config, bench.drivers(power.clone()), never())
        .await
        .unwrap();

    assert_eq!(outcome.boot, BootKind::ColdStart);
    assert_eq!(outcome.reason, PowerDownReason::Idle);
    assert_eq!(bench.display.frames()[0], (1500, Phase::Work));
    assert_eq!(format_clock(1500), "25:00");
    assert_eq!(power.slept_image().unwrap().timer, TimerState::stopped(Phase::Work, 1500));
}

#[tokio::test(start_paused = true)]
async fn resume_repaints_retained_state_unchanged() {
    let retained = TimerState::stopped(Phase::Break, 120);
    let image = RetainedImage {
        timer: retained,
        idle_counter: 0,
        wake_pin: Some(39),
        written_at: Utc::now(),
    };
    let bench = Bench::new(&[]);
    let power = MemoryPower::resumed_with(image);

    let outcome = run_power_cycle(config(), bench.drivers(power.clone()), async {
        tokio::time::sleep(Duration::from_millis(250)).await;
    })
    .await
    .unwrap();

    assert_eq!(outcome.boot, BootKind::Resume);
    assert_eq!(outcome.reason, PowerDownReason::Requested);
    let (remaining, phase) = bench.display.frames()[0];
    assert_eq!((format_clock(remaining).as_str(), phase), ("02:00", Phase::Break));
    assert_eq!(power.slept_image().unwrap().timer, retained);
}

#[tokio::test(start_paused = true)]
async fn pause_then_power_down_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = RetainedStore::new(dir.path().join("retained.json"));

    // Start at poll 0, pause 3.1 s later; three ticks land in between.
    let first = Bench::new(&[(0, Button::Toggle), (31, Button::Toggle)]);
    let outcome = run_power_cycle(
        config(),
        first.drivers(FilePower::open(store.clone()).unwrap()),
        never(),
    )
    .await
    .unwrap();
    assert_eq!(
        outcome,
        tyzr::CycleOutcome { boot: BootKind::ColdStart, reason: PowerDownReason::Paused }
    );
    assert!(store.path().exists());

    let second = Bench::new(&[]);
    let outcome = run_power_cycle(
        config(),
        second.drivers(FilePower::open(store.clone()).unwrap()),
        async { tokio::time::sleep(Duration::from_millis(500)).await },
    )
    .await
    .unwrap();

    assert_eq!(outcome.boot, BootKind::Resume);
    assert_eq!(second.display.frames()[0], (1497, Phase::Work));
    assert_eq!(
        store.load().unwrap().map(|image| image.timer),
        Some(TimerState::stopped(Phase::Work, 1497))
    );
}

#[tokio::test(start_paused = true)]
async fn running_countdown_rolls_into_break_with_alarm() {
    let image = RetainedImage {
        timer: TimerState { remaining: 2, phase: Phase::Work, running: true },
        idle_counter: 0,
        wake_pin: Some(39),
        written_at: Utc::now(),
    };
    let bench = Bench::new(&[]);
    let power = MemoryPower::resumed_with(image);

    run_power_cycle(config(), bench.drivers(power.clone()), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
    })
    .await
    .unwrap();

    assert_eq!(bench.audio.tones(), vec![1000, 1500]);
    assert!(bench.display.frames().contains(&(0, Phase::Work)));
    let slept = power.slept_image().unwrap().timer;
    assert_eq!(slept.phase, Phase::Break);
    assert!(!slept.running);
    assert!(slept.remaining < 300 && slept.remaining > 290);
}

#[tokio::test(start_paused = true)]
async fn boot_failure_never_enters_the_loops() {
    let bench = Bench::new(&[(0, Button::Toggle)]);
    bench.display.fail_power();
    let power = MemoryPower::cold();

    let result = run_power_cycle(config(), bench.drivers(power.clone()), never()).await;

    assert!(matches!(result, Err(CycleError::Boot(_))));
    assert_eq!(bench.input.polls(), 0);
    assert!(bench.display.frames().is_empty());
    assert!(power.slept_image().is_none());
}
