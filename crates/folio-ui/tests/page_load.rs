//! End-to-end page loads through the headless environment.

use std::time::Duration;

use folio_core::{MotionConfig, PreloaderConfig, ScrollConfig};
use folio_ui::{HostPhase, MenuState, SimOptions, Simulation};

fn run(options: SimOptions) -> (Simulation, folio_ui::SimReport) {
    let mut sim = Simulation::new(options, MotionConfig::default());
    let report = sim.run();
    (sim, report)
}

#[test]
fn test_cold_load_reveals_page() {
    let (sim, report) = run(SimOptions::default());

    assert!(report.ready);
    assert!(!report.scroll_locked);
    assert_eq!(sim.app().host_phase(), HostPhase::Ready);

    let history = &report.status.progress_history;
    assert!(!history.is_empty());
    assert!(history.windows(2).all(|w| w[0] <= w[1]), "{:?}", history);
    assert_eq!(history.last(), Some(&100));
    assert!(history[0] <= 90);

    assert_eq!(
        report.status.preloader_phases,
        vec!["polling", "ramping", "exiting", "done"]
    );
}

#[test]
fn test_reveal_follows_window_load() {
    let (_, report) = run(SimOptions::default());
    let loaded = report.window_loaded_at_ms.unwrap_or(u64::MAX);
    let revealed = report.revealed_at_ms.unwrap_or(0);
    // Ramp, pause, exit timeline and the two host delays all sit in between.
    assert!(revealed >= loaded + 2_000, "{} -> {}", loaded, revealed);
}

#[test]
fn test_regions_mount_and_scroll_settles() {
    let options = SimOptions::default();
    let target = options.scroll_to;
    let (sim, report) = run(options);

    assert!(sim.app().is_mounted());
    assert!(report.status.scopes >= 1);
    assert!(report.status.bindings > 0);
    assert!((report.status.scroll_y - target).abs() < 1.0);
    assert!(report.elapsed_ms < 20_000);
}

#[test]
fn test_already_loaded_document() {
    let (_, report) = run(SimOptions {
        already_loaded: true,
        ..SimOptions::default()
    });
    assert!(report.ready);
    assert!(!report.scroll_locked);
    assert_eq!(report.window_loaded_at_ms, Some(0));
    assert_eq!(report.status.progress_history.last(), Some(&100));
}

#[test]
fn test_page_without_images() {
    let (_, report) = run(SimOptions {
        images: 0,
        ..SimOptions::default()
    });
    assert!(report.ready);
    assert_eq!(report.status.progress_history.first(), Some(&70));
    assert_eq!(report.status.progress_history.last(), Some(&100));
}

#[test]
fn test_scroll_locked_while_loading() {
    let mut sim = Simulation::new(SimOptions::default(), MotionConfig::default());
    sim.start();
    for _ in 0..5 {
        sim.step();
    }
    assert!(sim.document().is_scroll_locked());
    assert_eq!(sim.app().host_phase(), HostPhase::Loading);
    assert_eq!(sim.app().manager().registry().scope_count(), 0);
}

#[test]
fn test_menu_toggles_after_reveal() {
    let mut sim = Simulation::new(SimOptions::default(), MotionConfig::default());
    sim.run();

    sim.app_mut().toggle_menu();
    assert_eq!(sim.app().menu_state(), MenuState::Opening);
    for _ in 0..200 {
        sim.step();
    }
    assert_eq!(sim.app().menu_state(), MenuState::Open);

    sim.app_mut().toggle_menu();
    for _ in 0..200 {
        sim.step();
    }
    assert_eq!(sim.app().menu_state(), MenuState::Closed);
}

#[test]
fn test_without_progress_bar() {
    let config = MotionConfig {
        preloader: PreloaderConfig {
            show_progress_bar: false,
            ..PreloaderConfig::default()
        },
        ..MotionConfig::default()
    };
    let mut sim = Simulation::new(
        SimOptions {
            frame: Duration::from_millis(20),
            ..SimOptions::default()
        },
        config,
    );
    let report = sim.run();
    assert!(report.ready);
    assert!(report.status.bindings > 0);
    assert!(sim.elapsed() >= Duration::from_millis(2_400));
}

#[test]
fn test_scroll_config_shapes_the_final_scroll() {
    let config = MotionConfig {
        scroll: ScrollConfig {
            lerp: 0.0,
            duration: 0.5,
            wheel_multiplier: 2.0,
            ..ScrollConfig::default()
        },
        ..MotionConfig::default()
    };
    let mut sim = Simulation::new(
        SimOptions {
            scroll_to: 1000.0,
            ..SimOptions::default()
        },
        config,
    );
    let report = sim.run();
    assert!(report.ready);
    assert_eq!(report.status.scroll_y, 2000.0);
    assert!(sim.app().scroll().is_settled());
}

#[test]
fn test_engine_does_not_accumulate_finished_tweens() {
    let mut sim = Simulation::new(SimOptions::default(), MotionConfig::default());
    let report = sim.run();
    let settled = sim.engine().tween_count();
    assert!(settled <= report.status.bindings);

    for _ in 0..20 {
        sim.app_mut().toggle_menu();
        for _ in 0..200 {
            sim.step();
        }
    }
    assert_eq!(sim.app().menu_state(), MenuState::Closed);
    assert!(sim.engine().tween_count() <= settled);
}
