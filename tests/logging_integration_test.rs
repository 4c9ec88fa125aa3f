//! Global logger wiring: controller status lines land in the session logs.

use sched_dashboard::log_collector::LogKind;
use sched_dashboard::{initialize_logging, AlgorithmId, DashboardController, DashboardSettings};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct NoopSimulator;

impl sched_dashboard::Simulator for NoopSimulator {
    fn simulate(
        &self,
        _request: sched_dashboard::dashboard::SimulationRequest,
    ) -> futures::future::BoxFuture<'static, Result<sched_dashboard::SimulationResult, sched_dashboard::SimulationError>> {
        Box::pin(async {
            Err(sched_dashboard::SimulationError::Transport("offline".to_string()))
        })
    }
}

#[tokio::test]
async fn test_status_lines_are_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let settings = DashboardSettings {
        log_dir: temp_dir.path().to_string_lossy().to_string(),
        log_level: "debug".to_string(),
        ..Default::default()
    };
    let (ui_tx, mut ui_rx) = tokio::sync::mpsc::channel(1024);
    let collector = initialize_logging(&settings, ui_tx).expect("Failed to initialize logging");

    let (event_tx, _event_rx) = tokio::sync::mpsc::channel(1);
    let mut ctl = DashboardController::new(Arc::new(NoopSimulator), event_tx, &settings);
    ctl.select_algorithm(AlgorithmId::Fcfs);
    ctl.execute_now().await;

    collector.wait_for_empty().await.unwrap();

    let full = fs::read_to_string(collector.session_log_path()).unwrap();
    assert!(full.contains("[Status] Simulating..."));
    assert!(full.contains("Simulation Failed: offline"));

    let parsed = fs::read_to_string(
        temp_dir
            .path()
            .join("parsed")
            .join(collector.session_log_path().file_name().unwrap()),
    )
    .unwrap();
    assert!(parsed.contains("[Status] No simulation data available"));
    assert!(!parsed.contains("[Controller]"));

    let mut saw_parsed = false;
    while let Ok(line) = ui_rx.try_recv() {
        saw_parsed |= line.kind == LogKind::Parsed;
    }
    assert!(saw_parsed);
}
