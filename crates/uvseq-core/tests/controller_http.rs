//! Controller against a mocked device backend over HTTP.
//!
//! Uses a 10 ms tick so procedures finish quickly in real time.

use mockito::Matcher;
use serde_json::json;
use uvseq_core::{BackendError, Config, Controller, CoreError, Event, HttpBackend};

fn config_for(server: &mockito::Server) -> Config {
    let mut config = Config::default();
    config.backend.base_url = server.url();
    config.backend.request_timeout_secs = 5;
    config.procedure.tick_interval_ms = 10;
    config.procedure.step_count = 2;
    config
}

fn controller(config: &Config) -> Controller<HttpBackend> {
    let backend = HttpBackend::from_config(&config.backend).unwrap();
    Controller::new(backend, config)
}

fn type_step(ctl: &mut Controller<HttpBackend>, slot: usize, digits: &str, intensity: u8) {
    let input = ctl.form_mut().step_mut(slot).unwrap();
    for d in digits.bytes() {
        input.duration.type_digit(d - b'0');
    }
    input.intensity.set(intensity);
}

#[tokio::test]
async fn submit_runs_procedure_after_device_accepts() {
    let mut server = mockito::Server::new_async().await;
    let start = server
        .mock("POST", "/start_procedure")
        .match_body(Matcher::Json(json!({
            "steps": [
                { "time": "00:00:03", "intensity": 40 },
                { "time": "00:00:02", "intensity": 90 }
            ],
            "selected_channels": [1, 3]
        })))
        .with_status(200)
        .with_body(r#"{"status":"success","message":"Procedure initiated"}"#)
        .create_async()
        .await;

    let config = config_for(&server);
    let mut ctl = controller(&config);
    type_step(&mut ctl, 0, "3", 40);
    type_step(&mut ctl, 1, "2", 90);
    ctl.channels_mut().toggle(3);
    ctl.channels_mut().toggle(1);

    let mut events = ctl.events();
    let started = ctl.submit().await.unwrap();
    assert!(matches!(started, Event::ProcedureStarted { step_count: 2, .. }));
    ctl.wait_idle().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen.last(), Some(Event::ProcedureCompleted { .. })));
    start.assert_async().await;
}

#[tokio::test]
async fn rejected_submit_never_starts_countdown() {
    let mut server = mockito::Server::new_async().await;
    let _start = server
        .mock("POST", "/start_procedure")
        .with_status(500)
        .with_body("device fault")
        .create_async()
        .await;

    let config = config_for(&server);
    let mut ctl = controller(&config);
    type_step(&mut ctl, 0, "5", 40);

    let err = ctl.submit().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Backend(BackendError::Status { status: 500, .. })
    ));
    assert!(ctl.status().is_idle());
}

#[tokio::test]
async fn stop_reports_device_failure_but_stays_stopped() {
    let mut server = mockito::Server::new_async().await;
    let _start = server
        .mock("POST", "/start_procedure")
        .with_status(200)
        .with_body(r#"{"status":"success"}"#)
        .create_async()
        .await;
    let stop = server
        .mock("POST", "/stop_procedure")
        .with_status(503)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.procedure.tick_interval_ms = 1000;
    let mut ctl = controller(&config);
    type_step(&mut ctl, 0, "30", 40);

    ctl.submit().await.unwrap();
    assert_eq!(ctl.status().step, 1);

    let report = ctl.stop().await.unwrap();
    assert!(matches!(report.event, Some(Event::ProcedureStopped { .. })));
    assert!(matches!(
        report.remote,
        Err(BackendError::Status { status: 503, .. })
    ));
    assert!(ctl.status().is_idle());
    stop.assert_async().await;
}
