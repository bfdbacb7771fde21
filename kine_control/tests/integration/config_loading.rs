//! Configuration file loading.
//!
//! Verifies a session file on disk builds a working observer and controller.

use std::io::Write;
use std::path::Path;

use approx::assert_relative_eq;
use kine_common::config::{ConfigError, LogLevel};
use kine_common::model::FrameJacobian;
use kine_common::snapshot::DynamicsSnapshot;
use kine_control::cartesian::impedance::CartesianImpController;
use kine_control::cartesian::task::CartesianTask;
use kine_control::config::load_config;
use kine_control::estimation::observer::MomentumObserver;
use nalgebra::Isometry3;
use tempfile::NamedTempFile;

const SESSION: &str = r#"
[shared]
log_level = "debug"
session_name = "leg-01"

[observer]
sample_period = 0.002
bandwidth = 20.0
lambda = 0.0
selector = [0, 1, 2]

[impedance]
control_frame = "foot"
stiffness = [100.0, 100.0, 100.0, 10.0, 10.0, 10.0]
damping = [20.0, 20.0, 20.0, 6.3, 6.3, 6.3]
"#;

#[test]
fn test_session_file_builds_components() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SESSION.as_bytes()).unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);

    // Host-side subscriber at the configured level; another test may own it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(config.shared.log_level))
        .with_test_writer()
        .try_init();
    assert_eq!(config.shared.session_name, "leg-01");

    let mut model = DynamicsSnapshot::new(6, "tip").unwrap();
    model
        .set_frame("foot", Isometry3::identity(), &FrameJacobian::identity(6))
        .unwrap();

    let observer = MomentumObserver::new(&model, &config.observer).unwrap();
    assert_eq!(observer.sample_period(), 0.002);
    assert_relative_eq!(observer.effective_bandwidth().unwrap(), 20.0, epsilon = 1e-9);
    assert_eq!(observer.selector().indices(), &[0, 1, 2]);

    let mut ctrl = CartesianImpController::new(
        &model,
        CartesianTask::default(),
        config.impedance.control_frame.as_deref(),
    )
    .unwrap();
    ctrl.set_cart_impedance(config.impedance.impedance().unwrap().unwrap())
        .unwrap();
    assert_eq!(ctrl.control_frame(), "foot");
    assert_eq!(ctrl.stiffness().unwrap()[(3, 3)], 10.0);
    ctrl.update(&model).unwrap();
}

#[test]
fn test_missing_file() {
    assert_eq!(
        load_config(Path::new("/nonexistent/kine/session.toml")).unwrap_err(),
        ConfigError::FileNotFound
    );
}

#[test]
fn test_invalid_session_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[shared]\nsession_name = \"\"\n").unwrap();
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}
