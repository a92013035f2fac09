//! Frame Driver Tests
//!
//! Tests for:
//! - Per-tick ordering: time uniform, camera control, render
//! - Delta and frame bookkeeping
//! - Render errors abort the tick
//! - OrbitControls as the camera control

use std::cell::RefCell;
use std::rc::Rc;

use bokeh_terrain::errors::{BokehError, Result};
use bokeh_terrain::utils::PointerButton;
use bokeh_terrain::{
    CameraControl, Clock, FrameDriver, FrameOutcome, FrameTarget, OrbitControls, PerspectiveCamera,
};
use glam::Vec3;

type Log = Rc<RefCell<Vec<String>>>;

/// Clock returning a fixed sequence of timestamps.
struct ScriptedClock {
    times: Vec<f32>,
    next: usize,
}

impl ScriptedClock {
    fn new(times: &[f32]) -> Self {
        Self {
            times: times.to_vec(),
            next: 0,
        }
    }
}

impl Clock for ScriptedClock {
    fn elapsed_seconds(&mut self) -> f32 {
        let t = self.times[self.next.min(self.times.len() - 1)];
        self.next += 1;
        t
    }
}

struct RecordingTarget {
    log: Log,
    camera: PerspectiveCamera,
    time: f32,
    fail: bool,
}

impl RecordingTarget {
    fn new(log: Log) -> Self {
        Self {
            log,
            camera: PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0),
            time: 0.0,
            fail: false,
        }
    }
}

impl FrameTarget for RecordingTarget {
    fn set_time(&mut self, elapsed: f32) {
        self.time = elapsed;
        self.log.borrow_mut().push(format!("time {elapsed}"));
    }

    fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    fn render_frame(&mut self) -> Result<FrameOutcome> {
        self.log.borrow_mut().push(format!("render {}", self.time));
        if self.fail {
            Err(BokehError::SurfaceAcquire("device lost".into()))
        } else {
            Ok(FrameOutcome::Presented)
        }
    }
}

struct RecordingControl {
    log: Log,
}

impl CameraControl for RecordingControl {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        camera.transform.position.x += 1.0;
        self.log.borrow_mut().push("control".into());
        true
    }
}

#[test]
fn tick_sets_time_then_moves_camera_then_renders() {
    let log = Log::default();
    let mut target = RecordingTarget::new(log.clone());
    let mut control = RecordingControl { log: log.clone() };
    let mut driver = FrameDriver::new(ScriptedClock::new(&[0.25]));

    let outcome = driver.tick(&mut target, Some(&mut control)).unwrap();

    assert_eq!(outcome, FrameOutcome::Presented);
    assert_eq!(*log.borrow(), vec!["time 0.25", "control", "render 0.25"]);
}

#[test]
fn tick_without_control_leaves_camera_alone() {
    let log = Log::default();
    let mut target = RecordingTarget::new(log.clone());
    let before = target.camera.transform.position;
    let mut driver = FrameDriver::new(ScriptedClock::new(&[1.0]));

    driver.tick(&mut target, None).unwrap();

    assert_eq!(target.camera.transform.position, before);
    assert_eq!(*log.borrow(), vec!["time 1", "render 1"]);
}

#[test]
fn delta_is_recorded_between_ticks() {
    let mut target = RecordingTarget::new(Log::default());
    let mut driver = FrameDriver::new(ScriptedClock::new(&[0.5, 0.75, 1.75]));

    driver.tick(&mut target, None).unwrap();
    assert!((driver.delta() - 0.5).abs() < 1e-6);
    driver.tick(&mut target, None).unwrap();
    assert!((driver.delta() - 0.25).abs() < 1e-6);
    driver.tick(&mut target, None).unwrap();
    assert!((driver.delta() - 1.0).abs() < 1e-6);

    assert!((driver.elapsed() - 1.75).abs() < 1e-6);
    assert_eq!(driver.frames(), 3);
}

#[test]
fn time_uniform_follows_the_clock() {
    let mut target = RecordingTarget::new(Log::default());
    let mut driver = FrameDriver::new(ScriptedClock::new(&[0.1, 0.2, 0.3]));
    for expected in [0.1, 0.2, 0.3] {
        driver.tick(&mut target, None).unwrap();
        assert!((target.time - expected).abs() < 1e-6);
    }
}

#[test]
fn render_error_propagates_and_is_not_counted() {
    let mut target = RecordingTarget::new(Log::default());
    target.fail = true;
    let mut driver = FrameDriver::new(ScriptedClock::new(&[0.5]));

    let result = driver.tick(&mut target, None);

    assert!(matches!(result, Err(BokehError::SurfaceAcquire(_))));
    assert_eq!(driver.frames(), 0);
}

#[test]
fn orbit_controls_move_the_camera_during_tick() {
    let mut target = RecordingTarget::new(Log::default());
    target.camera.transform.position = Vec3::new(0.0, 1.0, 2.0);

    let mut controls = OrbitControls::looking_at(Vec3::new(0.0, 1.0, 2.0), Vec3::ZERO, 1.0);
    controls.input.handle_resize(800, 600);
    controls.input.handle_cursor_move(400.0, 300.0);
    controls.input.handle_button(PointerButton::Primary, true);
    controls.input.handle_cursor_move(440.0, 300.0);

    let mut driver = FrameDriver::new(ScriptedClock::new(&[0.016]));
    driver.tick(&mut target, Some(&mut controls)).unwrap();

    let position = target.camera.transform.position;
    assert!((position.length() - Vec3::new(0.0, 1.0, 2.0).length()).abs() < 1e-3);
    assert!(position.x.abs() > 1e-3);
}
