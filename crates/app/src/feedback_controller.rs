//! Feedback controller — turns a utilization reading into a needle position.
//!
//! Every `interval` the controller resolves the sensor and the actuator by
//! name, takes one reading and moves the actuator to
//! `max_angle - usage * max_angle`, rounded to whole degrees.
//!
//! Failures fall into two classes:
//!
//! - resolving either collaborator fails: [`CycleError::Fatal`]; the loop
//!   stops and hands the error to the caller, which is expected to exit.
//! - the read, the shape check or the move fails: [`CycleError::Aborted`];
//!   the cycle is logged and skipped, and the next one runs on schedule.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use needlehub_domain::command::{ActuatorCommand, DEFAULT_MAX_ANGLE};
use needlehub_domain::error::NeedleError;

use crate::ports::{Actuator, ActuatorResolver, ReadingSource, SensorResolver};

/// Poll period of the reference deployment.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Static controller settings.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Time between the starts of two consecutive cycles.
    pub interval: Duration,
    /// Full-scale deflection of the actuator, in degrees.
    pub max_angle: u32,
    /// Name the sensor is resolved by.
    pub sensor_name: String,
    /// Name the actuator is resolved by.
    pub actuator_name: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_angle: DEFAULT_MAX_ANGLE,
            sensor_name: "sensor-1".to_string(),
            actuator_name: "servo-2".to_string(),
        }
    }
}

/// Why a cycle did not command the actuator.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// A collaborator could not be resolved. The process should terminate.
    #[error("fatal: {0}")]
    Fatal(#[source] NeedleError),

    /// The reading or the move failed. Only this cycle is lost.
    #[error("cycle aborted: {0}")]
    Aborted(#[source] NeedleError),
}

/// Polls a sensor and drives an actuator on a fixed cadence.
pub struct FeedbackController<SR, AR> {
    sensors: SR,
    actuators: AR,
    settings: ControllerSettings,
}

impl<SR, AR> FeedbackController<SR, AR>
where
    SR: SensorResolver,
    AR: ActuatorResolver,
{
    /// Create a new controller.
    pub fn new(sensors: SR, actuators: AR, settings: ControllerSettings) -> Self {
        Self {
            sensors,
            actuators,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Run one poll-compute-act iteration.
    ///
    /// Returns the command that was sent. Handles resolved for the cycle are
    /// dropped when it ends.
    ///
    /// # Errors
    ///
    /// See [`CycleError`].
    #[tracing::instrument(skip(self))]
    pub async fn cycle(&self) -> Result<ActuatorCommand, CycleError> {
        let sensor = self
            .sensors
            .resolve_sensor(&self.settings.sensor_name)
            .await
            .map_err(CycleError::Fatal)?;
        let actuator = self
            .actuators
            .resolve_actuator(&self.settings.actuator_name)
            .await
            .map_err(CycleError::Fatal)?;

        let reading = sensor.readings().await.map_err(CycleError::Aborted)?;
        let usage = reading
            .checked_usage()
            .map_err(|err| CycleError::Aborted(err.into()))?;

        let command = ActuatorCommand::from_usage(usage, self.settings.max_angle);
        if !command.is_within(self.settings.max_angle) {
            tracing::warn!(
                angle = command.angle,
                max_angle = self.settings.max_angle,
                usage,
                "commanded angle is outside the actuator range"
            );
        }

        actuator
            .move_to(command)
            .await
            .map_err(CycleError::Aborted)?;

        tracing::info!(
            count = reading.count,
            usage,
            angle = command.angle,
            "needle moved"
        );
        Ok(command)
    }

    /// Run cycles forever.
    ///
    /// # Errors
    ///
    /// Only returns when a cycle fails fatally, with the resolution error.
    pub async fn run(&self) -> Result<(), NeedleError> {
        self.run_until(std::future::pending()).await
    }

    /// Run cycles until `shutdown` completes or a cycle fails fatally.
    ///
    /// The first cycle starts immediately; later ones start `interval` after
    /// the previous start, whatever its outcome. A cycle already in progress
    /// is finished before `shutdown` is observed.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of the first fatal cycle.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), NeedleError>
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.settings.interval.as_secs(),
            sensor = %self.settings.sensor_name,
            actuator = %self.settings.actuator_name,
            "feedback loop started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("feedback loop stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            match self.cycle().await {
                Ok(_) => {}
                Err(CycleError::Aborted(err)) => {
                    tracing::warn!(%err, "cycle aborted, retrying next interval");
                }
                Err(CycleError::Fatal(err)) => {
                    tracing::error!(%err, "failed to resolve resources, stopping feedback loop");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use needlehub_domain::error::{MalformedReading, QueryError, ResolveError};
    use needlehub_domain::reading::Reading;

    #[derive(Clone)]
    enum Script {
        Reading(u64, u64),
        Usage(f64),
        EmptyResult,
    }

    #[derive(Clone)]
    struct ScriptedSensor {
        script: Script,
        reads: Arc<AtomicUsize>,
    }

    impl ReadingSource for ScriptedSensor {
        async fn readings(&self) -> Result<Reading, NeedleError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Reading(count, limit) => Ok(Reading::new(count, limit)),
                Script::Usage(usage) => Ok(Reading::observed(0, usage, 1)),
                Script::EmptyResult => Err(QueryError::EmptyResult.into()),
            }
        }
    }

    struct Sensors {
        sensor: Option<ScriptedSensor>,
        resolved: AtomicUsize,
    }

    impl SensorResolver for Sensors {
        type Sensor = ScriptedSensor;

        async fn resolve_sensor(&self, name: &str) -> Result<ScriptedSensor, NeedleError> {
            self.resolved.fetch_add(1, Ordering::SeqCst);
            self.sensor.clone().ok_or_else(|| {
                ResolveError::NotFound {
                    name: name.to_string(),
                }
                .into()
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingServo {
        moves: Arc<Mutex<Vec<i64>>>,
        fail: bool,
    }

    impl Actuator for RecordingServo {
        async fn move_to(&self, command: ActuatorCommand) -> Result<(), NeedleError> {
            if self.fail {
                return Err(NeedleError::Actuator("servo stalled".into()));
            }
            self.moves.lock().unwrap().push(command.angle);
            Ok(())
        }
    }

    struct Servos {
        servo: Option<RecordingServo>,
    }

    impl ActuatorResolver for Servos {
        type Actuator = RecordingServo;

        async fn resolve_actuator(&self, name: &str) -> Result<RecordingServo, NeedleError> {
            self.servo.clone().ok_or_else(|| {
                ResolveError::NotFound {
                    name: name.to_string(),
                }
                .into()
            })
        }
    }

    struct Harness {
        controller: FeedbackController<Sensors, Servos>,
        reads: Arc<AtomicUsize>,
        moves: Arc<Mutex<Vec<i64>>>,
    }

    fn harness(script: Script) -> Harness {
        let reads = Arc::new(AtomicUsize::new(0));
        let servo = RecordingServo::default();
        let moves = Arc::clone(&servo.moves);
        let controller = FeedbackController::new(
            Sensors {
                sensor: Some(ScriptedSensor {
                    script,
                    reads: Arc::clone(&reads),
                }),
                resolved: AtomicUsize::new(0),
            },
            Servos { servo: Some(servo) },
            ControllerSettings::default(),
        );
        Harness {
            controller,
            reads,
            moves,
        }
    }

    fn moves(harness: &Harness) -> Vec<i64> {
        harness.moves.lock().unwrap().clone()
    }

    #[test]
    fn should_default_to_reference_settings() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.interval, Duration::from_secs(1800));
        assert_eq!(settings.max_angle, 115);
        assert_eq!(settings.sensor_name, "sensor-1");
        assert_eq!(settings.actuator_name, "servo-2");
    }

    #[tokio::test]
    async fn should_move_to_max_angle_when_collection_is_empty() {
        let h = harness(Script::Reading(0, 200));
        let command = h.controller.cycle().await.unwrap();
        assert_eq!(command.angle, 115);
        assert_eq!(moves(&h), vec![115]);
    }

    #[tokio::test]
    async fn should_move_to_zero_when_collection_is_full() {
        let h = harness(Script::Reading(200, 200));
        assert_eq!(h.controller.cycle().await.unwrap().angle, 0);
        assert_eq!(moves(&h), vec![0]);
    }

    #[tokio::test]
    async fn should_pass_negative_angle_through_when_over_limit() {
        let h = harness(Script::Reading(115, 100));
        assert_eq!(h.controller.cycle().await.unwrap().angle, -17);
        assert_eq!(moves(&h), vec![-17]);
    }

    #[tokio::test]
    async fn should_abort_without_moving_when_read_fails() {
        let h = harness(Script::EmptyResult);
        let result = h.controller.cycle().await;
        assert!(matches!(
            result,
            Err(CycleError::Aborted(NeedleError::Query(QueryError::EmptyResult)))
        ));
        assert!(moves(&h).is_empty());
    }

    #[tokio::test]
    async fn should_abort_with_malformed_reading_when_usage_is_not_finite() {
        let h = harness(Script::Usage(f64::INFINITY));
        let result = h.controller.cycle().await;
        assert!(matches!(
            result,
            Err(CycleError::Aborted(NeedleError::MalformedReading(
                MalformedReading::NonFiniteUsage(_)
            )))
        ));
        assert!(moves(&h).is_empty());
    }

    #[tokio::test]
    async fn should_abort_when_actuator_fails() {
        let controller = FeedbackController::new(
            Sensors {
                sensor: Some(ScriptedSensor {
                    script: Script::Reading(1, 2),
                    reads: Arc::new(AtomicUsize::new(0)),
                }),
                resolved: AtomicUsize::new(0),
            },
            Servos {
                servo: Some(RecordingServo {
                    fail: true,
                    ..RecordingServo::default()
                }),
            },
            ControllerSettings::default(),
        );
        assert!(matches!(
            controller.cycle().await,
            Err(CycleError::Aborted(NeedleError::Actuator(_)))
        ));
    }

    #[tokio::test]
    async fn should_fail_fatally_when_sensor_cannot_be_resolved() {
        let controller = FeedbackController::new(
            Sensors {
                sensor: None,
                resolved: AtomicUsize::new(0),
            },
            Servos {
                servo: Some(RecordingServo::default()),
            },
            ControllerSettings::default(),
        );
        assert!(matches!(
            controller.cycle().await,
            Err(CycleError::Fatal(NeedleError::Resolve(_)))
        ));
    }

    #[tokio::test]
    async fn should_fail_fatally_without_reading_when_actuator_cannot_be_resolved() {
        let reads = Arc::new(AtomicUsize::new(0));
        let controller = FeedbackController::new(
            Sensors {
                sensor: Some(ScriptedSensor {
                    script: Script::Reading(1, 2),
                    reads: Arc::clone(&reads),
                }),
                resolved: AtomicUsize::new(0),
            },
            Servos { servo: None },
            ControllerSettings::default(),
        );
        assert!(matches!(
            controller.cycle().await,
            Err(CycleError::Fatal(_))
        ));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_one_cycle_per_interval_until_shutdown() {
        let h = Arc::new(harness(Script::Reading(50, 100)));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn({
            let h = Arc::clone(&h);
            async move {
                h.controller
                    .run_until(async {
                        let _ = rx.await;
                    })
                    .await
            }
        });

        // Cycles start at 0, 30 and 60 minutes.
        tokio::time::sleep(Duration::from_secs(61 * 60)).await;
        tx.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(moves(&h), vec![58, 58, 58]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_looping_after_aborted_cycles() {
        let h = Arc::new(harness(Script::EmptyResult));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn({
            let h = Arc::clone(&h);
            async move {
                h.controller
                    .run_until(async {
                        let _ = rx.await;
                    })
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(91 * 60)).await;
        tx.send(()).unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(h.reads.load(Ordering::SeqCst), 4);
        assert!(moves(&h).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_loop_on_fatal_resolution_error() {
        let controller = FeedbackController::new(
            Sensors {
                sensor: None,
                resolved: AtomicUsize::new(0),
            },
            Servos {
                servo: Some(RecordingServo::default()),
            },
            ControllerSettings::default(),
        );

        let result = controller.run().await;
        assert!(matches!(result, Err(NeedleError::Resolve(_))));
        assert_eq!(controller.sensors.resolved.load(Ordering::SeqCst), 1);
    }
}
