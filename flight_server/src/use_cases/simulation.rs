// Simulation task: sole owner of every flight record.

use super::types::{ControlState, SimulationCommand};
use crate::domain::catalog;
use crate::domain::ports::Clock;
use crate::domain::systems::physics;
use crate::domain::{
    FlightPlan, FlightReport, FlightState, SimulationSnapshot, TelemetryRecorder, TelemetrySample,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const MIN_SPEED_MULTIPLIER: f64 = 0.1;
pub const MAX_SPEED_MULTIPLIER: f64 = 1000.0;

/// Shared configuration for spawning the simulation and its workers.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Wall-clock period of the tick loop, independent of the multiplier.
    pub tick_interval: Duration,
    /// Capacity for inbound control commands.
    pub command_channel_capacity: usize,
    /// Initial time multiplier.
    pub speed_multiplier: f64,
    /// Whether ticks are applied from the start.
    pub autostart: bool,
    /// Simulated seconds between telemetry samples.
    pub telemetry_interval: f64,
    /// Samples kept per flight before decimation.
    pub telemetry_capacity: usize,
    /// Minimum gap between two snapshot persists.
    pub persist_interval: Duration,
    /// How often failed report exports are retried.
    pub report_retry_interval: Duration,
}

/// Clamps a requested multiplier into the supported range.
pub fn clamp_speed_multiplier(multiplier: f64) -> f64 {
    multiplier.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER)
}

struct FlightRecord {
    state: FlightState,
    telemetry: TelemetryRecorder,
}

/// The flight arena plus the scheduler flags.
///
/// Only the simulation task touches this; everyone else sees the
/// [`SimulationSnapshot`] it publishes after each change.
pub struct Simulation<C> {
    clock: C,
    flights: Vec<FlightRecord>,
    // Uppercased callsign -> index into `flights`.
    index: HashMap<String, usize>,
    running: bool,
    speed_multiplier: f64,
    tick: u64,
    generation: u64,
    simulated_seconds: f64,
    snapshot_tx: watch::Sender<Arc<SimulationSnapshot>>,
    report_tx: mpsc::UnboundedSender<FlightReport>,
    persist_now: Arc<Notify>,
}

impl<C: Clock> Simulation<C> {
    pub fn new(
        plans: &[FlightPlan],
        settings: &SimulationSettings,
        clock: C,
        report_tx: mpsc::UnboundedSender<FlightReport>,
        persist_now: Arc<Notify>,
    ) -> Self {
        let now = clock.now();
        let mut flights = Vec::with_capacity(plans.len());
        let mut index = HashMap::with_capacity(plans.len());

        for plan in plans {
            let key = plan.callsign.to_ascii_uppercase();
            if index.contains_key(&key) {
                warn!(callsign = %plan.callsign, "duplicate callsign skipped");
                continue;
            }
            if catalog::find(&plan.aircraft).is_none() {
                warn!(
                    callsign = %plan.callsign,
                    aircraft = %plan.aircraft,
                    fallback = catalog::DEFAULT_PROFILE_KEY,
                    "unknown aircraft, using default profile"
                );
            }
            index.insert(key, flights.len());
            flights.push(FlightRecord {
                state: FlightState::new(plan, now),
                telemetry: TelemetryRecorder::new(settings.telemetry_interval, settings.telemetry_capacity),
            });
        }

        let initial = SimulationSnapshot {
            generation: 0,
            tick: 0,
            running: settings.autostart,
            speed_multiplier: clamp_speed_multiplier(settings.speed_multiplier),
            simulated_seconds: 0.0,
            taken_at: now,
            flights: flights.iter().map(|record| record.state.clone()).collect(),
        };
        let (snapshot_tx, _snapshot_rx) = watch::channel(Arc::new(initial));

        Self {
            clock,
            flights,
            index,
            running: settings.autostart,
            speed_multiplier: clamp_speed_multiplier(settings.speed_multiplier),
            tick: 0,
            generation: 0,
            simulated_seconds: 0.0,
            snapshot_tx,
            report_tx,
            persist_now,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SimulationSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn control_state(&self) -> ControlState {
        ControlState {
            running: self.running,
            speed_multiplier: self.speed_multiplier,
        }
    }

    /// Applies `wall_delta` scaled by the multiplier to every unfinished flight.
    ///
    /// While stopped the delta is dropped, so resuming never replays the pause.
    pub fn tick(&mut self, wall_delta: Duration) {
        if !self.running {
            return;
        }

        let dt = wall_delta.as_secs_f64() * self.speed_multiplier;
        let now = self.clock.now();
        self.tick += 1;
        self.simulated_seconds += dt;

        for record in &mut self.flights {
            if record.state.is_arrived() {
                continue;
            }
            let outcome = physics::advance(&mut record.state, dt, now);
            record.telemetry.observe(&record.state, outcome.from, dt);

            if outcome.transitioned() {
                info!(
                    callsign = %record.state.callsign,
                    from = %outcome.from,
                    to = %outcome.to,
                    "phase transition"
                );
            }
            if outcome.arrived() {
                info!(
                    callsign = %record.state.callsign,
                    flight_time = record.state.flight_time,
                    fuel_consumed = record.state.fuel_consumed,
                    "flight arrived"
                );
                let report = FlightReport::build(&record.state, &record.telemetry);
                if self.report_tx.send(report).is_err() {
                    warn!(callsign = %record.state.callsign, "report worker gone, report dropped");
                }
            }
        }

        self.publish();
    }

    pub fn handle(&mut self, command: SimulationCommand) {
        match command {
            SimulationCommand::Start { reply } => {
                let _ = reply.send(self.start());
            }
            SimulationCommand::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            SimulationCommand::SetSpeed { multiplier, reply } => {
                let _ = reply.send(self.set_speed(multiplier));
            }
            SimulationCommand::Reset { reply } => {
                let _ = reply.send(self.reset());
            }
            SimulationCommand::Telemetry { callsign, reply } => {
                let _ = reply.send(self.telemetry(&callsign));
            }
        }
    }

    pub fn start(&mut self) -> ControlState {
        if !self.running {
            self.running = true;
            info!(speed_multiplier = self.speed_multiplier, "simulation started");
            self.publish();
        }
        self.control_state()
    }

    pub fn stop(&mut self) -> ControlState {
        if self.running {
            self.running = false;
            info!(tick = self.tick, "simulation stopped");
            self.publish();
        }
        self.control_state()
    }

    /// Sets the clamped multiplier; NaN leaves the current value in place.
    pub fn set_speed(&mut self, multiplier: f64) -> ControlState {
        if multiplier.is_nan() {
            warn!("ignoring NaN speed multiplier");
            return self.control_state();
        }
        let applied = clamp_speed_multiplier(multiplier);
        if applied != self.speed_multiplier {
            info!(requested = multiplier, applied, "speed multiplier changed");
            self.speed_multiplier = applied;
            self.publish();
        }
        self.control_state()
    }

    /// Puts every flight back in Preflight with a start time relative to now.
    pub fn reset(&mut self) -> ControlState {
        let now = self.clock.now();
        for record in &mut self.flights {
            record.state.reset(now);
            record.telemetry.clear();
        }
        self.simulated_seconds = 0.0;
        info!(flights = self.flights.len(), "simulation reset");
        self.publish();
        self.persist_now.notify_one();
        self.control_state()
    }

    pub fn telemetry(&self, callsign: &str) -> Option<Vec<TelemetrySample>> {
        self.index
            .get(&callsign.to_ascii_uppercase())
            .map(|&i| self.flights[i].telemetry.samples().to_vec())
    }

    fn publish(&mut self) {
        self.generation += 1;
        let snapshot = SimulationSnapshot {
            generation: self.generation,
            tick: self.tick,
            running: self.running,
            speed_multiplier: self.speed_multiplier,
            simulated_seconds: self.simulated_seconds,
            taken_at: self.clock.now(),
            flights: self.flights.iter().map(|record| record.state.clone()).collect(),
        };
        self.snapshot_tx.send_replace(Arc::new(snapshot));
    }
}

/// Drives the fixed-cadence loop until `shutdown` fires or every handle is gone.
pub async fn simulation_task<C: Clock>(
    mut simulation: Simulation<C>,
    mut commands: mpsc::Receiver<SimulationCommand>,
    tick_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                break;
            }
            command = commands.recv() => {
                match command {
                    Some(command) => simulation.handle(command),
                    None => break,
                }
            }
            _ = interval.tick() => {
                let now = Instant::now();
                simulation.tick(now - last_tick);
                last_tick = now;
            }
        }
    }

    debug!(tick = simulation.tick, "simulation task stopped");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::FlightPhase;
    use crate::domain::geo::{self, GeoPoint};
    use crate::domain::state::tests::{epoch, plan};
    use chrono::{DateTime, TimeDelta, Utc};
    use std::sync::Mutex;

    #[derive(Clone)]
    pub(crate) struct FixedClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        pub(crate) fn at(now: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        pub(crate) fn advance(&self, delta: TimeDelta) {
            let mut now = self.now.lock().expect("clock mutex poisoned");
            *now += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock mutex poisoned")
        }
    }

    pub(crate) fn settings(autostart: bool, speed_multiplier: f64) -> SimulationSettings {
        SimulationSettings {
            tick_interval: Duration::from_millis(50),
            command_channel_capacity: 16,
            speed_multiplier,
            autostart,
            telemetry_interval: 30.0,
            telemetry_capacity: 2000,
            persist_interval: Duration::from_millis(20),
            report_retry_interval: Duration::from_millis(20),
        }
    }

    fn simulation(
        plans: &[FlightPlan],
        autostart: bool,
        speed_multiplier: f64,
    ) -> (Simulation<FixedClock>, mpsc::UnboundedReceiver<FlightReport>, Arc<Notify>) {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let persist_now = Arc::new(Notify::new());
        let simulation = Simulation::new(
            plans,
            &settings(autostart, speed_multiplier),
            FixedClock::at(epoch()),
            report_tx,
            persist_now.clone(),
        );
        (simulation, report_rx, persist_now)
    }

    const TICK: Duration = Duration::from_millis(50);

    #[test]
    fn stopped_simulation_does_not_advance() {
        let (mut sim, _reports, _) = simulation(&[plan("TST1", "A320", (1.0, 1.0), 0)], false, 100.0);
        let rx = sim.subscribe();

        sim.tick(Duration::from_secs(3600));
        assert_eq!(rx.borrow().generation, 0);
        assert_eq!(rx.borrow().flights[0].phase, FlightPhase::Preflight);

        sim.start();
        sim.tick(TICK);
        let snapshot = rx.borrow().clone();
        assert!(snapshot.running);
        assert_eq!(snapshot.tick, 1);
        assert!((snapshot.simulated_seconds - 5.0).abs() < 1e-9);
        assert_eq!(snapshot.flights[0].phase, FlightPhase::Takeoff);
    }

    #[test]
    fn stop_freezes_every_flight() {
        let (mut sim, _reports, _) = simulation(&[plan("TST1", "A320", (1.0, 1.0), 0)], true, 100.0);
        let rx = sim.subscribe();
        for _ in 0..20 {
            sim.tick(TICK);
        }
        sim.stop();
        let frozen = rx.borrow().flights.clone();
        for _ in 0..20 {
            sim.tick(TICK);
        }
        assert_eq!(rx.borrow().flights, frozen);
        assert!(!rx.borrow().running);
    }

    #[test]
    fn speed_multiplier_is_clamped() {
        let (mut sim, _reports, _) = simulation(&[], true, 1.0);
        assert_eq!(sim.set_speed(0.0).speed_multiplier, MIN_SPEED_MULTIPLIER);
        assert_eq!(sim.set_speed(5000.0).speed_multiplier, MAX_SPEED_MULTIPLIER);
        assert_eq!(sim.set_speed(f64::INFINITY).speed_multiplier, MAX_SPEED_MULTIPLIER);
        assert_eq!(sim.set_speed(12.5).speed_multiplier, 12.5);
        assert_eq!(sim.set_speed(f64::NAN).speed_multiplier, 12.5);
        assert_eq!(sim.subscribe().borrow().speed_multiplier, 12.5);
    }

    #[test]
    fn long_haul_flight_arrives_and_is_reported() {
        // 9,000 km due east along the equator, 50 ms ticks at 100x.
        let lon = (9_000_000.0 / geo::EARTH_RADIUS).to_degrees();
        let (mut sim, mut reports, _) = simulation(&[plan("LH1", "Boeing 777-300ER", (0.0, lon), 0)], true, 100.0);
        let rx = sim.subscribe();

        let mut last_phase = FlightPhase::Preflight;
        for _ in 0..50_000 {
            sim.tick(TICK);
            let snapshot = rx.borrow().clone();
            let flight = &snapshot.flights[0];
            assert!((0.0..=1.0).contains(&flight.progress));
            assert!(flight.phase >= last_phase);
            last_phase = flight.phase;
            if flight.is_arrived() {
                break;
            }
        }
        assert_eq!(last_phase, FlightPhase::Arrived);

        let report = reports.try_recv().expect("arrival report");
        let route = geo::distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, lon));
        assert_eq!(report.callsign, "LH1");
        assert!((report.distance_flown - route).abs() / route < 0.05);
        assert!(report.fuel_consumed > 0.0);
        let cruise = catalog::lookup("Boeing 777-300ER").cruise_altitude;
        assert!((report.statistics.max_altitude - cruise).abs() / cruise < 0.05);
        assert!(!report.samples.is_empty());
        assert!(reports.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_is_idempotent_and_requests_a_persist() {
        let (mut sim, _reports, persist_now) =
            simulation(&[plan("TST1", "A320", (1.0, 1.0), 120), plan("TST2", "A320", (2.0, 1.0), 0)], true, 100.0);
        let rx = sim.subscribe();
        for _ in 0..40 {
            sim.tick(TICK);
        }
        assert!(rx.borrow().flights[1].phase > FlightPhase::Preflight);

        sim.clock.advance(TimeDelta::minutes(5));
        sim.reset();
        let first = rx.borrow().flights.clone();
        sim.reset();
        let second = rx.borrow().flights.clone();

        assert_eq!(first, second);
        assert!(first.iter().all(|f| f.phase == FlightPhase::Preflight));
        assert_eq!(first[0].scheduled_start, epoch() + TimeDelta::minutes(5) + TimeDelta::seconds(120));
        assert!(sim.telemetry("TST2").is_some_and(|samples| samples.is_empty()));

        tokio::time::timeout(Duration::from_millis(50), persist_now.notified())
            .await
            .expect("reset should request an immediate persist");
    }

    #[test]
    fn duplicate_callsigns_are_skipped() {
        let (sim, _reports, _) = simulation(
            &[plan("TST1", "A320", (1.0, 1.0), 0), plan("tst1", "B738", (2.0, 2.0), 0)],
            true,
            1.0,
        );
        let snapshot = sim.subscribe().borrow().clone();
        assert_eq!(snapshot.flights.len(), 1);
        assert_eq!(snapshot.flights[0].profile_key, "Airbus A320");
    }

    #[test]
    fn telemetry_is_looked_up_by_callsign() {
        let (mut sim, _reports, _) = simulation(&[plan("TST1", "A320", (1.0, 1.0), 0)], true, 100.0);
        for _ in 0..10 {
            sim.tick(TICK);
        }
        let samples = sim.telemetry("tst1").expect("known flight");
        assert!(!samples.is_empty());
        assert_eq!(samples[0].phase, FlightPhase::Takeoff);
        assert!(sim.telemetry("NOPE").is_none());
    }
}
