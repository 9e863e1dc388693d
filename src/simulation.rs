use ::rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::agent::{Agent, AgentEvent};
use crate::brain::{NeuralPolicy, Policy};
use crate::config::{self, SimConfig};
use crate::controller::{Controller, HumanController, InputState, PolicyController};
use crate::error::SimError;
use crate::reporting::{AgentResult, EpochReport};
use crate::track::Course;

pub type PolicyAgent = Agent<PolicyController<NeuralPolicy>>;
pub type HumanAgent = Agent<HumanController>;

/// External driver for the per-agent kernel: owns the course and a population,
/// steps everyone once per tick and rolls epochs over.
pub struct SimState {
    pub config: SimConfig,
    pub course: Course,
    pub population: Vec<PolicyAgent>,
    pub player: Option<HumanAgent>,
    pub rng: ChaCha8Rng,
    pub epoch: u32,
    /// Seed the current population's policies were sampled from.
    pub epoch_seed: u64,
    pub epoch_tick: u64,
    pub tick_count: u64,
    pub paused: bool,
    pub speed_multiplier: f32,
    pub show_rays: bool,
    pub last_report: Option<EpochReport>,
}

impl SimState {
    pub fn new(config: SimConfig, with_player: bool) -> Result<Self, SimError> {
        config.validate()?;
        if config.population == 0 && !with_player {
            return Err(SimError::InvalidConfig(
                "nothing to simulate: population is 0 and no player".to_string(),
            ));
        }

        let course = Course::from_config(&config.course)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let epoch_seed = rng.gen();
        let population = sample_policies(epoch_seed, config.population)
            .into_iter()
            .map(|policy| Agent::new(config.agent.clone(), PolicyController::new(policy)))
            .collect();
        let player = with_player.then(|| Agent::new(config.agent.clone(), HumanController));

        info!(
            population = config.population,
            player = with_player,
            seed = config.seed,
            gates = course.rewards.len(),
            "simulation ready"
        );

        Ok(Self {
            config,
            course,
            population,
            player,
            rng,
            epoch: 0,
            epoch_seed,
            epoch_tick: 0,
            tick_count: 0,
            paused: false,
            speed_multiplier: 1.0,
            show_rays: false,
            last_report: None,
        })
    }

    pub fn alive_count(&self) -> usize {
        let population = self.population.iter().filter(|a| a.is_alive()).count();
        population + self.player.iter().filter(|a| a.is_alive()).count()
    }

    /// Highest fitness in the current epoch, living or dead.
    pub fn best_fitness(&self) -> f32 {
        self.population
            .iter()
            .map(|a| a.fitness())
            .chain(self.player.iter().map(|a| a.fitness()))
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Advance every agent by one fixed step. Returns the epoch report when
    /// this tick ended the epoch; agents are already reset by then.
    pub fn tick(&mut self, input: InputState) -> Result<Option<EpochReport>, SimError> {
        let dt = config::FIXED_DT;

        for (idx, agent) in self.population.iter_mut().enumerate() {
            if let Some(event) = agent.update(&self.course, dt, InputState::default())? {
                log_event(idx, self.epoch, event);
            }
        }
        if let Some(player) = self.player.as_mut() {
            if let Some(event) = player.update(&self.course, dt, input)? {
                log_event(self.population.len(), self.epoch, event);
            }
        }

        self.epoch_tick += 1;
        self.tick_count += 1;

        let timed_out = self.epoch_tick >= self.config.max_epoch_ticks;
        if self.alive_count() == 0 || timed_out {
            return Ok(Some(self.finish_epoch(timed_out)));
        }
        Ok(None)
    }

    /// Run the current epoch to completion without player input.
    pub fn run_epoch(&mut self) -> Result<EpochReport, SimError> {
        loop {
            if let Some(report) = self.tick(InputState::default())? {
                return Ok(report);
            }
        }
    }

    fn finish_epoch(&mut self, timed_out: bool) -> EpochReport {
        let mut results: Vec<AgentResult> = self
            .population
            .iter()
            .enumerate()
            .map(|(idx, agent)| agent_result(idx, agent.controller().policy().kind(), agent))
            .collect();
        if let Some(player) = &self.player {
            results.push(agent_result(self.population.len(), "human", player));
        }

        let report = EpochReport::new(self.epoch, self.epoch_seed, self.epoch_tick, timed_out, results);
        info!(
            epoch = report.epoch,
            ticks = report.ticks,
            timed_out,
            best = report.fitness.max,
            mean = report.fitness.mean,
            lap_rate = report.lap_rate,
            "epoch finished"
        );

        self.start_next_epoch();
        self.last_report = Some(report.clone());
        report
    }

    /// Reset every agent and hand the population freshly sampled policies.
    fn start_next_epoch(&mut self) {
        self.epoch += 1;
        self.epoch_tick = 0;
        self.epoch_seed = self.rng.gen();

        let policies = sample_policies(self.epoch_seed, self.population.len());
        for (agent, policy) in self.population.iter_mut().zip(policies) {
            agent.controller_mut().replace_policy(policy);
            agent.reset();
        }
        if let Some(player) = self.player.as_mut() {
            player.reset();
        }
    }
}

fn sample_policies(seed: u64, count: usize) -> Vec<NeuralPolicy> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| NeuralPolicy::random(&mut rng)).collect()
}

fn agent_result<C: Controller>(index: usize, controller: &str, agent: &Agent<C>) -> AgentResult {
    let progress = agent.progress();
    AgentResult {
        index,
        controller: controller.to_string(),
        fitness: progress.fitness,
        gates_captured: progress.gates_captured,
        laps: progress.laps,
        ticks_alive: agent.ticks_alive(),
        death: agent.death_cause(),
    }
}

fn log_event(index: usize, epoch: u32, event: AgentEvent) {
    match event {
        AgentEvent::Died(cause) => debug!(agent = index, epoch, ?cause, "agent died"),
        AgentEvent::Gate(capture) if capture.lap_completed => {
            debug!(agent = index, epoch, "lap completed")
        }
        AgentEvent::Gate(_) => {}
    }
}
