//! Rolling statistics for the graphs panel.

use std::collections::VecDeque;

use crate::reporting::EpochReport;

/// Keeps the most recent `capacity` samples of one metric.
pub struct RingBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

pub struct SimStats {
    // within the running epoch, sampled every `sample_interval` ticks
    pub alive: RingBuffer,
    pub best_fitness: RingBuffer,
    // one sample per finished epoch
    pub epoch_best: RingBuffer,
    pub epoch_mean: RingBuffer,
    pub epoch_lap_rate: RingBuffer,

    pub sample_interval: u32,
    pub tick_counter: u32,
}

impl SimStats {
    pub fn new(capacity: usize, sample_interval: u32) -> Self {
        Self {
            alive: RingBuffer::new(capacity),
            best_fitness: RingBuffer::new(capacity),
            epoch_best: RingBuffer::new(capacity),
            epoch_mean: RingBuffer::new(capacity),
            epoch_lap_rate: RingBuffer::new(capacity),
            sample_interval: sample_interval.max(1),
            tick_counter: 0,
        }
    }

    pub fn record_tick(&mut self, alive_count: usize, best_fitness: f32) {
        self.tick_counter += 1;
        if self.tick_counter % self.sample_interval != 0 {
            return;
        }
        self.alive.push(alive_count as f32);
        self.best_fitness.push(best_fitness);
    }

    /// Fold a finished epoch in and restart the per-tick series.
    pub fn record_epoch(&mut self, report: &EpochReport) {
        self.epoch_best.push(report.fitness.max as f32);
        self.epoch_mean.push(report.fitness.mean as f32);
        self.epoch_lap_rate.push(report.lap_rate as f32);
        self.alive.clear();
        self.best_fitness.clear();
        self.tick_counter = 0;
    }
}
