//! Shared corpus generators for detector integration tests

#![allow(dead_code)]

use growguard_ml::{SensorReading, TaggedReading, TrainingCorpus};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Greenhouse readings inside healthy ranges
pub struct HealthyRoom {
    rng: StdRng,
}

impl HealthyRoom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reading(&mut self) -> SensorReading {
        SensorReading::new(
            self.rng.gen_range(20.0..26.0),
            self.rng.gen_range(55.0..75.0),
            self.rng.gen_range(6.0..6.8),
        )
        .unwrap()
    }

    pub fn readings(&mut self, n: usize) -> Vec<SensorReading> {
        (0..n).map(|_| self.reading()).collect()
    }

    /// Healthy air with an acid-dosing failure: pH pinned at `ph`
    pub fn with_ph(&mut self, ph: f64) -> SensorReading {
        let normal = self.reading();
        SensorReading::new(normal.temperature(), normal.humidity(), ph).unwrap()
    }
}

/// 200 healthy rows followed by 10 rows with pH 12
pub fn ph_spike_corpus() -> TrainingCorpus {
    let mut room = HealthyRoom::new(42);
    let mut readings = room.readings(200);
    readings.extend((0..10).map(|_| room.with_ph(12.0)));
    TrainingCorpus::from_readings(readings)
}

/// Tagged rows spread over a few plants
pub fn tagged(readings: &[SensorReading]) -> TrainingCorpus {
    TrainingCorpus::new(
        readings
            .iter()
            .enumerate()
            .map(|(i, r)| TaggedReading {
                reading: *r,
                plant_id: Some(format!("{}", i % 3 + 1)),
                date: Some(format!("2024-10-{:02}", i % 28 + 1)),
            })
            .collect(),
    )
}

pub fn mean_and_population_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
