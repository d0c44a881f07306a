//! Writes `battery_sample.csv` and `strain_sample.csv` in the logger export
//! layout the backend accepts, for trying the dashboard without field data.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

const INTERVAL_MINUTES: i64 = 10;
const DAYS: i64 = 7;
const STRAIN_CHANNELS: usize = 17;
/// Logger value for a missing reading.
const MISSING: f64 = -9999.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// `M/D/YYYY HH:MM`, as the logger exports it.
fn logger_timestamp(at: NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y %H:%M").to_string()
}

/// Fraction of a day elapsed, for the daily temperature cycle.
fn day_phase(step: i64) -> f64 {
    let per_day = 24 * 60 / INTERVAL_MINUTES;
    (step % per_day) as f64 / per_day as f64
}

fn write_battery(path: &str, start: NaiveDateTime, steps: i64, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["TIMESTAMP", "RECORD", "BattV_Min"])?;

    for step in 0..steps {
        let at = start + Duration::minutes(step * INTERVAL_MINUTES);
        // Solar charging during the day, slow drain overnight.
        let solar = (day_phase(step) * std::f64::consts::TAU).sin().max(0.0) * 0.6;
        let volts = 12.4 + solar - step as f64 * 0.00005 + rng.gauss(0.0, 0.02);
        writer.write_record([
            logger_timestamp(at),
            step.to_string(),
            format!("{volts:.3}"),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_strain(path: &str, start: NaiveDateTime, steps: i64, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let mut header = vec!["TIMESTAMP".to_string(), "RECORD".to_string()];
    header.extend((1..=STRAIN_CHANNELS).map(|n| format!("Strain({n})")));
    writer.write_record(&header)?;

    let baselines: Vec<f64> = (0..STRAIN_CHANNELS)
        .map(|_| rng.gauss(150.0, 40.0))
        .collect();

    for step in 0..steps {
        let at = start + Duration::minutes(step * INTERVAL_MINUTES);
        let thermal = (day_phase(step) * std::f64::consts::TAU).sin() * 12.0;

        let mut row = vec![logger_timestamp(at), step.to_string()];
        for (channel, baseline) in baselines.iter().enumerate() {
            let roll = rng.next_f64();
            let value = if roll < 0.002 {
                MISSING
            } else if roll < 0.006 {
                // Heavy-load spike for the anomaly detector to find.
                baseline + thermal + rng.gauss(120.0, 20.0)
            } else {
                baseline + thermal * (1.0 + channel as f64 * 0.05) + rng.gauss(0.0, 1.5)
            };
            row.push(format!("{value:.2}"));
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let steps = DAYS * 24 * 60 / INTERVAL_MINUTES;

    write_battery("battery_sample.csv", start, steps, &mut rng)?;
    write_strain("strain_sample.csv", start, steps, &mut rng)?;

    println!(
        "Wrote {steps} rows to battery_sample.csv and strain_sample.csv ({STRAIN_CHANNELS} strain channels)"
    );
    Ok(())
}
