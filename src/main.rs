use atomic_float::AtomicF64;
use clap::Parser;
use photon_emission::{
    units::energy_to_wavelength, vec3::Vector, vertex::PointSource, EmissionRecord, EngineConfig,
    PhotonEmissionEngine,
};
use std::sync::{
    atomic::{AtomicU64, Ordering::Relaxed},
    Arc,
};
use std::thread;

/// Emits primary photons from a calibrated source, one engine per worker
/// thread, and histograms their energies.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON engine configuration; the built-in blue LED is used without one
    #[clap(short, long)]
    config: Option<String>,

    /// Number of events to emit, split across the workers
    #[clap(short, long, default_value_t = 1_000_000)]
    events: u64,

    /// Worker threads, defaults to the number of CPUs
    #[clap(short, long)]
    threads: Option<usize>,

    /// Master seed, overrides the configuration's
    #[clap(short, long)]
    seed: Option<u64>,

    /// Number of channels of the energy spectrum
    #[clap(long, default_value_t = 1024)]
    channels: usize,

    /// Upper edge of the energy spectrum, in eV
    #[clap(long, default_value_t = 4.0)]
    max_energy: f64,

    /// X coordinate of the emitter
    #[clap(long, default_value_t = 0.0)]
    rx: f64,
    /// Y coordinate of the emitter
    #[clap(long, default_value_t = 0.0)]
    ry: f64,
    /// Z coordinate of the emitter
    #[clap(long, default_value_t = 0.0)]
    rz: f64,

    /// Write the run summary and spectrum to this JSON file
    #[clap(short, long)]
    output: Option<String>,

    /// Log engine construction details
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Default)]
struct EmissionStatistics {
    energy_sum: AtomicF64,
    energy_square_sum: AtomicF64,
    /// Sum of the direction's z component
    axis_cosine_sum: AtomicF64,
    emitted: AtomicU64,
    failed: AtomicU64,
    out_of_range: AtomicU64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    check_max_energy(args.max_energy)?;
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let channel_count = args.channels.max(1);
    tracing::info!(
        events = args.events,
        threads,
        seed = ?config.seed,
        region = %config.region,
        "starting emission run"
    );

    // Engines are built up front so configuration errors abort the run
    // before any thread starts.
    let emitter = PointSource::new(Vector::new(args.rx, args.ry, args.rz));
    let engines = (0..threads)
        .map(|worker| config.build_engine(emitter, worker as u64))
        .collect::<Result<Vec<_>, _>>()?;

    let channels: Arc<Vec<AtomicU64>> =
        Arc::new((0..channel_count).map(|_| AtomicU64::new(0)).collect());
    let statistics = Arc::new(EmissionStatistics::default());
    let start = instant::Instant::now();

    let handles: Vec<_> = engines
        .into_iter()
        .enumerate()
        .map(|(worker, engine)| {
            let share = args.events / threads as u64
                + u64::from((worker as u64) < args.events % threads as u64);
            let channels = channels.clone();
            let statistics = statistics.clone();
            let max_energy = args.max_energy;
            thread::spawn(move || {
                run_emission_cycles(engine, share, max_energy, &channels, &statistics)
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("an emission worker panicked");
        }
    }
    let elapsed = start.elapsed().as_secs_f64();

    let emitted = statistics.emitted.load(Relaxed);
    let failed = statistics.failed.load(Relaxed);
    let mean_energy = statistics.energy_sum.load(Relaxed) / emitted.max(1) as f64;
    let energy_deviation = (statistics.energy_square_sum.load(Relaxed) / emitted.max(1) as f64
        - mean_energy * mean_energy)
        .max(0.0)
        .sqrt();
    let mean_axis_cosine = statistics.axis_cosine_sum.load(Relaxed) / emitted.max(1) as f64;
    let spectrum: Vec<u64> = channels.iter().map(|ch| ch.load(Relaxed)).collect();
    let peak_wavelength_nm = peak_wavelength(&spectrum, args.max_energy);
    let rate = if elapsed == 0.0 {
        0.0
    } else {
        emitted as f64 / elapsed
    };
    tracing::info!(
        emitted,
        failed,
        out_of_range = statistics.out_of_range.load(Relaxed),
        mean_energy,
        energy_deviation,
        mean_axis_cosine,
        peak_wavelength_nm = ?peak_wavelength_nm,
        "run finished in {:.3} s ({})",
        elapsed,
        format_rate(rate)
    );

    if let Some(path) = &args.output {
        let summary = json::object! {
            "configuration" => json::parse(&config.to_json())?,
            "emitted" => emitted,
            "failed" => failed,
            "mean_energy_ev" => mean_energy,
            "energy_deviation_ev" => energy_deviation,
            "mean_axis_cosine" => mean_axis_cosine,
            "peak_wavelength_nm" => peak_wavelength_nm
                .map_or(json::JsonValue::Null, json::JsonValue::from),
            "max_energy_ev" => args.max_energy,
            "spectrum" => spectrum,
        };
        std::fs::write(path, summary.pretty(2))?;
        tracing::info!(path = %path, "summary written");
    }
    Ok(())
}

fn run_emission_cycles(
    mut engine: PhotonEmissionEngine<PointSource>,
    cycle_count: u64,
    max_energy: f64,
    channels: &Arc<Vec<AtomicU64>>,
    statistics: &Arc<EmissionStatistics>,
) {
    let mut energy_sum = 0.0;
    let mut energy_square_sum = 0.0;
    let mut axis_cosine_sum = 0.0;
    let mut out_of_range = 0;

    for _ in 0..cycle_count {
        let EmissionRecord {
            kinetic_energy,
            direction,
            ..
        } = match engine.emit_one() {
            Ok(record) => record,
            // dropped event; the engine keeps count
            Err(_) => continue,
        };
        energy_sum += kinetic_energy;
        energy_square_sum += kinetic_energy * kinetic_energy;
        axis_cosine_sum += direction.z;

        match channel_index(kinetic_energy, max_energy, channels.len()) {
            Some(idx) => {
                channels[idx].fetch_add(1, Relaxed);
            }
            None => out_of_range += 1,
        }
    }

    statistics.energy_sum.fetch_add(energy_sum, Relaxed);
    statistics
        .energy_square_sum
        .fetch_add(energy_square_sum, Relaxed);
    statistics.axis_cosine_sum.fetch_add(axis_cosine_sum, Relaxed);
    statistics.emitted.fetch_add(engine.emitted(), Relaxed);
    statistics.failed.fetch_add(engine.failures(), Relaxed);
    statistics.out_of_range.fetch_add(out_of_range, Relaxed);
}

fn check_max_energy(max_energy: f64) -> Result<(), String> {
    if max_energy > 0.0 && max_energy.is_finite() {
        Ok(())
    } else {
        Err(format!(
            "--max-energy must be positive and finite, got {}",
            max_energy
        ))
    }
}

/// Channel of `energy` in a spectrum of `channel_count` equal channels over
/// `[0, max_energy)`. `None` outside that range.
fn channel_index(energy: f64, max_energy: f64, channel_count: usize) -> Option<usize> {
    if channel_count == 0 || !(energy >= 0.0 && energy < max_energy) {
        return None;
    }
    let idx = (energy / max_energy * channel_count as f64).floor() as usize;
    Some(idx.min(channel_count - 1))
}

/// Wavelength at the center of the fullest channel, `None` for an empty
/// spectrum.
fn peak_wavelength(spectrum: &[u64], max_energy: f64) -> Option<f64> {
    let (idx, &count) = spectrum
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| *count)?;
    if count == 0 {
        return None;
    }
    let channel_width = max_energy / spectrum.len() as f64;
    Some(energy_to_wavelength((idx as f64 + 0.5) * channel_width))
}

fn format_rate(rate: f64) -> String {
    if rate > 1_000_000.0 {
        format!("{:3.2}M/s", rate / 1_000_000.0)
    } else if rate > 1000.0 {
        format!("{:3.2}k/s", rate / 1000.0)
    } else {
        format!("{:3.2}/s", rate.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energies_fall_in_their_channel() {
        assert_eq!(channel_index(0.0, 4.0, 8), Some(0));
        assert_eq!(channel_index(0.49, 4.0, 8), Some(0));
        assert_eq!(channel_index(0.5, 4.0, 8), Some(1));
        assert_eq!(channel_index(3.99, 4.0, 8), Some(7));
        assert_eq!(channel_index(1.0, 4.0, 0), None);
    }

    #[test]
    fn energies_outside_the_spectrum_are_rejected() {
        assert_eq!(channel_index(4.0, 4.0, 8), None);
        assert_eq!(channel_index(-0.1, 4.0, 8), None);
        assert_eq!(channel_index(f64::NAN, 4.0, 8), None);
        // a non-positive upper edge bins nothing
        assert_eq!(channel_index(2.5, -1.0, 8), None);
        assert_eq!(channel_index(2.5, 0.0, 8), None);
        assert_eq!(channel_index(2.5, f64::NAN, 8), None);
    }

    #[test]
    fn spectrum_upper_edge_must_be_positive() {
        assert!(check_max_energy(4.0).is_ok());
        assert!(check_max_energy(0.0).is_err());
        assert!(check_max_energy(-1.0).is_err());
        assert!(check_max_energy(f64::NAN).is_err());
        assert!(check_max_energy(f64::INFINITY).is_err());
    }

    #[test]
    fn peak_wavelength_of_fullest_channel() {
        // channel 2 of 4 over [0, 4) eV is centered on 2.5 eV
        let wavelength = peak_wavelength(&[1, 3, 9, 2], 4.0).unwrap();
        assert!((wavelength - energy_to_wavelength(2.5)).abs() < 1e-9);
        assert_eq!(peak_wavelength(&[0, 0, 0], 4.0), None);
    }
}
