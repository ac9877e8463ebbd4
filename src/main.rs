/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use clap::{arg, ArgMatches, Command};

use bandpass_denoise::export::{write_coefficients, write_spectra, write_time_series};
use bandpass_denoise::fir::design_fir_bandpass;
use bandpass_denoise::iir::design_iir_bandpass;
use bandpass_denoise::pipeline::{self, noise_rng};
use bandpass_denoise::wav::save_wav;
use bandpass_denoise::{FilterError, PipelineConfig, Result, ToneSpec, Window};

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod sweep;

/// Sample rate, duration, tones, noise and seed
fn signal_args(cmd: Command) -> Command {
    cmd.arg(arg!(-r --"sample-rate" <HZ> "Sample rate in Hz").default_value("8000"))
        .arg(arg!(-d --"duration" <SEC> "Duration in seconds").default_value("5"))
        .arg(arg!(-t --"tones" <TONES> "Comma separated freq:amplitude pairs").default_value("440:0.6,660:0.4"))
        .arg(arg!(--"white" <AMP> "White noise amplitude").default_value("0.2"))
        .arg(arg!(--"hum-freq" <HZ> "Hum frequency in Hz").default_value("50"))
        .arg(arg!(--"hum-amp" <AMP> "Hum amplitude").default_value("0.3"))
        .arg(arg!(-s --"seed" <SEED> "Seed for the white noise (random if omitted)"))
}

fn fir_args(cmd: Command) -> Command {
    cmd.arg(arg!(--"fir-order" <N> "FIR order (taps = N + 1)").default_value("80"))
        .arg(arg!(--"fir-low" <HZ> "FIR low cutoff").default_value("100"))
        .arg(arg!(--"fir-high" <HZ> "FIR high cutoff").default_value("3000"))
        .arg(arg!(-w --"window" <W> "Hamming|Hanning|Blackman|Rectangle").default_value("Hamming"))
}

fn iir_args(cmd: Command) -> Command {
    cmd.arg(arg!(--"iir-order" <N> "Butterworth prototype order").default_value("6"))
        .arg(arg!(--"iir-low" <HZ> "IIR low cutoff").default_value("100"))
        .arg(arg!(--"iir-high" <HZ> "IIR high cutoff").default_value("3000"))
}

fn main() {
    let matches = Command::new("Band-pass Denoising CLI")
        .version("1.0")
        .author("Weronika")
        .about("Removes mains hum and broadband noise from a synthetic signal with FIR and IIR band-pass filters")
        .arg(arg!(-v --verbose ... "Increase log verbosity (-v info, -vv debug, -vvv trace)").global(true))
        .subcommand(iir_args(fir_args(signal_args(
            Command::new("run")
                .about("Synthesize, add noise, filter and compare spectra")
                .arg(arg!(-o --"out-dir" <DIR> "Directory for WAV and CSV outputs").default_value("./workdir")),
        ))))
        .subcommand(iir_args(fir_args(
            Command::new("design")
                .about("Print band-pass filter coefficients")
                .arg(arg!(-k --"kind" <KIND> "fir|iir").default_value("fir"))
                .arg(arg!(-r --"sample-rate" <HZ> "Sample rate in Hz").default_value("8000"))
                .arg(arg!(-o --"out-file" <FILE> "Write coefficients as CSV instead of printing")),
        )))
        .subcommand(iir_args(fir_args(signal_args(
            Command::new("sweep")
                .about("Compare filter orders on one seeded noisy signal")
                .arg(arg!(--"fir-orders" <LIST> "FIR orders to try").default_value("16,32,64,80,128,256"))
                .arg(arg!(--"iir-orders" <LIST> "IIR orders to try").default_value("1,2,4,6,8,10"))
                .arg(arg!(-o --"out-file" <FILE> "Results CSV").default_value("results.csv")),
        ))))
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("run", m)) => handle_run(m),
        Some(("design", m)) => handle_design(m),
        Some(("sweep", m)) => handle_sweep(m),
        _ => {
            eprintln!("Unknown command. Use --help.");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
}

/// Value of `--name` parsed as `T`, or `None` when the subcommand has no such argument or it was not given
fn opt_arg<T>(m: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match m.try_get_one::<String>(name).ok().flatten() {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| FilterError::InvalidParameter(format!("--{} '{}': {}", name, raw, e))),
        None => Ok(None),
    }
}

fn parse_tones(s: &str) -> Result<Vec<ToneSpec>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (freq, amp) = part
                .split_once(':')
                .ok_or_else(|| FilterError::InvalidParameter(format!("tone '{}' is not freq:amplitude", part)))?;
            let parse = |v: &str| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| FilterError::InvalidParameter(format!("tone '{}': {}", part, e)))
            };
            Ok(ToneSpec::new(parse(freq)?, parse(amp)?))
        })
        .collect()
}

fn parse_orders(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse()
                .map_err(|e| FilterError::InvalidParameter(format!("order '{}': {}", part, e)))
        })
        .collect()
}

/// Builds the config from whichever arguments the subcommand defines, defaults for the rest
fn config_from(m: &ArgMatches) -> Result<PipelineConfig> {
    let mut cfg = PipelineConfig::default();
    if let Some(v) = opt_arg(m, "sample-rate")? {
        cfg.sample_rate = v;
    }
    if let Some(v) = opt_arg(m, "duration")? {
        cfg.duration = v;
    }
    if let Some(v) = opt_arg::<String>(m, "tones")? {
        cfg.tones = parse_tones(&v)?;
    }
    if let Some(v) = opt_arg(m, "white")? {
        cfg.noise.white_amplitude = v;
    }
    if let Some(v) = opt_arg(m, "hum-freq")? {
        cfg.noise.hum_frequency = v;
    }
    if let Some(v) = opt_arg(m, "hum-amp")? {
        cfg.noise.hum_amplitude = v;
    }
    cfg.seed = opt_arg(m, "seed")?;
    if let Some(v) = opt_arg(m, "fir-order")? {
        cfg.fir.order = v;
    }
    if let Some(v) = opt_arg(m, "fir-low")? {
        cfg.fir.low = v;
    }
    if let Some(v) = opt_arg(m, "fir-high")? {
        cfg.fir.high = v;
    }
    if let Some(v) = opt_arg::<Window>(m, "window")? {
        cfg.fir.window = v;
    }
    if let Some(v) = opt_arg(m, "iir-order")? {
        cfg.iir.order = v;
    }
    if let Some(v) = opt_arg(m, "iir-low")? {
        cfg.iir.low = v;
    }
    if let Some(v) = opt_arg(m, "iir-high")? {
        cfg.iir.high = v;
    }
    Ok(cfg)
}

/// Persistence failures only cost the file, never the run
fn warn_on_failure(what: &Path, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Could not write {}: {}", what.display(), e);
    }
}

fn handle_run(m: &ArgMatches) -> Result<()> {
    let cfg = config_from(m)?;
    let out_dir = PathBuf::from(opt_arg::<String>(m, "out-dir")?.unwrap_or_else(|| "./workdir".to_string()));

    let out = pipeline::run(&cfg, &mut noise_rng(&cfg))?;
    println!("{}", out.report(&cfg));

    if let Err(e) = fs::create_dir_all(&out_dir) {
        log::warn!("Could not create {}: {}", out_dir.display(), e);
        return Ok(());
    }
    for (name, sig) in [("noisy.wav", &out.noisy), ("fir.wav", &out.fir_output), ("iir.wav", &out.iir_output)] {
        let path = out_dir.join(name);
        warn_on_failure(&path, save_wav(sig, &path));
    }
    let path = out_dir.join("time_series.csv");
    warn_on_failure(
        &path,
        write_time_series(
            &path,
            &[("clean", &out.clean), ("noisy", &out.noisy), ("fir", &out.fir_output), ("iir", &out.iir_output)],
        ),
    );
    let path = out_dir.join("spectrum.csv");
    warn_on_failure(
        &path,
        write_spectra(
            &path,
            &[("noisy", &out.noisy_spectrum), ("fir", &out.fir_spectrum), ("iir", &out.iir_spectrum)],
        ),
    );
    println!("Outputs in '{}'.", out_dir.display());
    Ok(())
}

fn handle_design(m: &ArgMatches) -> Result<()> {
    let cfg = config_from(m)?;
    let kind = opt_arg::<String>(m, "kind")?.unwrap_or_else(|| "fir".to_string());
    let coeffs = match kind.to_lowercase().as_str() {
        "fir" => design_fir_bandpass(&cfg.fir.band(cfg.sample_rate)?, cfg.fir.order, cfg.fir.window)?,
        "iir" => design_iir_bandpass(&cfg.iir.band(cfg.sample_rate)?, cfg.iir.order)?,
        other => return Err(FilterError::InvalidParameter(format!("Unknown filter kind: {}", other))),
    };

    match opt_arg::<String>(m, "out-file")? {
        Some(file) => {
            write_coefficients(&file, &coeffs)?;
            println!("{} coefficients -> {}", kind.to_uppercase(), file);
        }
        None => {
            for (k, b) in coeffs.b().iter().enumerate() {
                println!("b[{}] = {:.17e}", k, b);
            }
            for (k, a) in coeffs.a().iter().enumerate() {
                println!("a[{}] = {:.17e}", k, a);
            }
        }
    }
    Ok(())
}

fn handle_sweep(m: &ArgMatches) -> Result<()> {
    let mut cfg = config_from(m)?;
    // repeated sweeps must stay comparable
    cfg.seed = cfg.seed.or(Some(0));
    let fir_orders = parse_orders(&opt_arg::<String>(m, "fir-orders")?.unwrap_or_default())?;
    let iir_orders = parse_orders(&opt_arg::<String>(m, "iir-orders")?.unwrap_or_default())?;
    let out_file = PathBuf::from(opt_arg::<String>(m, "out-file")?.unwrap_or_else(|| "results.csv".to_string()));
    sweep::run(&cfg, &fir_orders, &iir_orders, &out_file)
}
