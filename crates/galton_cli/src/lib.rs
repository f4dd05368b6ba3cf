//! Bean Counter CLI Library
//!
//! Resolves an experiment config from a JSON file and/or positional values,
//! drives the machine and writes either the classic text output or a JSON
//! summary. Only the public `galton_core` contract is used here.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use galton_core::{BeanKind, Experiment, ExperimentConfig, ExperimentReport};
use serde::{Deserialize, Serialize};

pub const USAGE: &str = "\
Usage: bean_counter <slot_count> <bean_count> <luck|skill> [debug]
Example: bean_counter 10 400 luck
Example: bean_counter 20 1000 skill debug";

/// Values given on the command line. Positional values override the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub slot_count: Option<usize>,
    pub bean_count: Option<usize>,
    pub mode: Option<BeanKind>,
    pub seed: Option<u64>,
    pub debug: bool,
}

pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ExperimentConfig> {
    let mut config = match &overrides.config_path {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let (Some(slot_count), Some(bean_count), Some(mode)) =
                (overrides.slot_count, overrides.bean_count, overrides.mode)
            else {
                bail!("slot_count, bean_count and mode are required without --config\n{}", USAGE);
            };
            ExperimentConfig::new(slot_count, bean_count, mode)
        }
    };

    if let Some(slot_count) = overrides.slot_count {
        config.slot_count = slot_count;
    }
    if let Some(bean_count) = overrides.bean_count {
        config.bean_count = bean_count;
    }
    if let Some(mode) = overrides.mode {
        config.mode = mode;
    }
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    config.debug |= overrides.debug;

    config.validate()?;
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    LowerHalf,
    UpperHalf,
}

impl Truncation {
    fn label(&self) -> &'static str {
        match self {
            Truncation::LowerHalf => "lower half",
            Truncation::UpperHalf => "upper half",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: ExperimentConfig,
    /// Extra runs through `repeat` after the first one.
    pub repeats: usize,
    /// Applied to the final run before it is reported.
    pub truncation: Option<Truncation>,
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// RFC3339 timestamp
    pub generated_at: String,
    pub truncation: Option<Truncation>,
    pub discarded: usize,
    pub runs: Vec<ExperimentReport>,
}

/// Run the experiment described by `options`, writing output to `out`.
pub fn run_experiment<W: Write>(options: &RunOptions, out: &mut W) -> Result<RunSummary> {
    let mut experiment = Experiment::new(options.config.clone())?;
    // Board dumps would corrupt the JSON document.
    let debug = options.config.debug && !options.json;
    let mut runs = Vec::with_capacity(options.repeats + 1);
    let mut discarded = 0;

    for run in 0..=options.repeats {
        if run > 0 {
            experiment.repeat()?;
        }
        if debug {
            writeln!(out, "{}", experiment.logic().render()?)?;
        }

        let mut frames: io::Result<()> = Ok(());
        experiment.run(|logic| {
            if debug && frames.is_ok() {
                if let Ok(board) = logic.render() {
                    frames = writeln!(out, "{}", board);
                }
            }
        })?;
        frames?;

        let last = run == options.repeats;
        if !options.json {
            let header = if options.repeats == 0 {
                "Slot bean counts:".to_string()
            } else {
                format!("Slot bean counts (run {}):", run)
            };
            writeln!(out, "{}", header)?;
            writeln!(out, "{}", experiment.logic().slot_string()?)?;
        }

        if let (true, Some(truncation)) = (last, options.truncation) {
            let logic = experiment.logic_mut();
            discarded = match truncation {
                Truncation::LowerHalf => logic.lower_half()?,
                Truncation::UpperHalf => logic.upper_half()?,
            };
            tracing::info!(?truncation, discarded, "applied truncation");
            if !options.json {
                writeln!(
                    out,
                    "Slot bean counts after {} ({} discarded):",
                    truncation.label(),
                    discarded
                )?;
                writeln!(out, "{}", experiment.logic().slot_string()?)?;
            }
        }

        let report = experiment.report()?;
        if !options.json {
            writeln!(out, "Average slot index: {:.3}", report.statistics.mean)?;
        }
        runs.push(report);
    }

    let summary = RunSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        truncation: options.truncation,
        discarded,
        runs,
    };
    if options.json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(config: ExperimentConfig) -> RunOptions {
        RunOptions { config, repeats: 0, truncation: None, json: false }
    }

    fn run_to_string(options: &RunOptions) -> (String, RunSummary) {
        let mut out = Vec::new();
        let summary = run_experiment(options, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_positional_config() {
        let overrides = ConfigOverrides {
            slot_count: Some(10),
            bean_count: Some(400),
            mode: Some(BeanKind::Luck),
            seed: Some(4),
            ..Default::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config, ExperimentConfig::new(10, 400, BeanKind::Luck).with_seed(4));
    }

    #[test]
    fn test_missing_positionals_show_usage() {
        let overrides = ConfigOverrides { slot_count: Some(10), ..Default::default() };
        let err = resolve_config(&overrides).unwrap_err();
        assert!(err.to_string().contains("Usage: bean_counter"), "{}", err);
    }

    #[test]
    fn test_zero_slots_rejected() {
        let overrides = ConfigOverrides {
            slot_count: Some(0),
            bean_count: Some(1),
            mode: Some(BeanKind::Skill),
            ..Default::default()
        };
        assert!(resolve_config(&overrides).is_err());
    }

    #[test]
    fn test_config_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{"slot_count": 6, "bean_count": 50, "mode": "skill", "seed": 9}"#;
        file.write_all(json.as_bytes()).unwrap();

        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            bean_count: Some(12),
            debug: true,
            ..Default::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.slot_count, 6);
        assert_eq!(config.bean_count, 12);
        assert_eq!(config.mode, BeanKind::Skill);
        assert_eq!(config.seed, Some(9));
        assert!(config.debug);
    }

    #[test]
    fn test_bad_config_path_reports_it() {
        let overrides = ConfigOverrides {
            config_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        let err = resolve_config(&overrides).unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_text_output() {
        let config = ExperimentConfig::new(5, 3, BeanKind::Skill).with_seed(1);
        let (text, summary) = run_to_string(&options(config));

        let report = &summary.runs[0];
        let counts: String = report.slot_counts.iter().map(|c| format!("{:>4}", c)).collect();
        let expected = format!(
            "Slot bean counts:\n{}\nAverage slot index: {:.3}\n",
            counts, report.statistics.mean
        );
        assert_eq!(text, expected);
        assert_eq!(report.slot_counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_debug_output_single_slot() {
        let config = ExperimentConfig::new(1, 1, BeanKind::Luck).with_seed(0).with_debug(true);
        let (text, _) = run_to_string(&options(config));
        let frames = "   1\n   0\n   0\n   1\n";
        let expected = format!("{}Slot bean counts:\n   1\nAverage slot index: 0.000\n", frames);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_debug_prints_a_frame_per_tick() {
        let config = ExperimentConfig::new(4, 3, BeanKind::Luck).with_seed(2).with_debug(true);
        let (text, summary) = run_to_string(&options(config));
        let frames = summary.runs[0].ticks + 1;
        // Every frame is four peg rows plus the slot line, then three summary lines.
        assert_eq!(text.lines().count(), frames * 5 + 3);
    }

    #[test]
    fn test_json_output_with_repeats() {
        let config = ExperimentConfig::new(6, 30, BeanKind::Skill).with_seed(3).with_debug(true);
        let opts = RunOptions { config, repeats: 2, truncation: None, json: true };
        let (text, summary) = run_to_string(&opts);

        let parsed: RunSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.runs.len(), 3);
        assert_eq!(parsed.runs[1].slot_counts, summary.runs[1].slot_counts);
        assert_eq!(parsed.runs[0].slot_counts, parsed.runs[2].slot_counts);
        assert_eq!(parsed.runs[2].run, 2);
    }

    #[test]
    fn test_truncation_applies_to_last_run() {
        let config = ExperimentConfig::new(5, 7, BeanKind::Luck).with_seed(11);
        let opts = RunOptions {
            config,
            repeats: 1,
            truncation: Some(Truncation::LowerHalf),
            json: false,
        };
        let (text, summary) = run_to_string(&opts);

        assert_eq!(summary.discarded, 3);
        assert_eq!(summary.runs[0].statistics.total, 7);
        assert_eq!(summary.runs[1].statistics.total, 4);
        assert!(text.contains("Slot bean counts after lower half (3 discarded):"), "{}", text);
    }
}
