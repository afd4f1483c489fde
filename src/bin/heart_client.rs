//! Command-line client for the heart-disease prediction service.
//!
//! Collects one patient record from flags, posts it with the fixed retry
//! policy, and prints the rendered outcome.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin heart_client -- --age 63 --chest-pain-type ta --exercise-angina no
//! ```

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use heartrisk::adapters::http::HttpTransport;
use heartrisk::application::{render, CallState, ResilientClient, RetryPolicy, Severity};
use heartrisk::config::LogConfig;
use heartrisk::domain::{
    Categoricals, ChestPainType, ExerciseAngina, PatientRecord, RestingEcg, Sex, StSlope, Vitals,
};
use heartrisk::logging::{self, Role};
use heartrisk::ports::ThreadSleeper;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChestPainArg {
    Ata,
    Nap,
    Ta,
    Asy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RestingEcgArg {
    Normal,
    St,
    Lvh,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StSlopeArg {
    Up,
    Flat,
    Down,
}

#[derive(Debug, Parser)]
#[command(name = "heart_client", about = "Heart disease prediction client")]
struct Args {
    /// Prediction endpoint
    #[arg(long, env = "HEARTRISK_BACKEND_URL", default_value = "http://127.0.0.1:8000/predict")]
    url: String,

    /// Attempts before giving up on an unreachable service
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    attempts: u32,

    /// Delay between attempts, in seconds
    #[arg(long, default_value_t = 3)]
    retry_delay_secs: u64,

    /// Per-attempt timeout, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i64).range(20..=80))]
    age: i64,

    /// Resting blood pressure (mm Hg)
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(i64).range(80..=200))]
    resting_bp: i64,

    /// Serum cholesterol (mg/dl)
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(i64).range(100..=600))]
    cholesterol: i64,

    /// Fasting blood sugar > 120 mg/dl
    #[arg(long, value_enum, default_value_t = YesNo::No)]
    fasting_bs: YesNo,

    /// Maximum heart rate achieved
    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(i64).range(60..=220))]
    max_hr: i64,

    /// ST depression induced by exercise
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true, value_parser = parse_oldpeak)]
    oldpeak: f64,

    #[arg(long, value_enum, default_value_t = SexArg::Male)]
    sex: SexArg,

    #[arg(long, value_enum, default_value_t = ChestPainArg::Ata)]
    chest_pain_type: ChestPainArg,

    #[arg(long, value_enum, default_value_t = RestingEcgArg::Normal)]
    resting_ecg: RestingEcgArg,

    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    exercise_angina: YesNo,

    #[arg(long, value_enum, default_value_t = StSlopeArg::Up)]
    st_slope: StSlopeArg,
}

fn parse_oldpeak(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (-3.0..=7.0).contains(&v) {
        Ok(v)
    } else {
        Err("must be between -3.0 and 7.0".to_string())
    }
}

impl Args {
    fn record(&self) -> PatientRecord {
        let vitals = Vitals {
            age: self.age,
            resting_bp: self.resting_bp,
            cholesterol: self.cholesterol,
            fasting_bs: matches!(self.fasting_bs, YesNo::Yes),
            max_hr: self.max_hr,
            oldpeak: self.oldpeak,
        };
        let categoricals = Categoricals {
            sex: match self.sex {
                SexArg::Male => Sex::Male,
                SexArg::Female => Sex::Female,
            },
            chest_pain_type: match self.chest_pain_type {
                ChestPainArg::Ata => ChestPainType::Ata,
                ChestPainArg::Nap => ChestPainType::Nap,
                ChestPainArg::Ta => ChestPainType::Ta,
                ChestPainArg::Asy => ChestPainType::Asy,
            },
            resting_ecg: match self.resting_ecg {
                RestingEcgArg::Normal => RestingEcg::Normal,
                RestingEcgArg::St => RestingEcg::St,
                RestingEcgArg::Lvh => RestingEcg::Lvh,
            },
            exercise_angina: match self.exercise_angina {
                YesNo::Yes => ExerciseAngina::Yes,
                YesNo::No => ExerciseAngina::No,
            },
            st_slope: match self.st_slope {
                StSlopeArg::Up => StSlope::Up,
                StSlopeArg::Flat => StSlope::Flat,
                StSlopeArg::Down => StSlope::Down,
            },
        };
        PatientRecord::new(vitals, categoricals)
    }

    fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts,
            Duration::from_secs(self.retry_delay_secs),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let _guard = logging::init(&LogConfig::from_env()?, Role::Client).context("failed to initialise logging")?;

    let policy = args.policy();
    let transport = HttpTransport::new(args.url.clone(), policy.timeout())?;
    let client = ResilientClient::new(transport, ThreadSleeper, policy);

    let outcome = client.predict_observed(&args.record(), |state| match state {
        CallState::Sending { attempt } => {
            eprintln!("Sending data to backend (attempt {attempt}/{})...", policy.attempts());
        }
        CallState::Backoff { .. } => {
            eprintln!("Backend not ready, retrying in {}s...", policy.delay().as_secs());
        }
        _ => {}
    });

    let rendered = render(&outcome);
    println!("{}", rendered.text);

    Ok(match rendered.severity {
        Severity::Alert | Severity::Clear => ExitCode::SUCCESS,
        Severity::Warning | Severity::Error => ExitCode::FAILURE,
    })
}
