//! Pool chemical calculator: input form and calculation with a diary note.

use crate::dispatch::{EventResponse, Services};
use crate::error::{Stage, ValidationError};
use crate::event::{Credential, PoolCalcArgs};
use crate::pipeline::Orchestrator;
use crate::records::NOTE;
use crate::render::NoteStatus;
use uuid::Uuid;

pub const DEFAULT_VOLUME_LITRES: &str = "25000";
pub const DEFAULT_CURRENT_PH: &str = "7.7";
pub const DEFAULT_DESIRED_PH: &str = "7.4";

/// pH differences within this band need no treatment.
const TOLERANCE: f64 = 0.05;
const MIN_VOLUME_LITRES: f64 = 1.0;
const INVALID_INPUT: &str = "Invalid input provided.";

/// Validated calculator input.
#[derive(Debug, Clone, PartialEq)]
pub struct Readings {
    pub job_uuid: String,
    pub volume_litres: f64,
    pub current_ph: f64,
    pub desired_ph: f64,
}

fn number(name: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw.trim().parse().map_err(|_| ValidationError::InvalidArg {
        name,
        reason: format!("`{raw}` is not a number"),
    })?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidArg {
            name,
            reason: format!("`{raw}` is not finite"),
        });
    }
    Ok(value)
}

impl Readings {
    pub fn parse(args: &PoolCalcArgs) -> Result<Self, ValidationError> {
        let volume_litres = number("pool_volume_litres", &args.pool_volume_litres)?;
        if volume_litres < MIN_VOLUME_LITRES {
            return Err(ValidationError::InvalidArg {
                name: "pool_volume_litres",
                reason: format!("must be at least {MIN_VOLUME_LITRES}"),
            });
        }
        let current_ph = number("current_ph", &args.current_ph)?;
        let desired_ph = number("desired_ph", &args.desired_ph)?;

        let job_uuid = args.job_uuid.trim();
        if job_uuid.is_empty() {
            return Err(ValidationError::MissingArg("job_uuid"));
        }
        Uuid::parse_str(job_uuid).map_err(|e| ValidationError::InvalidArg {
            name: "job_uuid",
            reason: e.to_string(),
        })?;

        Ok(Self {
            job_uuid: job_uuid.to_string(),
            volume_litres,
            current_ph,
            desired_ph,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recommendation {
    /// Units of acid that lower the pH.
    Acid(f64),
    /// Units of lye that raise the pH.
    Lye(f64),
    NoChemicals,
}

/// Two decimal places; keeps float noise such as `0.7499999999999996`
/// from showing.
fn round_units(units: f64) -> f64 {
    (units * 100.0).round() / 100.0
}

impl Recommendation {
    pub fn for_readings(readings: &Readings) -> Self {
        let diff = readings.current_ph - readings.desired_ph;
        let per_10k = readings.volume_litres / 10_000.0;
        if diff > TOLERANCE {
            Self::Acid(round_units(diff * per_10k))
        } else if diff < -TOLERANCE {
            Self::Lye(round_units(-diff * per_10k))
        } else {
            Self::NoChemicals
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Acid(units) => format!("Add {units} units of Acid"),
            Self::Lye(units) => format!("Add {units} units of Lye"),
            Self::NoChemicals => "Don't add any chemicals.".to_string(),
        }
    }

    pub fn needs_treatment(&self) -> bool {
        !matches!(self, Self::NoChemicals)
    }
}

pub fn note_text(readings: &Readings, recommendation: &Recommendation) -> String {
    format!(
        "Pool volume = {} litres\nCurrent pH = {}\nDesired pH = {}\n\nRecommendation = {}",
        readings.volume_litres,
        readings.current_ph,
        readings.desired_ph,
        recommendation.describe()
    )
}

/// `pool_calc_start`: the input form, pre-filled with typical values.
pub fn start(services: &Services, job_uuid: &str) -> anyhow::Result<EventResponse> {
    let page = services.renderer.pool_form(
        job_uuid,
        DEFAULT_VOLUME_LITRES,
        DEFAULT_CURRENT_PH,
        DEFAULT_DESIRED_PH,
    )?;
    Ok(EventResponse::html(page))
}

/// `pool_calc_calculate`: recommend a treatment and record it on the job.
pub async fn calculate(
    services: &Services,
    credential: &Credential,
    args: &PoolCalcArgs,
) -> anyhow::Result<EventResponse> {
    let renderer = &services.renderer;
    let readings = match Readings::parse(args) {
        Ok(readings) => readings,
        Err(error) => {
            tracing::info!(error = %error, "pool calculator input rejected");
            return Ok(EventResponse::html(renderer.pool_result(INVALID_INPUT, None)?));
        }
    };

    let recommendation = Recommendation::for_readings(&readings);
    let headline = recommendation.describe();
    if !recommendation.needs_treatment() {
        return Ok(EventResponse::html(renderer.pool_result(&headline, None)?));
    }

    let note = note_text(&readings, &recommendation);
    let orchestrator = Orchestrator::new(&readings.job_uuid);
    let fields = [
        ("related_object", "job"),
        ("related_object_uuid", readings.job_uuid.as_str()),
        ("note", note.as_str()),
    ];
    let status = match orchestrator
        .stage(
            Stage::NoteCreate,
            services.resource.create(credential, NOTE, &fields),
        )
        .await
    {
        Ok(_) => NoteStatus {
            posted: true,
            detail: String::new(),
        },
        Err(error) => NoteStatus {
            posted: false,
            detail: error.diagnostic(),
        },
    };

    Ok(EventResponse::html(renderer.pool_result(&headline, Some(&status))?))
}
