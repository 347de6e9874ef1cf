//! `show_weather_info`: forecast for each upcoming booking of a job.

use crate::clients::{Filter, ForecastApi};
use crate::dispatch::{EventResponse, Services};
use crate::error::{AddonError, Stage};
use crate::event::Credential;
use crate::forecast::{BookingForecast, ForecastSeries, correlate};
use crate::pipeline::Orchestrator;
use crate::records::{JOB, JOB_ACTIVITY, Job, ScheduledActivity};
use crate::render::Notice;

enum WeatherReport {
    NoLocation,
    Bookings {
        job_number: String,
        bookings: Vec<BookingForecast>,
    },
}

pub async fn show_weather_info(
    services: &Services,
    credential: &Credential,
    job_uuid: &str,
) -> anyhow::Result<EventResponse> {
    let renderer = &services.renderer;
    let Some(forecast_api) = services.forecast.as_deref() else {
        let page = renderer.notice(&Notice::new("is not configured.").with_lead("forecast.api_key"))?;
        return Ok(EventResponse::html(page));
    };

    let page = match report(services, forecast_api, credential, job_uuid).await {
        Ok(WeatherReport::Bookings {
            job_number,
            bookings,
        }) => renderer.weather(&job_number, &bookings)?,
        Ok(WeatherReport::NoLocation) => renderer.notice(&Notice::new(
            "The weather cannot be determined because there is no location information for this job.",
        ))?,
        Err(AddonError::Pipeline(error)) => renderer.notice(
            &Notice::new(format!(
                "An error occurred while {} for job {}.",
                error.stage().describe(),
                error.target_id()
            ))
            .with_detail(error.diagnostic()),
        )?,
        Err(AddonError::Validation(error)) => renderer.notice(
            &Notice::new("The scheduled bookings for this job could not be read.")
                .with_detail(error.to_string()),
        )?,
        Err(other) => return Err(other.into()),
    };
    Ok(EventResponse::html(page))
}

async fn report(
    services: &Services,
    forecast_api: &dyn ForecastApi,
    credential: &Credential,
    job_uuid: &str,
) -> Result<WeatherReport, AddonError> {
    let orchestrator = Orchestrator::new(job_uuid);

    let response = orchestrator
        .stage(
            Stage::JobRead,
            services.resource.read_one(credential, JOB, job_uuid),
        )
        .await?;
    let job: Job = orchestrator.decode(Stage::JobRead, &response)?;
    let Some((lat, lng)) = job.location() else {
        tracing::info!(target_id = job_uuid, "job has no valid location");
        return Ok(WeatherReport::NoLocation);
    };

    // One predicate per query: inactive and unscheduled rows are dropped
    // client-side during correlation.
    let response = orchestrator
        .stage(
            Stage::ActivityList,
            services
                .resource
                .list(credential, JOB_ACTIVITY, &Filter::eq("job_uuid", job_uuid)),
        )
        .await?;
    let activities: Vec<ScheduledActivity> = orchestrator.decode(Stage::ActivityList, &response)?;

    let response = orchestrator
        .stage(Stage::ForecastRead, forecast_api.read(lat, lng))
        .await?;
    let series = ForecastSeries::from_openweather(&response.body).map_err(|e| {
        orchestrator.contract(Stage::ForecastRead, format!("undecodable forecast: {e}"))
    })?;

    let bookings = correlate(
        &activities,
        &series,
        services.clock.now(),
        services.clock.local_offset(),
    )?;
    tracing::debug!(
        target_id = job_uuid,
        activities = activities.len(),
        upcoming = bookings.len(),
        matched = bookings.iter().filter(|b| b.forecast.is_some()).count(),
        "bookings correlated"
    );

    Ok(WeatherReport::Bookings {
        job_number: job.generated_job_id,
        bookings,
    })
}
