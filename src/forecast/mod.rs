//! Correlating scheduled bookings with a 3-hourly weather forecast.

pub mod correlate;
pub mod series;

pub use correlate::{
    BookingForecast, correlate, display_instant, format_display, parse_embedded_offset,
    parse_instant, upcoming,
};
pub use series::{ForecastPoint, ForecastSeries, WINDOW_SECS};
