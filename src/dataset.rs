use crate::errors::{PlanError, Result};
use chrono::{Duration, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both axes within `tolerance` degrees of each other.
    pub fn approx_eq(&self, other: &Coordinates, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lon - other.lon).abs() <= tolerance
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// One hourly observation. Missing measurements are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
    pub cloud_cover_pct: f64,
    pub wind_direction_deg: f64,
    pub wind_speed: f64,
}

/// Record-level measurements a predicate can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WindSpeed,
    WindDirection,
    Temperature,
    Precipitation,
    PrecipitationProbability,
    CloudCover,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::WindSpeed,
        Field::WindDirection,
        Field::Temperature,
        Field::Precipitation,
        Field::PrecipitationProbability,
        Field::CloudCover,
    ];

    /// The keyword naming this field in expressions.
    pub fn keyword(self) -> &'static str {
        match self {
            Field::WindSpeed => "wind",
            Field::WindDirection => "wind_dir",
            Field::Temperature => "temperature_2m",
            Field::Precipitation => "precipitation",
            Field::PrecipitationProbability => "precipitation_prob",
            Field::CloudCover => "cloud",
        }
    }
}

impl WeatherRecord {
    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::WindSpeed => self.wind_speed,
            Field::WindDirection => self.wind_direction_deg,
            Field::Temperature => self.temperature_c,
            Field::Precipitation => self.precipitation_mm,
            Field::PrecipitationProbability => self.precipitation_probability_pct,
            Field::CloudCover => self.cloud_cover_pct,
        }
    }
}

/// Observations for one location, ascending and evenly spaced in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    location: Coordinates,
    records: Vec<WeatherRecord>,
}

impl Dataset {
    pub fn new(location: Coordinates, records: Vec<WeatherRecord>) -> Result<Self> {
        let mut step: Option<Duration> = None;
        for (a, b) in records.iter().tuple_windows() {
            let gap = b.timestamp - a.timestamp;
            if gap <= Duration::zero() {
                return Err(PlanError::InvalidDataset(format!(
                    "timestamps not strictly ascending at {}",
                    b.timestamp
                )));
            }
            match step {
                None => step = Some(gap),
                Some(s) if s != gap => {
                    return Err(PlanError::InvalidDataset(format!(
                        "irregular spacing at {}: expected {}s, found {}s",
                        b.timestamp,
                        s.num_seconds(),
                        gap.num_seconds()
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(Self { location, records })
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Spacing between consecutive records; `None` with fewer than two.
    pub fn interval(&self) -> Option<Duration> {
        match self.records.as_slice() {
            [a, b, ..] => Some(b.timestamp - a.timestamp),
            _ => None,
        }
    }

    /// Load a saved Open-Meteo hourly forecast response.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| PlanError::read(path, e))?;
        let response: ForecastResponse = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| PlanError::decode(format!("`{}`", path.display()), e))?;
        response.into_dataset()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let response: ForecastResponse =
            serde_json::from_reader(reader).map_err(|e| PlanError::decode("input", e))?;
        response.into_dataset()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let response: ForecastResponse =
            serde_json::from_str(json).map_err(|e| PlanError::decode("input", e))?;
        response.into_dataset()
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    hourly: HourlyColumns,
}

#[derive(Debug, Deserialize)]
struct HourlyColumns {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    cloud_cover: Vec<Option<f64>>,
    wind_direction_10m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

fn parse_time(text: &str) -> Result<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| PlanError::InvalidDataset(format!("unrecognised timestamp `{text}`")))
}

impl ForecastResponse {
    fn into_dataset(self) -> Result<Dataset> {
        let h = self.hourly;
        let n = h.time.len();
        let columns = [
            ("temperature_2m", h.temperature_2m.len()),
            ("precipitation_probability", h.precipitation_probability.len()),
            ("precipitation", h.precipitation.len()),
            ("cloud_cover", h.cloud_cover.len()),
            ("wind_direction_10m", h.wind_direction_10m.len()),
            ("wind_speed_10m", h.wind_speed_10m.len()),
        ];
        if let Some((name, len)) = columns.iter().find(|(_, len)| *len != n) {
            return Err(PlanError::InvalidDataset(format!(
                "column `{name}` has {len} values but `time` has {n}"
            )));
        }

        let value = |v: Option<f64>| v.unwrap_or(f64::NAN);
        let mut records = Vec::with_capacity(n);
        for (i, t) in h.time.iter().enumerate() {
            records.push(WeatherRecord {
                timestamp: parse_time(t)?,
                temperature_c: value(h.temperature_2m[i]),
                precipitation_mm: value(h.precipitation[i]),
                precipitation_probability_pct: value(h.precipitation_probability[i]),
                cloud_cover_pct: value(h.cloud_cover[i]),
                wind_direction_deg: value(h.wind_direction_10m[i]),
                wind_speed: value(h.wind_speed_10m[i]),
            });
        }
        debug!(records = n, lat = self.latitude, lon = self.longitude, "loaded dataset");
        Dataset::new(Coordinates::new(self.latitude, self.longitude), records)
    }
}

/// A maximal run of consecutive favourable records.
///
/// With a known interval the window covers `[start, end)`, where `end` is one
/// interval past the last record. Without one (a single-record dataset) the
/// window is the single instant `start == end` holding that one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window<'a> {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub records: Vec<&'a WeatherRecord>,
}

/// Groups an ascending selection into runs separated by exactly `interval`.
/// Without an interval every record becomes its own single-instant window.
pub fn windows<'a>(selection: &[&'a WeatherRecord], interval: Option<Duration>) -> Vec<Window<'a>> {
    let step = interval.unwrap_or_else(Duration::zero);
    let mut out: Vec<Window<'a>> = Vec::new();
    for &record in selection {
        if let Some(w) = out.last_mut() {
            if interval.is_some() && w.end == record.timestamp {
                w.records.push(record);
                w.end = record.timestamp + step;
                continue;
            }
        }
        out.push(Window {
            start: record.timestamp,
            end: record.timestamp + step,
            records: vec![record],
        });
    }
    out
}
