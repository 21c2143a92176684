// src/adapters/canada.rs
//
// Canada reports a single JSON endpoint with the full national history,
// so every run is a complete re-read reconciled against the stored
// snapshot by the shared merge.

use chrono::NaiveDate;
use serde_json::Value;

use crate::adapters::{check_known_columns, SourceAdapter};
use crate::config::jurisdiction::{JurisdictionConfig, VaccineSource};
use crate::core::net::Fetch;
use crate::error::{Error, Result};
use crate::model::{MetricRecord, RawBatch, RawRecord};
use crate::pipeline::normalize::Normalizer;

static SOURCE_URL: &str = "https://api.covid19tracker.ca/reports";
static SOURCE_URL_REF: &str = "https://covid19tracker.ca/vaccinationtracker.html";

static VACCINE_TIMELINE: [(&str, &str); 4] = [
    ("Pfizer/BioNTech", "2020-12-01"),
    ("Moderna", "2021-01-02"),
    ("Oxford/AstraZeneca", "2021-03-13"),
    ("Johnson&Johnson", "2021-07-17"),
];

// Full report schema as of the last source review. Anything beyond this
// list halts the run for human review.
static KNOWN_COLUMNS: [&str; 23] = [
    "date",
    "change_cases",
    "change_fatalities",
    "change_tests",
    "change_hospitalizations",
    "change_criticals",
    "change_recoveries",
    "change_vaccinations",
    "change_vaccinated",
    "change_boosters_1",
    "change_boosters_2",
    "change_vaccines_distributed",
    "total_cases",
    "total_fatalities",
    "total_tests",
    "total_hospitalizations",
    "total_criticals",
    "total_recoveries",
    "total_vaccinations",
    "total_vaccinated",
    "total_boosters_1",
    "total_boosters_2",
    "total_vaccines_distributed",
];

pub struct Canada {
    normalizer: Normalizer,
}

impl Canada {
    pub fn new() -> Result<Self> {
        let cfg = JurisdictionConfig {
            name: "Canada",
            source_url_ref: Some(SOURCE_URL_REF),
            vaccines: VaccineSource::Timeline(&VACCINE_TIMELINE),
        };
        Ok(Self {
            normalizer: Normalizer::new(&cfg)?,
        })
    }
}

impl SourceAdapter for Canada {
    fn jurisdiction(&self) -> &'static str {
        "Canada"
    }

    fn read(&self, fetch: &dyn Fetch, _last_update: Option<NaiveDate>) -> Result<RawBatch> {
        let body = fetch.get(SOURCE_URL)?;
        let payload: Value = serde_json::from_str(&body)?;
        let rows = payload
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Parse(s!("reports payload has no data array")))?;

        check_known_columns(rows, &KNOWN_COLUMNS)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            // Booster doses come split in two; the sum is absent (not
            // zero) until the first booster column appears at all.
            let boosters_1 = u64_field(row, "total_boosters_1");
            let boosters_2 = u64_field(row, "total_boosters_2");
            let total_boosters = boosters_1.map(|b1| b1 + boosters_2.unwrap_or(0));

            out.push(RawRecord {
                date: Some(parse_date_field(row)?),
                total_vaccinations: u64_field(row, "total_vaccinations"),
                people_vaccinated: None,
                // the source calls full courses "total_vaccinated"
                people_fully_vaccinated: u64_field(row, "total_vaccinated"),
                total_boosters,
                source_url: None,
            });
        }
        Ok(RawBatch::single(out))
    }

    fn normalize(&self, raw: RawBatch) -> Result<Vec<MetricRecord>> {
        self.normalizer.normalize(raw.rows)
    }
}

fn u64_field(row: &Value, key: &str) -> Option<u64> {
    row.get(key).and_then(Value::as_u64)
}

fn parse_date_field(row: &Value) -> Result<NaiveDate> {
    let text = row
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse(s!("report row without a date")))?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| Error::Parse(format!("bad report date: {text:?}")))
}
