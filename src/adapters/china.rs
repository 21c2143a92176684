// src/adapters/china.rs
//
// China publishes no API. Daily announcements carry only the cumulative
// dose count; the periodic press-conference transcripts re-derive the
// full metric set. The daily feed is walked newest-first until it meets
// the stored history; the transcript feed, being a re-derivation, wins
// wherever the two collide.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use crate::adapters::SourceAdapter;
use crate::config::consts::REQUEST_PAUSE_MS;
use crate::config::jurisdiction::{JurisdictionConfig, VaccineSource};
use crate::core::net::Fetch;
use crate::core::sanitize::{normalize_ws, strip_tags};
use crate::error::{Error, Result};
use crate::model::{MetricRecord, RawBatch, RawRecord};
use crate::pipeline::merge::merge_feeds;
use crate::pipeline::normalize::Normalizer;

static HOST: &str = "http://www.nhc.gov.cn";
static SOURCE_URL: &str = "http://www.nhc.gov.cn/xcs/yqjzqk/list_gzbd.shtml";
static SOURCE_URL_COMPLETE: &str = "http://www.nhc.gov.cn/xcs/s2906/new_list.shtml";

// Whole roster predates the series start, so the list is constant.
static VACCINES: &str = "CanSino, IMBCAMS, KCONVAC, Sinopharm/Beijing, Sinopharm/Wuhan, Sinovac, ZF2001";

/// Transcripts to re-derive per run. The feed posts one every few days;
/// three links comfortably cover the window since the last run.
const COMPLETE_LINKS: usize = 3;

pub struct China {
    normalizer: Normalizer,
    re_link: Regex,
    re_date: Regex,
    re_total: Regex,
    re_title: Regex,
    re_summary: Regex,
    re_vaccinated: Regex,
    re_boosters: Regex,
    re_wan: Regex,
    re_yi: Regex,
}

impl China {
    pub fn new() -> Result<Self> {
        let cfg = JurisdictionConfig {
            name: "China",
            // Per-announcement URLs are kept as-is; there is no single
            // reference page for this source.
            source_url_ref: None,
            vaccines: VaccineSource::Fixed(VACCINES),
        };
        Ok(Self {
            normalizer: Normalizer::new(&cfg)?,
            re_link: re(r#"(?s)<li[^>]*>\s*<a[^>]+href="([^"]+)"[^>]*>(.*?)</a>"#)?,
            re_date: re(r"截至(20\d{2})年(\d{1,2})月(\d{1,2})日")?,
            re_total: re(r"([\d\.]+\s*万)剂次")?,
            re_title: re(r"国务院联防联控机制(20\d{2})年(\d{1,2})月(\d{1,2})日新闻发布会文字实录")?,
            re_summary: re(
                r"(?s)截至(\d{1,2})月(\d{1,2})日.*?疫苗([\d\.亿零]+万)剂次.*?全程接种的?人数(?:为|.{0,9}达到)([\d\.亿零]+万)人",
            )?,
            re_vaccinated: re(r"(?:接种|疫苗)的?总人数(?:达到?|为)([\d\.亿零]+万)")?,
            re_boosters: re(r"加强免疫(?:已经)?接种的?是?([\d\.亿零]+万)人")?,
            re_wan: re(r"([\d\.]+)\s*万")?,
            re_yi: re(r"([\d\.]+)\s*亿零?")?,
        })
    }

    /// Daily announcement walk, newest first, stopping once we reach a
    /// date the snapshot already has. Running off the end of the archive
    /// without reaching it means the series would have a silent gap, and
    /// that must halt the run.
    fn read_recent(&self, fetch: &dyn Fetch, last_update: Option<NaiveDate>) -> Result<Vec<RawRecord>> {
        let listing = fetch.get(SOURCE_URL)?;
        let links = self.list_links(&listing);
        if links.is_empty() {
            return Err(Error::Parse(s!("announcement list yielded no links")));
        }

        let mut out = Vec::new();
        let mut reached_history = last_update.is_none();
        for (url, _title) in links {
            pause();
            let page = fetch.get(&url)?;
            let record = self.parse_announcement(&page, &url)?;
            if let (Some(last), Some(date)) = (last_update, record.date) {
                if date <= last {
                    reached_history = true;
                    break;
                }
            }
            out.push(record);
        }

        if !reached_history {
            // last_update is Some here by construction
            let last = last_update.unwrap_or_default();
            return Err(Error::Consistency(format!(
                "announcement feed no longer reaches back to {last}"
            )));
        }
        Ok(out)
    }

    /// Press-conference transcripts: the freshest few, full metric set.
    fn read_complete(&self, fetch: &dyn Fetch) -> Result<Vec<RawRecord>> {
        let listing = fetch.get(SOURCE_URL_COMPLETE)?;
        let picked: Vec<(String, u32)> = self
            .list_links(&listing)
            .into_iter()
            .filter_map(|(url, title)| {
                let caps = self.re_title.captures(&title)?;
                let year = caps.get(1)?.as_str().parse::<u32>().ok()?;
                Some((url, year))
            })
            .take(COMPLETE_LINKS)
            .collect();

        let mut out = Vec::new();
        for (url, year) in picked {
            pause();
            let page = fetch.get(&url)?;
            if let Some(record) = self.parse_transcript(&page, &url, year)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn list_links(&self, doc: &str) -> Vec<(String, String)> {
        self.re_link
            .captures_iter(doc)
            .filter_map(|caps| {
                let href = caps.get(1)?.as_str();
                let title = normalize_ws(&strip_tags(caps.get(2)?.as_str()));
                Some((absolute_url(href), title))
            })
            .collect()
    }

    fn parse_announcement(&self, page: &str, url: &str) -> Result<RawRecord> {
        let text = strip_tags(page);

        let date = {
            let caps = self
                .re_date
                .captures(&text)
                .ok_or_else(|| Error::Parse(format!("no report date in {url}")))?;
            ymd(&caps[1], &caps[2], &caps[3])?
        };
        let total = {
            let caps = self
                .re_total
                .captures(&text)
                .ok_or_else(|| Error::Parse(format!("no dose count in {url}")))?;
            self.clean_count(&caps[1])?
        };

        Ok(RawRecord {
            date: Some(date),
            total_vaccinations: Some(total),
            source_url: Some(s!(url)),
            ..Default::default()
        })
    }

    /// A transcript without the vaccination summary is simply not about
    /// vaccination; skip it rather than fail.
    fn parse_transcript(&self, page: &str, url: &str, year: u32) -> Result<Option<RawRecord>> {
        let text = strip_tags(page);

        let Some(summary) = self.re_summary.captures(&text) else {
            return Ok(None);
        };
        let date = ymd(&year.to_string(), &summary[1], &summary[2])?;
        let total_vaccinations = self.clean_count(&summary[3])?;
        let people_fully_vaccinated = self.clean_count(&summary[4])?;

        let people_vaccinated = match self.re_vaccinated.captures(&text) {
            Some(caps) => Some(self.clean_count(&caps[1])?),
            None => None,
        };
        let total_boosters = match self.re_boosters.captures(&text) {
            Some(caps) => Some(self.clean_count(&caps[1])?),
            None => None,
        };

        Ok(Some(RawRecord {
            date: Some(date),
            total_vaccinations: Some(total_vaccinations),
            people_vaccinated,
            people_fully_vaccinated: Some(people_fully_vaccinated),
            total_boosters,
            source_url: Some(s!(url)),
        }))
    }

    /// "3.1亿零436.9万" → 314_369_000. The 万 part is always present in
    /// the counts this source prints; the 亿 part is optional.
    fn clean_count(&self, raw: &str) -> Result<u64> {
        let wan = self
            .re_wan
            .captures(raw)
            .and_then(|c| c.get(1).map(|m| m.as_str()))
            .ok_or_else(|| Error::Parse(format!("unparsable count: {raw:?}")))?
            .parse::<f64>()
            .map_err(|_| Error::Parse(format!("unparsable count: {raw:?}")))?
            * 1e4;

        let yi = match self.re_yi.captures(raw).and_then(|c| c.get(1)) {
            Some(m) => {
                m.as_str()
                    .parse::<f64>()
                    .map_err(|_| Error::Parse(format!("unparsable count: {raw:?}")))?
                    * 1e8
            }
            None => 0.0,
        };

        Ok((wan + yi).round() as u64)
    }
}

impl SourceAdapter for China {
    fn jurisdiction(&self) -> &'static str {
        "China"
    }

    fn read(&self, fetch: &dyn Fetch, last_update: Option<NaiveDate>) -> Result<RawBatch> {
        let rows = self.read_recent(fetch, last_update)?;
        let complete = self.read_complete(fetch)?;
        Ok(RawBatch { rows, complete })
    }

    fn normalize(&self, raw: RawBatch) -> Result<Vec<MetricRecord>> {
        let recent = self.normalizer.normalize(raw.rows)?;
        let complete = self.normalizer.normalize(raw.complete)?;
        Ok(merge_feeds(recent, complete))
    }
}

fn re(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("bad pattern: {e}")))
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        s!(href)
    } else if href.starts_with('/') {
        format!("{HOST}{href}")
    } else {
        format!("{HOST}/{href}")
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Result<NaiveDate> {
    let bad = || Error::Parse(format!("bad date parts: {year}-{month}-{day}"));
    let y = year.parse::<i32>().map_err(|_| bad())?;
    let m = month.parse::<u32>().map_err(|_| bad())?;
    let d = day.parse::<u32>().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(bad)
}

fn pause() {
    thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS));
}
