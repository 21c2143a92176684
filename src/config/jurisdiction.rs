// src/config/jurisdiction.rs
//
// Per-jurisdiction configuration. Everything a source once kept as
// class-level constants (URLs, vaccine rosters, column allow-lists) is
// injected into the adapter at construction through this struct, so
// nothing scrape-specific lives in process-wide state.

/// Where a record's vaccine list comes from.
#[derive(Clone, Copy, Debug)]
pub enum VaccineSource {
    /// The full roster was in use before the series starts; every record
    /// gets the same list.
    Fixed(&'static str),
    /// Name → ISO authorization date. A record dated `d` lists every
    /// vaccine authorized on or before `d`.
    Timeline(&'static [(&'static str, &'static str)]),
}

#[derive(Clone, Copy, Debug)]
pub struct JurisdictionConfig {
    pub name: &'static str,
    /// Reference URL stamped on every record. None keeps the per-record
    /// fetch URL the adapter supplied (press-release sources).
    pub source_url_ref: Option<&'static str>,
    pub vaccines: VaccineSource,
}
