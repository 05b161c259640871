//! Process runtime statistics.
//!
//! `ProcStats` reads the jemalloc heap counters of this process, Linux `/proc`
//! for the current process, and system memory. Every name in [`GAUGE_NAMES`]
//! is reported on every sample; values that cannot be read (missing file,
//! other platforms, no jemalloc on msvc) are reported as 0.
//! Memory figures are in bytes.

use std::collections::BTreeMap;

/// Fixed set of gauges written by every sample.
pub const GAUGE_NAMES: [&str; 33] = [
    "HeapAllocated",
    "HeapActive",
    "HeapMetadata",
    "HeapMapped",
    "HeapResident",
    "HeapRetained",
    "VmPeak",
    "VmSize",
    "VmHWM",
    "VmRSS",
    "VmData",
    "VmStk",
    "VmExe",
    "VmLib",
    "VmPTE",
    "VmSwap",
    "RssAnon",
    "RssFile",
    "RssShmem",
    "Threads",
    "VoluntaryCtxtSwitches",
    "NonvoluntaryCtxtSwitches",
    "MinorFaults",
    "MajorFaults",
    "UserTimeTicks",
    "SystemTimeTicks",
    "ReadBytes",
    "WriteBytes",
    "ReadSyscalls",
    "WriteSyscalls",
    "OpenFds",
    "MemTotal",
    "MemAvailable",
];

/// Source of named runtime gauges.
pub trait StatsSource: Send + Sync {
    /// One value per entry of [`GAUGE_NAMES`].
    fn sample(&self) -> Vec<(&'static str, f64)>;
}

/// Reads jemalloc stats, `/proc/self/*` and `/proc/meminfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcStats;

impl StatsSource for ProcStats {
    fn sample(&self) -> Vec<(&'static str, f64)> {
        let mut values: BTreeMap<&'static str, u64> = GAUGE_NAMES.iter().map(|n| (*n, 0)).collect();
        collect_allocator(&mut values);
        collect_process(&mut values);
        GAUGE_NAMES
            .iter()
            .map(|n| (*n, values.get(n).copied().unwrap_or(0) as f64))
            .collect()
    }
}

#[cfg(not(target_env = "msvc"))]
fn collect_allocator(values: &mut BTreeMap<&'static str, u64>) {
    use tikv_jemalloc_ctl::{epoch, stats};

    // jemalloc caches its counters until the epoch advances.
    if let Err(e) = epoch::advance() {
        tracing::debug!(error = %e, "jemalloc epoch advance failed");
        return;
    }
    let readers: [(&'static str, fn() -> tikv_jemalloc_ctl::Result<usize>); 6] = [
        ("HeapAllocated", stats::allocated::read),
        ("HeapActive", stats::active::read),
        ("HeapMetadata", stats::metadata::read),
        ("HeapMapped", stats::mapped::read),
        ("HeapResident", stats::resident::read),
        ("HeapRetained", stats::retained::read),
    ];
    for (name, read) in readers {
        if let Ok(v) = read() {
            values.insert(name, v as u64);
        }
    }
}

#[cfg(target_env = "msvc")]
fn collect_allocator(_values: &mut BTreeMap<&'static str, u64>) {}

#[cfg(target_os = "linux")]
fn collect_process(values: &mut BTreeMap<&'static str, u64>) {
    let read = |path: &str| std::fs::read_to_string(path).ok();

    if let Some(s) = read("/proc/self/status") {
        values.extend(parse_status(&s));
    }
    if let Some(s) = read("/proc/self/stat") {
        values.extend(parse_stat(&s));
    }
    if let Some(s) = read("/proc/self/io") {
        values.extend(parse_io(&s));
    }
    if let Some(s) = read("/proc/meminfo") {
        values.extend(parse_meminfo(&s));
    }
    if let Ok(entries) = std::fs::read_dir("/proc/self/fd") {
        values.insert("OpenFds", entries.count() as u64);
    }
}

#[cfg(not(target_os = "linux"))]
fn collect_process(_values: &mut BTreeMap<&'static str, u64>) {}

/// `/proc/<pid>/status`: kB fields converted to bytes, counts as-is.
pub fn parse_status(s: &str) -> Vec<(&'static str, u64)> {
    const KB_FIELDS: [&str; 13] = [
        "VmPeak", "VmSize", "VmHWM", "VmRSS", "VmData", "VmStk", "VmExe", "VmLib", "VmPTE",
        "VmSwap", "RssAnon", "RssFile", "RssShmem",
    ];

    let mut out = Vec::new();
    for line in s.lines() {
        let Some((key, val)) = line.split_once(':') else { continue };
        if let Some(name) = KB_FIELDS.iter().find(|f| **f == key) {
            if let Some(kb) = parse_kb_value(val) {
                out.push((*name, kb.saturating_mul(1024)));
            }
            continue;
        }
        let name = match key {
            "Threads" => "Threads",
            "voluntary_ctxt_switches" => "VoluntaryCtxtSwitches",
            "nonvoluntary_ctxt_switches" => "NonvoluntaryCtxtSwitches",
            _ => continue,
        };
        if let Ok(v) = val.trim().parse() {
            out.push((name, v));
        }
    }
    out
}

/// `/proc/<pid>/stat`: fault counts and CPU ticks.
pub fn parse_stat(s: &str) -> Vec<(&'static str, u64)> {
    // comm may contain spaces and parens; fields resume after the last ')'.
    let Some((_, rest)) = s.rsplit_once(')') else { return Vec::new() };
    let fields: Vec<&str> = rest.split_whitespace().collect();

    // Index 0 here is field 3 (state) of proc(5).
    [("MinorFaults", 7), ("MajorFaults", 9), ("UserTimeTicks", 11), ("SystemTimeTicks", 12)]
        .into_iter()
        .filter_map(|(name, idx)| Some((name, fields.get(idx)?.parse::<u64>().ok()?)))
        .collect()
}

/// `/proc/<pid>/io`.
pub fn parse_io(s: &str) -> Vec<(&'static str, u64)> {
    let mut out = Vec::new();
    for line in s.lines() {
        let Some((key, val)) = line.split_once(':') else { continue };
        let name = match key {
            "read_bytes" => "ReadBytes",
            "write_bytes" => "WriteBytes",
            "syscr" => "ReadSyscalls",
            "syscw" => "WriteSyscalls",
            _ => continue,
        };
        if let Ok(v) = val.trim().parse() {
            out.push((name, v));
        }
    }
    out
}

/// `/proc/meminfo`: total and available memory in bytes.
pub fn parse_meminfo(s: &str) -> Vec<(&'static str, u64)> {
    let mut out = Vec::new();
    for line in s.lines() {
        let (name, val) = if let Some(val) = line.strip_prefix("MemTotal:") {
            ("MemTotal", val)
        } else if let Some(val) = line.strip_prefix("MemAvailable:") {
            ("MemAvailable", val)
        } else {
            continue;
        };
        if let Some(kb) = parse_kb_value(val) {
            out.push((name, kb.saturating_mul(1024)));
        }
    }
    out
}

/// Parse a value like "  12345 kB" into `Some(12345)`.
fn parse_kb_value(s: &str) -> Option<u64> {
    s.trim().strip_suffix("kB")?.trim().parse().ok()
}
