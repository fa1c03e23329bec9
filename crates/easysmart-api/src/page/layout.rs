// Firmware layouts of `PortStatisticsRpm.htm`.
//
// Two firmware families publish the same port table in incompatible
// shapes. Each layout turns its shape into the same `RawFields`, so the
// decoder downstream never needs to know which one it was fed.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::document::Document;
use super::fields::{self, LINK_STATUS, PKTS, RawFields, STATE};
use crate::error::Error;

const PAGE: &str = "port statistics";

/// Values per port in the convoluted flat array: state, link, then the
/// four packet counters.
const CONVOLUTED_STRIDE: usize = 6;
/// Packet counters per port in the `pkts` array.
pub const COUNTERS_PER_PORT: usize = 4;

static MAX_PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)var (max_port_num) = (.*?);$").expect("max_port_num pattern is valid")
});
static ALL_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)var all_info = \{\n?(.*?)\n?\};$").expect("all_info pattern is valid")
});
static TMP_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)tmp_info = "(.*?)";$"#).expect("tmp_info pattern is valid")
});
static TMP_INFO2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)tmp_info2 = "(.*?)";$"#).expect("tmp_info2 pattern is valid")
});
static ENTRY_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",?\n+").expect("entry split pattern is valid"));

/// The page layouts this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareLayout {
    /// A single `all_info` object literal with `state`, `link_status` and
    /// `pkts` arrays, living in the first script of the page.
    Simple,
    /// Port count declared in `<head>`, port data in two flat
    /// space-separated strings (`tmp_info`, `tmp_info2`) in `<body>`.
    Convoluted,
}

impl fmt::Display for FirmwareLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "simple",
            Self::Convoluted => "convoluted",
        })
    }
}

/// Everything recovered from one statistics page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatistics {
    pub layout: FirmwareLayout,
    /// The device's `max_port_num`.
    pub port_count: usize,
    pub fields: RawFields,
}

/// Parse a raw `PortStatisticsRpm.htm` body.
pub fn parse_port_statistics(text: &str) -> Result<PortStatistics, Error> {
    let doc = Document::parse(text);
    let layout = FirmwareLayout::detect(&doc);
    let port_count = layout.port_count(&doc)?;
    let fields = layout.extract(&doc, port_count)?;
    debug!(?layout, port_count, "parsed port statistics page");
    Ok(PortStatistics {
        layout,
        port_count,
        fields,
    })
}

impl FirmwareLayout {
    /// The statistics script sits in `<head>` only on convoluted firmware.
    pub(crate) fn detect(doc: &Document) -> Self {
        if doc.first_script_in_head() {
            Self::Convoluted
        } else {
            Self::Simple
        }
    }

    /// Read `max_port_num` from wherever this layout declares it.
    pub(crate) fn port_count(self, doc: &Document) -> Result<usize, Error> {
        let declared = match self {
            Self::Simple => doc.first_script().and_then(capture_max_port),
            Self::Convoluted => doc.head_scripts().find_map(capture_max_port),
        }
        .ok_or_else(|| Error::malformed(PAGE, "no `max_port_num` declaration"))?;

        // Port numbers are u16 everywhere downstream
        declared
            .trim()
            .parse::<u16>()
            .map(usize::from)
            .map_err(|_| {
                Error::malformed(PAGE, format!("`max_port_num` is not a port count: {declared:?}"))
            })
    }

    /// Recover the `state` / `link_status` / `pkts` arrays.
    pub(crate) fn extract(self, doc: &Document, port_count: usize) -> Result<RawFields, Error> {
        match self {
            Self::Simple => extract_simple(doc),
            Self::Convoluted => extract_convoluted(doc, port_count),
        }
    }
}

fn capture_max_port(script: &str) -> Option<&str> {
    MAX_PORT_RE
        .captures(script)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Split `name:[..]` entries of an object literal into trimmed fields.
fn collect_entries(body: &str) -> Result<RawFields, Error> {
    let mut fields = RawFields::new();
    for entry in ENTRY_SPLIT_RE.split(body) {
        let entry = entry.trim().trim_end_matches(',');
        if entry.is_empty() {
            continue;
        }
        let (name, literal) = entry
            .split_once(':')
            .ok_or_else(|| Error::malformed(PAGE, format!("entry without a name: {entry:?}")))?;
        let name = name.trim();
        let cells = fields::strip_sentinel(name, literal.trim())?;
        trace!(name, "collected array");
        fields.insert(name, cells);
    }
    Ok(fields)
}

fn extract_simple(doc: &Document) -> Result<RawFields, Error> {
    let script = doc
        .first_script()
        .ok_or_else(|| Error::malformed(PAGE, "page has no script"))?;
    let body = ALL_INFO_RE
        .captures(script)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::malformed(PAGE, "no `all_info` object"))?
        .as_str();
    collect_entries(body)
}

fn extract_convoluted(doc: &Document, port_count: usize) -> Result<RawFields, Error> {
    let script = doc
        .first_body_script()
        .ok_or_else(|| Error::malformed(PAGE, "no script in page body"))?;
    let first = capture_tmp(&TMP_INFO_RE, script, "tmp_info")?;
    let second = capture_tmp(&TMP_INFO2_RE, script, "tmp_info2")?;

    // Simple firmware pads every array with two trailing zero cells, and
    // the shared trimming in `collect_entries` strips exactly those. This
    // firmware has no padding, so it is added here to be stripped again.
    // Dropping it would eat the last port's final two counters.
    let flat: Vec<&str> = first
        .split_whitespace()
        .chain(second.split_whitespace())
        .collect();
    let literal = format!("tmp_info:[{},0,0]", flat.join(","));
    let combined = collect_entries(&literal)?;
    let cells = combined.cells("tmp_info")?;

    let needed = port_count
        .checked_mul(CONVOLUTED_STRIDE)
        .ok_or_else(|| Error::malformed(PAGE, format!("{port_count} ports is not a port count")))?;
    if cells.len() < needed {
        return Err(Error::malformed(
            PAGE,
            format!(
                "`tmp_info` holds {} values, {port_count} ports need {needed}",
                cells.len()
            ),
        ));
    }

    let mut states = Vec::with_capacity(port_count);
    let mut links = Vec::with_capacity(port_count);
    let mut pkts = Vec::with_capacity(port_count.saturating_mul(COUNTERS_PER_PORT));
    for port in cells.chunks_exact(CONVOLUTED_STRIDE).take(port_count) {
        states.push(port[0]);
        links.push(port[1]);
        pkts.extend_from_slice(&port[2..]);
    }

    let mut fields = RawFields::new();
    fields.insert(STATE, states.join(","));
    fields.insert(LINK_STATUS, links.join(","));
    fields.insert(PKTS, pkts.join(","));
    Ok(fields)
}

fn capture_tmp<'a>(re: &Regex, script: &'a str, name: &str) -> Result<&'a str, Error> {
    re.captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::malformed(PAGE, format!("no `{name}` string")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SIMPLE: &str = include_str!("../../tests/fixtures/port_stats_simple.htm");
    const CONVOLUTED: &str = include_str!("../../tests/fixtures/port_stats_convoluted.htm");

    #[test]
    fn detects_simple_layout() {
        let stats = parse_port_statistics(SIMPLE).expect("simple page parses");
        assert_eq!(stats.layout, FirmwareLayout::Simple);
        assert_eq!(stats.port_count, 8);
    }

    #[test]
    fn detects_convoluted_layout() {
        let stats = parse_port_statistics(CONVOLUTED).expect("convoluted page parses");
        assert_eq!(stats.layout, FirmwareLayout::Convoluted);
        assert_eq!(stats.port_count, 8);
    }

    #[test]
    fn simple_arrays_lose_their_sentinels() {
        let stats = parse_port_statistics(SIMPLE).expect("simple page parses");
        assert_eq!(stats.fields.get(STATE).ok(), Some("1,1,1,1,1,1,1,0"));
        assert_eq!(stats.fields.get(LINK_STATUS).ok(), Some("6,0,5,0,0,0,3,0"));
        assert_eq!(stats.fields.cells(PKTS).map(|c| c.len()).ok(), Some(32));
    }

    #[test]
    fn both_layouts_yield_the_same_fields() {
        let simple = parse_port_statistics(SIMPLE).expect("simple page parses");
        let convoluted = parse_port_statistics(CONVOLUTED).expect("convoluted page parses");
        assert_eq!(simple.port_count, convoluted.port_count);
        assert_eq!(simple.fields, convoluted.fields);
    }

    #[test]
    fn convoluted_keeps_the_last_counters() {
        let page = "<html><head><script>\nvar max_port_num = 1;\n</script></head>\
                    <body><script>\nvar tmp_info = \"1 6 10 20 30 40\";\n\
                    var tmp_info2 = \"\";\n</script></body></html>";
        let stats = parse_port_statistics(page).expect("page parses");
        assert_eq!(stats.fields.get(PKTS).ok(), Some("10,20,30,40"));
    }

    #[test]
    fn short_convoluted_array_is_malformed() {
        let page = "<html><head><script>\nvar max_port_num = 2;\n</script></head>\
                    <body><script>\nvar tmp_info = \"1 6 10 20 30 40\";\n\
                    var tmp_info2 = \"\";\n</script></body></html>";
        let err = parse_port_statistics(page).expect_err("one port of data for two ports");
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn missing_port_count_is_malformed() {
        let page = "<script>\nvar all_info = {\nstate:[1,0,0]\n};\n</script>";
        let err = parse_port_statistics(page).expect_err("no max_port_num");
        assert!(err.to_string().contains("max_port_num"));
    }

    #[test]
    fn non_numeric_port_count_is_malformed() {
        let page = "<script>\nvar max_port_num = eight;\n</script>";
        let err = parse_port_statistics(page).expect_err("bad max_port_num");
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn oversized_port_count_is_malformed() {
        let page = "<html><head><script>\nvar max_port_num = 3074457345618258603;\n</script></head>\
                    <body><script>\nvar tmp_info = \"1 6 10 20 30 40\";\n\
                    var tmp_info2 = \"\";\n</script></body></html>";
        let err = parse_port_statistics(page).expect_err("port count beyond u16");
        assert!(matches!(err, Error::MalformedResponse { .. }));
        assert!(err.to_string().contains("max_port_num"));
    }

    #[test]
    fn port_count_just_past_u16_is_malformed() {
        let page = "<script>\nvar max_port_num = 65536;\n</script>";
        assert!(matches!(
            parse_port_statistics(page),
            Err(Error::MalformedResponse { .. })
        ));
    }

    #[test]
    fn missing_all_info_is_malformed() {
        let page = "<script>\nvar max_port_num = 8;\n</script>";
        let err = parse_port_statistics(page).expect_err("no all_info");
        assert!(err.to_string().contains("all_info"));
    }

    #[test]
    fn login_page_is_malformed_not_a_panic() {
        let page = "<html><head><title>Login</title></head><body><form></form></body></html>";
        assert!(matches!(
            parse_port_statistics(page),
            Err(Error::MalformedResponse { .. })
        ));
    }
}
