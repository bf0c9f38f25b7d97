use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail, try_with};
use unwrap::unwrap;

use super::utils::check_required_filename;
use crate::filenames::SETTINGS_FILENAME;

/// Default split-read maximum breakpoint distance
pub const SR_MAX_BREAKPOINT_DISTANCE: i64 = 75;

/// Default maximum number of edges retained for each evidence graph component
pub const GRAPH_PRUNING: usize = 1000;

#[derive(Args, Clone, Deserialize, Serialize)]
pub struct ClusterSettings {
    /// Directory for all cluster command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_cluster_output"))]
    pub output_dir: Utf8PathBuf,

    /// Discordant SV evidence for one sample in JSON format
    ///
    /// The file should contain one object with a 'paired_end' array of read pair records and a
    /// 'split_read' array of split read records. Either array may be omitted.
    ///
    #[arg(long = "evidence", value_name = "FILE")]
    pub evidence_filename: String,

    /// Maximum distance between the breakpoints of two read pairs for them to support the same SV
    ///
    /// By default, each paired-end SV type uses the largest normal insert size found among the read
    /// pairs of that type.
    ///
    #[arg(long, value_name = "DISTANCE")]
    pub pe_max_breakpoint_distance: Option<i64>,

    /// Maximum distance between the breakpoints of two split reads for them to support the same SV
    #[arg(long, value_name = "DISTANCE", default_value_t = SR_MAX_BREAKPOINT_DISTANCE)]
    pub sr_max_breakpoint_distance: i64,

    /// Maximum number of edges retained for any one connected component of the evidence graph
    ///
    /// Dense evidence clusters are clustered from a subset of their edges after this limit is
    /// reached.
    ///
    #[arg(hide = true, long, default_value_t = GRAPH_PRUNING)]
    pub graph_pruning: usize,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from(concatcp!(env!("CARGO_PKG_NAME"), "_cluster_output")),
            evidence_filename: String::new(),
            pe_max_breakpoint_distance: None,
            sr_max_breakpoint_distance: SR_MAX_BREAKPOINT_DISTANCE,
            graph_pruning: GRAPH_PRUNING,
        }
    }
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_cluster_settings(
    settings: ClusterSettings,
) -> SimpleResult<ClusterSettings> {
    check_required_filename(&settings.evidence_filename, "evidence")?;

    if let Some(x) = settings.pe_max_breakpoint_distance {
        if x <= 0 {
            bail!("--pe-max-breakpoint-distance argument must be greater than 0");
        }
    }

    if settings.sr_max_breakpoint_distance <= 0 {
        bail!("--sr-max-breakpoint-distance argument must be greater than 0");
    }

    if settings.graph_pruning == 0 {
        bail!("--graph-pruning argument must be greater than 0");
    }

    let mut settings = settings;
    settings.evidence_filename = try_with!(
        Utf8PathBuf::from(&settings.evidence_filename).canonicalize_utf8(),
        "Unable to canonicalize evidence file path: '{}'",
        settings.evidence_filename
    )
    .to_string();

    Ok(settings)
}

/// Write cluster settings out in json format
pub fn write_cluster_settings(output_dir: &Utf8Path, settings: &ClusterSettings) {
    use log::info;

    let filename = output_dir.join(SETTINGS_FILENAME);

    info!("Writing cluster settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create cluster settings json file: '{filename}'"
    );

    unwrap!(
        serde_json::to_writer_pretty(&f, &settings),
        "Unable to write cluster settings json file: '{filename}'"
    );
}
