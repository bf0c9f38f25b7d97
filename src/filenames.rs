pub const RUN_STATS_FILENAME: &str = "run.stats.json";
pub const SETTINGS_FILENAME: &str = "cluster.settings.json";
pub const SV_CALLS_FILENAME: &str = "sv.calls.json";
