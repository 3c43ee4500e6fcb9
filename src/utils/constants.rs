/// Raw feature column names as exported by the NWP post-processor, mapped to
/// the canonical names the regression model was trained on
pub const FEATURE_COLUMNS: &[(&str, &str)] = &[
    ("suhu2m(degC)", "suhu2m.degC."),
    ("dew2m(degC)", "dew2m.degC."),
    ("rh2m(%)", "rh2m..."),
    ("wspeed(m/s)", "wspeed.m.s."),
    ("wdir(deg)", "wdir.deg."),
    ("lcloud(%)", "lcloud..."),
    ("mcloud(%)", "mcloud..."),
    ("hcloud(%)", "hcloud..."),
    ("surpre(Pa)", "surpre.Pa."),
    ("clmix(kg/kg)", "clmix.kg.kg."),
    ("wamix(kg/kg)", "wamix.kg.kg."),
    ("outlr(W/m2)", "outlr.W.m2."),
    ("pblh(m)", "pblh.m."),
    ("lifcl(m)", "lifcl.m."),
    ("cape(j/kg)", "cape.j.kg."),
    ("mdbz", "mdbz"),
    ("t950(degC)", "t950.degC."),
    ("rh950(%)", "rh950..."),
    ("ws950(m/s)", "ws950.m.s."),
    ("wd950(deg)", "wd950.deg."),
    ("t800(degC)", "t800.degC."),
    ("rh800(%)", "rh800..."),
    ("ws800(m/s)", "ws800.m.s."),
    ("wd800(deg)", "wd800.deg."),
    ("t500(degC)", "t500.degC."),
    ("rh500(%)", "rh500..."),
    ("ws500(m/s)", "ws500.m.s."),
    ("wd500(deg)", "wd500.deg."),
    ("prec_nwp", "prec_nwp"),
];

/// Correlated or non-predictive features stripped before inference
pub const EXCLUDED_FEATURES: &[&str] = &[
    "lcloud...",
    "mcloud...",
    "hcloud...",
    "clmix.kg.kg.",
    "wamix.kg.kg.",
    "prec_nwp",
];

/// NWP 2m temperature, plotted next to the prediction as reference
pub const REFERENCE_FEATURE: &str = "suhu2m.degC.";

/// Metadata column aliases (raw header -> canonical)
pub const STATION_ID_ALIASES: &[&str] = &["lokasi", "WMOID", "wmoid", "station_id"];
pub const DISPLAY_NAME_ALIASES: &[&str] = &["Nama UPT", "name", "display_name"];
pub const LONGITUDE_ALIASES: &[&str] = &["LON", "lon", "longitude"];
pub const LATITUDE_ALIASES: &[&str] = &["LAT", "lat", "latitude"];
pub const TIMESTAMP_ALIASES: &[&str] = &["Date", "date", "timestamp"];

/// Timestamp formats accepted in the feature source, tried in order
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];
pub const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Temperature display domain for the colorbar and range control (°C)
pub const DISPLAY_DOMAIN_MIN: f64 = 0.0;
pub const DISPLAY_DOMAIN_MAX: f64 = 38.0;

/// Decimal places kept in station summaries
pub const SUMMARY_DECIMALS: u32 = 1;

pub const CHART_PLACEHOLDER: &str = "Click on one of the stations in the map to view graph.";

/// Source names used in load errors
pub const STATION_SOURCE: &str = "station registry";
pub const FEATURE_SOURCE: &str = "feature store";
pub const MODEL_SOURCE: &str = "model artifact";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Canonical names of the model inputs, in training order
pub fn model_features() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .map(|(_, canonical)| *canonical)
        .filter(|name| !EXCLUDED_FEATURES.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_features_exclude_correlated_columns() {
        let features = model_features();

        assert_eq!(features.len(), 23);
        assert_eq!(features[0], "suhu2m.degC.");
        assert_eq!(features[22], "wd500.deg.");
        for excluded in EXCLUDED_FEATURES {
            assert!(!features.contains(excluded));
        }
    }
}
