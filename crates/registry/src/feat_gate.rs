/// Checks if raw (unprojected) connector edits are enabled via environment
/// variable.
///
/// Connectors without a built-in projection can still be edited by submitting
/// `property=value` pairs verbatim, skipping typed validation. Because that
/// bypasses every client-side constraint, the capability is gated behind
/// `GOVCTL_FEATURE_RAW_EDITS`, enabled when the variable is set to "1" or
/// "true" (case-insensitive).
pub fn feature_raw_edits() -> bool {
    std::env::var("GOVCTL_FEATURE_RAW_EDITS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}
