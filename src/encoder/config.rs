use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static PARALLEL_MASK_MIN_WIDTH: OnceLock<usize> = OnceLock::new();

/// Symbol width at and above which candidate masks are scored in parallel.
/// 0 disables parallel evaluation entirely.
pub(crate) fn parallel_mask_min_width() -> usize {
    *PARALLEL_MASK_MIN_WIDTH.get_or_init(|| parse_env_usize("QRGEN_PARALLEL_MASK_MIN_WIDTH", 57))
}

static FRAME_CACHE: OnceLock<bool> = OnceLock::new();

/// Whether per-version frame templates are memoized across encodes
pub(crate) fn frame_cache_enabled() -> bool {
    *FRAME_CACHE.get_or_init(|| parse_env_bool_u8("QRGEN_FRAME_CACHE", true))
}
