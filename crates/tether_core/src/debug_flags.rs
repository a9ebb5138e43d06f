use std::sync::OnceLock;

fn env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

/// Per-evaluation debug dump, gated on `TETHER_DEBUG_EVAL`.
///
/// Debug builds only; release builds always return false.
pub fn eval_debug_enabled() -> bool {
    if !cfg!(debug_assertions) {
        return false;
    }
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| env_flag_enabled("TETHER_DEBUG_EVAL"))
}
