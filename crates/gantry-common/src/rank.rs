use core::sync::atomic::{AtomicI64, Ordering};

/// Environment variables set by launchers, in the order they are consulted.
pub const RANK_ENV_VARS: [&str; 4] = ["RANK", "LOCAL_RANK", "SLURM_PROCID", "JSM_NAMESPACE_RANK"];

// -1 means the rank wasn't resolved yet.
static RANK: AtomicI64 = AtomicI64::new(-1);

/// The global rank of the current process in a distributed run.
///
/// Resolved once from the first variable of [RANK_ENV_VARS] that is set, and cached for the
/// lifetime of the process. Defaults to `0` when none is set or the value isn't a valid rank.
pub fn rank() -> usize {
    let rank = RANK.load(Ordering::Relaxed);
    if rank >= 0 {
        return rank as usize;
    }

    let resolved = rank_from_env();
    // A concurrent `set_rank` wins over the environment.
    match RANK.compare_exchange(-1, resolved as i64, Ordering::Relaxed, Ordering::Relaxed) {
        Ok(_) => resolved,
        Err(current) => current as usize,
    }
}

/// Overrides the rank of the current process.
///
/// Launchers that spawn workers themselves call this in each worker once its rank is known.
pub fn set_rank(rank: usize) {
    RANK.store(rank as i64, Ordering::Relaxed);
}

/// Whether the current process is the rank-zero process.
pub fn is_rank_zero() -> bool {
    rank() == 0
}

fn rank_from_env() -> usize {
    for name in RANK_ENV_VARS {
        if let Ok(value) = std::env::var(name) {
            return match value.trim().parse::<usize>() {
                Ok(rank) => rank,
                Err(_) => {
                    log::warn!("Ignoring invalid rank `{value}` from `{name}`, assuming rank 0");
                    0
                }
            };
        }
    }

    0
}
