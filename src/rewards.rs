//! Experience points awarded for answered queries.
//!
//! Cached answers earn a token amount so fresh questions stay more
//! rewarding. The ledger that accumulates these lives outside this crate.

/// XP for an answer served from cache.
pub const CACHED_QUERY_XP: u32 = 2;
/// Base XP for a freshly generated answer.
pub const FRESH_QUERY_XP: u32 = 10;
/// Bonus for a fresh answer that asked for a summary.
pub const SUMMARY_BONUS_XP: u32 = 5;
/// Bonus for a fresh answer whose issue was dictated by voice.
pub const VOICE_BONUS_XP: u32 = 5;

/// XP earned by one answered query.
pub fn query_reward(from_cache: bool, summarize: bool, voice_used: bool) -> u32 {
    if from_cache {
        return CACHED_QUERY_XP;
    }
    let mut xp = FRESH_QUERY_XP;
    if summarize {
        xp += SUMMARY_BONUS_XP;
    }
    if voice_used {
        xp += VOICE_BONUS_XP;
    }
    xp
}
