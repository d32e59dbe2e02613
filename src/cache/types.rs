pub const SEMCACHE_STATUS_HEADER: &str = "X-Semcache-Status";
pub const SEMCACHE_STATUS_HEALTHY: &str = "healthy";
pub const SEMCACHE_STATUS_READY: &str = "ready";
pub const SEMCACHE_STATUS_NOT_READY: &str = "not_ready";
pub const SEMCACHE_STATUS_CLEARED: &str = "cleared";
pub const SEMCACHE_STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
