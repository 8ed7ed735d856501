/// Keyed admission control guarding the expensive pipeline entry point.
/// Soft throttling: the backing store may be process-local and lossy.
pub trait RateLimiter: Send + Sync {
    /// Admits and records the request, or rejects it.
    fn admit(&self, key: &str) -> bool;
}
