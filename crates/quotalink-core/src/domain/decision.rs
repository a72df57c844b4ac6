/// Outcome of one consumption attempt against a context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub allowed: bool,
    /// Effective utilization compared against `limit`, links included.
    pub utilization: f64,
    pub limit: u64,
}

impl Decision {
    /// Evaluate the post-increment utilization against the quota.
    ///
    /// The request that pushes utilization over `limit` has already been
    /// counted; it is rejected, not uncounted.
    pub fn evaluate(utilization: f64, limit: u64) -> Self {
        Self {
            allowed: utilization <= limit as f64,
            utilization,
            limit,
        }
    }
}
