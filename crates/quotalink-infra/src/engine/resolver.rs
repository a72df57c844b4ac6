use super::context::Context;
use super::registry::Registry;

/// Combines a context's own utilization with the weighted utilization of
/// the contexts it links to.
///
/// Links are followed one hop only, so mutual links never recurse. Linked
/// contexts are read, never incremented; each read takes only the linked
/// store's shard read lock.
#[derive(Clone, Copy)]
pub struct LinkResolver<'a> {
    registry: &'a Registry,
}

impl<'a> LinkResolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// `own + Σ weight_i × linked_i.utilization(key, now)`.
    pub fn effective_utilization(&self, context: &Context, key: &str, own: u64, now: u64) -> f64 {
        context
            .links()
            .iter()
            .fold(own as f64, |total, link| {
                let linked = self.registry.by_index(link.target()).store().utilization(key, now);
                total + link.weight() * linked as f64
            })
    }
}
