use crate::switch::Switch;

/// Store is an interface for whatever holds switch definitions: a database, a cache or an
/// in-memory map loaded at startup.
///
/// The evaluator only reads from it and never performs I/O of its own, so implementations should
/// answer from memory.
pub trait Store {
    /// Retrieve the switch with key `switch_key`.
    fn switch(&self, switch_key: &str) -> Option<&Switch>;

    /// Retrieve the switch an INHERIT switch takes its result from.
    ///
    /// Keys are hierarchical by default: the parent of `checkout:new_flow` is `checkout`.
    fn parent(&self, switch_key: &str) -> Option<&Switch> {
        let (parent_key, _) = switch_key.rsplit_once(':')?;
        self.switch(parent_key)
    }
}
