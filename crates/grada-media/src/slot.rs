/// Holds at most one live resource. Replacement is an exchange: the new
/// value is bound before the old one is handed back for release, so a
/// reader never observes an empty slot mid-swap.
#[derive(Debug)]
pub struct TextureSlot<T> {
    current: Option<T>,
}

impl<T> TextureSlot<T> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Bind `new` and return the previously bound value for disposal.
    #[must_use = "the previous texture must be released"]
    pub fn install(&mut self, new: T) -> Option<T> {
        self.current.replace(new)
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    /// Unbind for teardown.
    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }
}

impl<T> Default for TextureSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
