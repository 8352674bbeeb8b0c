//! Math-rendering capability injection and rescan gating.
//!
//! The renderer may be missing when the host starts and show up later. The
//! host installs it into a [`MathCapability`], which bumps an epoch; views
//! compare that epoch with the one they last rendered against and rescan
//! when it moved. Everything is passed explicitly into each scan.

/// Slot holding the host's math renderer, if any, plus a capability epoch.
#[derive(Debug)]
pub struct MathCapability<R> {
    renderer: Option<R>,
    epoch: u64,
}

impl<R> Default for MathCapability<R> {
    fn default() -> Self {
        Self {
            renderer: None,
            epoch: 0,
        }
    }
}

impl<R> MathCapability<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `renderer` if none is present yet.
    ///
    /// Returns `true` and bumps the epoch when installed; a renderer that is
    /// already present is kept and `false` is returned.
    pub fn install(&mut self, renderer: R) -> bool {
        if self.renderer.is_some() {
            return false;
        }
        self.renderer = Some(renderer);
        self.epoch += 1;
        tracing::debug!(target: "livemark::capability", epoch = self.epoch, "math renderer installed");
        true
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Borrow the capability for one scan.
    pub fn context(&self) -> ScanContext<'_, R> {
        ScanContext {
            renderer: self.renderer.as_ref(),
            epoch: self.epoch,
        }
    }
}

/// What a single scan may use from the capability slot.
#[derive(Debug)]
pub struct ScanContext<'a, R> {
    pub renderer: Option<&'a R>,
    pub epoch: u64,
}

impl<R> Clone for ScanContext<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ScanContext<'_, R> {}

/// What changed in the host view since the last update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub doc_changed: bool,
    pub viewport_changed: bool,
    pub selection_set: bool,
    pub focus_changed: bool,
}

impl ViewUpdate {
    pub fn any(&self) -> bool {
        self.doc_changed || self.viewport_changed || self.selection_set || self.focus_changed
    }
}

/// Per-view record of the capability epoch its decorations were built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RescanGate {
    seen_epoch: u64,
}

impl RescanGate {
    pub fn new(epoch: u64) -> Self {
        Self { seen_epoch: epoch }
    }

    /// Whether the view must rescan for `update` given the current epoch.
    /// Records `epoch` as seen.
    pub fn needs_rescan(&mut self, update: &ViewUpdate, epoch: u64) -> bool {
        let epoch_moved = epoch != self.seen_epoch;
        self.seen_epoch = epoch;
        epoch_moved || update.any()
    }

    pub fn seen_epoch(&self) -> u64 {
        self.seen_epoch
    }
}
