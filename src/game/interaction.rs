// Cursor hover targets and the highlightable capability.
//
// The player controller keeps two hover references: the target under the
// cursor last frame and this frame. Each frame the last reference takes the
// old "this" value, the new "this" value comes from the cursor trace, and
// the pair decides which targets get highlighted or unhighlighted:
//
//   last   this        action
//   none   none        -
//   none   some        highlight this
//   some   none        unhighlight last
//   x      y (x != y)  unhighlight last, then highlight this
//   x      x           -

/// Stencil values written to custom depth by highlighted meshes.
/// The renderer maps each value to an outline color.
pub const CUSTOM_DEPTH_RED: u8 = 250;
pub const CUSTOM_DEPTH_BLUE: u8 = 251;
pub const CUSTOM_DEPTH_TAN: u8 = 252;

/// An in-world entity that can render a highlight outline.
pub trait Highlightable {
    fn highlight_actor(&mut self);
    fn unhighlight_actor(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOp {
    Highlight,
    Unhighlight,
}

impl HighlightOp {
    pub fn apply(self, target: &mut impl Highlightable) {
        match self {
            HighlightOp::Highlight => target.highlight_actor(),
            HighlightOp::Unhighlight => target.unhighlight_actor(),
        }
    }
}

/// What one frame of hover tracking asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange<T> {
    Unchanged,
    Highlight(T),
    Unhighlight(T),
    Switch { from: T, to: T },
}

impl<T: Copy> HoverChange<T> {
    /// Visit the highlight operations in the order they must run:
    /// the old target is unhighlighted before the new one is highlighted.
    pub fn for_each(self, mut f: impl FnMut(T, HighlightOp)) {
        match self {
            HoverChange::Unchanged => {}
            HoverChange::Highlight(to) => f(to, HighlightOp::Highlight),
            HoverChange::Unhighlight(from) => f(from, HighlightOp::Unhighlight),
            HoverChange::Switch { from, to } => {
                f(from, HighlightOp::Unhighlight);
                f(to, HighlightOp::Highlight);
            }
        }
    }
}

/// Last-frame and this-frame hover references, compared by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTargets<T> {
    last_actor: Option<T>,
    this_actor: Option<T>,
}

impl<T> Default for HoverTargets<T> {
    fn default() -> Self {
        Self {
            last_actor: None,
            this_actor: None,
        }
    }
}

impl<T: Copy + PartialEq> HoverTargets<T> {
    pub fn last_actor(&self) -> Option<T> {
        self.last_actor
    }

    pub fn this_actor(&self) -> Option<T> {
        self.this_actor
    }

    /// Drop the current reference if `is_valid` rejects it, e.g. because the
    /// entity was despawned since the last frame. A dropped reference then
    /// behaves exactly like "none" in the next `advance`.
    pub fn retain(&mut self, mut is_valid: impl FnMut(T) -> bool) {
        if self.this_actor.is_some_and(|t| !is_valid(t)) {
            self.this_actor = None;
        }
    }

    /// Shift this frame's target into `last`, store `hovered` as the new
    /// target and report the highlight work for the frame.
    pub fn advance(&mut self, hovered: Option<T>) -> HoverChange<T> {
        self.last_actor = self.this_actor;
        self.this_actor = hovered;

        match (self.last_actor, self.this_actor) {
            (None, None) => HoverChange::Unchanged,
            (None, Some(this)) => HoverChange::Highlight(this),
            (Some(last), None) => HoverChange::Unhighlight(last),
            (Some(last), Some(this)) if last != this => HoverChange::Switch { from: last, to: this },
            (Some(_), Some(_)) => HoverChange::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Highlight(u32),
        Unhighlight(u32),
    }

    /// Fake world: records calls and the set of currently highlighted ids.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        highlighted: HashSet<u32>,
    }

    struct Target<'a> {
        id: u32,
        recorder: &'a mut Recorder,
    }

    impl Highlightable for Target<'_> {
        fn highlight_actor(&mut self) {
            self.recorder.calls.push(Call::Highlight(self.id));
            self.recorder.highlighted.insert(self.id);
        }

        fn unhighlight_actor(&mut self) {
            self.recorder.calls.push(Call::Unhighlight(self.id));
            self.recorder.highlighted.remove(&self.id);
        }
    }

    fn frame(targets: &mut HoverTargets<u32>, recorder: &mut Recorder, hovered: Option<u32>) -> Vec<Call> {
        let start = recorder.calls.len();
        targets.advance(hovered).for_each(|id, op| {
            op.apply(&mut Target { id, recorder: &mut *recorder });
        });
        recorder.calls[start..].to_vec()
    }

    const A: u32 = 1;
    const B: u32 = 2;

    #[test]
    fn test_nothing_hovered_makes_no_calls() {
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();
        assert_eq!(frame(&mut targets, &mut recorder, None), Vec::<Call>::new());
    }

    #[test]
    fn test_new_target_is_highlighted() {
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();
        assert_eq!(frame(&mut targets, &mut recorder, Some(A)), vec![Call::Highlight(A)]);
    }

    #[test]
    fn test_leaving_target_unhighlights_it() {
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();
        frame(&mut targets, &mut recorder, Some(A));
        assert_eq!(frame(&mut targets, &mut recorder, None), vec![Call::Unhighlight(A)]);
    }

    #[test]
    fn test_switching_targets_unhighlights_before_highlighting() {
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();
        assert_eq!(frame(&mut targets, &mut recorder, Some(A)), vec![Call::Highlight(A)]);
        assert_eq!(
            frame(&mut targets, &mut recorder, Some(B)),
            vec![Call::Unhighlight(A), Call::Highlight(B)]
        );
    }

    #[test]
    fn test_same_target_twice_is_idempotent() {
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();
        assert_eq!(frame(&mut targets, &mut recorder, Some(A)), vec![Call::Highlight(A)]);
        assert_eq!(frame(&mut targets, &mut recorder, Some(A)), Vec::<Call>::new());
        assert_eq!(targets.last_actor(), Some(A));
        assert_eq!(targets.this_actor(), Some(A));
    }

    #[test]
    fn test_only_current_target_stays_highlighted() {
        let sequence = [
            Some(A), Some(A), None, Some(B), Some(A), None, None, Some(B), Some(B), Some(3), None, Some(A),
        ];
        let mut targets = HoverTargets::default();
        let mut recorder = Recorder::default();

        for hovered in sequence {
            frame(&mut targets, &mut recorder, hovered);
            let expected: HashSet<u32> = hovered.into_iter().collect();
            assert_eq!(recorder.highlighted, expected);
        }
    }

    #[test]
    fn test_last_always_takes_previous_this() {
        let mut targets = HoverTargets::default();
        targets.advance(Some(A));
        targets.advance(None);
        assert_eq!(targets.last_actor(), Some(A));
        assert_eq!(targets.this_actor(), None);
        targets.advance(None);
        assert_eq!(targets.last_actor(), None);
    }

    #[test]
    fn test_invalidated_target_counts_as_none() {
        let mut targets = HoverTargets::default();
        targets.advance(Some(A));

        // A went away between frames
        targets.retain(|id| id != A);
        assert_eq!(targets.advance(Some(B)), HoverChange::Highlight(B));

        targets.retain(|id| id != A);
        assert_eq!(targets.this_actor(), Some(B));
        assert_eq!(targets.advance(None), HoverChange::Unhighlight(B));
    }
}
