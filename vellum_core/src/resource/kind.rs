// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource kinds and the reference slots that accept them.

/// The kind of effect a [`ResourceContainer`](super::ResourceContainer)
/// defines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A clip path.
    Clipper,
    /// A mask.
    Masker,
    /// A filter chain.
    Filter,
    /// A marker drawn at path vertices.
    Marker,
    /// A linear gradient paint server.
    LinearGradient,
    /// A radial gradient paint server.
    RadialGradient,
    /// A pattern paint server.
    Pattern,
    /// A solid colour paint server.
    ///
    /// Never bound by id from fill or stroke; it is what a paint falls back
    /// to when its reference does not resolve.
    SolidColor,
}

impl ResourceKind {
    /// Returns `true` for gradients and patterns.
    #[must_use]
    pub const fn is_gradient_or_pattern(self) -> bool {
        matches!(
            self,
            Self::LinearGradient | Self::RadialGradient | Self::Pattern
        )
    }
}

/// One of the nine reference fields a consumer may carry.
///
/// Each slot accepts a fixed set of [`ResourceKind`]s; a reference whose
/// target has a different kind is treated as unresolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceSlot {
    /// `clip-path`.
    Clipper,
    /// `mask`.
    Masker,
    /// `filter`.
    Filter,
    /// `marker-start`.
    MarkerStart,
    /// `marker-mid`.
    MarkerMid,
    /// `marker-end`.
    MarkerEnd,
    /// `fill`.
    Fill,
    /// `stroke`.
    Stroke,
    /// An `href` inheritance link between gradients, patterns, or filters.
    LinkedResource,
}

impl ResourceSlot {
    /// Number of slots.
    pub const COUNT: usize = 9;

    /// All slots, in bundle order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Clipper,
        Self::Masker,
        Self::Filter,
        Self::MarkerStart,
        Self::MarkerMid,
        Self::MarkerEnd,
        Self::Fill,
        Self::Stroke,
        Self::LinkedResource,
    ];

    /// Maps the slot to its array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Clipper => 0,
            Self::Masker => 1,
            Self::Filter => 2,
            Self::MarkerStart => 3,
            Self::MarkerMid => 4,
            Self::MarkerEnd => 5,
            Self::Fill => 6,
            Self::Stroke => 7,
            Self::LinkedResource => 8,
        }
    }

    /// Returns whether a container of `kind` can satisfy this slot.
    #[must_use]
    pub const fn accepts(self, kind: ResourceKind) -> bool {
        match self {
            Self::Clipper => matches!(kind, ResourceKind::Clipper),
            Self::Masker => matches!(kind, ResourceKind::Masker),
            Self::Filter => matches!(kind, ResourceKind::Filter),
            Self::MarkerStart | Self::MarkerMid | Self::MarkerEnd => {
                matches!(kind, ResourceKind::Marker)
            }
            Self::Fill | Self::Stroke => kind.is_gradient_or_pattern(),
            Self::LinkedResource => {
                kind.is_gradient_or_pattern() || matches!(kind, ResourceKind::Filter)
            }
        }
    }

    /// Returns the style property name this slot is read from.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clipper => "clip-path",
            Self::Masker => "mask",
            Self::Filter => "filter",
            Self::MarkerStart => "marker-start",
            Self::MarkerMid => "marker-mid",
            Self::MarkerEnd => "marker-end",
            Self::Fill => "fill",
            Self::Stroke => "stroke",
            Self::LinkedResource => "href",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_indices_match_all_order() {
        for (i, slot) in ResourceSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i, "{slot:?} out of order");
        }
    }

    #[test]
    fn paint_slots_accept_gradients_and_patterns_only() {
        for slot in [ResourceSlot::Fill, ResourceSlot::Stroke] {
            assert!(slot.accepts(ResourceKind::LinearGradient));
            assert!(slot.accepts(ResourceKind::RadialGradient));
            assert!(slot.accepts(ResourceKind::Pattern));
            assert!(!slot.accepts(ResourceKind::SolidColor));
            assert!(!slot.accepts(ResourceKind::Filter));
        }
    }

    #[test]
    fn linked_resource_accepts_filters() {
        assert!(ResourceSlot::LinkedResource.accepts(ResourceKind::Filter));
        assert!(ResourceSlot::LinkedResource.accepts(ResourceKind::Pattern));
        assert!(!ResourceSlot::LinkedResource.accepts(ResourceKind::Clipper));
    }

    #[test]
    fn markers_share_one_kind() {
        for slot in [
            ResourceSlot::MarkerStart,
            ResourceSlot::MarkerMid,
            ResourceSlot::MarkerEnd,
        ] {
            assert!(slot.accepts(ResourceKind::Marker));
            assert!(!slot.accepts(ResourceKind::Masker));
        }
    }
}
