/// Classification for fallback policy.
///
/// Used by the fallback resolver to decide how to react to an adapter failure.
///
/// # Behavior Summary
///
/// | Class | Try Next Adapter? | Penalize Adapter Spacing? |
/// |-------|-------------------|---------------------------|
/// | `Never` | No | No |
/// | `NextTierWithPenalty` | Yes | Yes (affects future requests) |
/// | `NextTier` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Terminal failure for the symbol. Nothing further down the chain can help.
    Never,

    /// Fall through to the next adapter and widen the spacing of this one.
    ///
    /// Used when the upstream pushes back (HTTP 429, timeouts). The penalty
    /// is recorded in the request spacer so the next refresh waits longer
    /// before calling this adapter again.
    NextTierWithPenalty,

    /// Fall through to the next adapter without recording any penalty.
    ///
    /// Used when this adapter simply has nothing for the symbol (unknown
    /// symbol, unparseable body, no usable price).
    NextTier,
}
