use std::borrow::Cow;

/// Adapter identifier - mostly static constants
pub type AdapterId = Cow<'static, str>;

/// Exchange code of a holding as the user entered it (e.g. "HDFCBANK")
pub type Symbol = String;
