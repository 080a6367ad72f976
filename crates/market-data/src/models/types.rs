use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// One row as returned by a provider, column names untouched.
pub type RawRow = serde_json::Map<String, serde_json::Value>;
