use serde::Deserialize;

///
/// SearchConfig
///
/// Process-level compiler configuration. The q alias names the reserved
/// broad-search parameter; the depth cap is the safety net against
/// misconfigured relation graphs whose non-q triggers recurse at every hop.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub q_alias: String,
    pub max_depth: usize,
}

impl SearchConfig {
    pub const DEFAULT_Q_ALIAS: &'static str = "q";
    pub const DEFAULT_MAX_DEPTH: usize = 8;
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            q_alias: Self::DEFAULT_Q_ALIAS.to_string(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
