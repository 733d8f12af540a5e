use serde::Serialize;

/// Maximum number of transactions a torrent node returns per history request
pub const HISTORY_LIMIT: u64 = 9999;

/// Filters for `fetch-history-filter`. Only enabled flags are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilters {
    #[serde(skip_serializing_if = "is_false")]
    pub is_input: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_output: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_success: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_forging: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_test: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_delegate: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl HistoryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, enabled: bool) -> Self {
        self.is_input = enabled;
        self
    }

    pub fn output(mut self, enabled: bool) -> Self {
        self.is_output = enabled;
        self
    }

    pub fn success(mut self, enabled: bool) -> Self {
        self.is_success = enabled;
        self
    }

    pub fn forging(mut self, enabled: bool) -> Self {
        self.is_forging = enabled;
        self
    }

    pub fn test(mut self, enabled: bool) -> Self {
        self.is_test = enabled;
        self
    }

    pub fn delegate(mut self, enabled: bool) -> Self {
        self.is_delegate = enabled;
        self
    }
}
