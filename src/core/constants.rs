pub const SPLIT_TOLERANCE: f64 = 0.01;

pub const TRANSACTIONS_COLLECTION: &str = "transactions";
pub const GROUPS_COLLECTION: &str = "groups";

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_GROUP_NAME: &str = "Untitled Group";
pub const UNKNOWN_PAYER_NAME: &str = "Unknown";

// Audit actions
pub const TRANSACTION_CREATED: &str = "TRANSACTION_CREATED";
pub const TRANSACTION_UPDATED: &str = "TRANSACTION_UPDATED";
pub const TRANSACTION_DELETED: &str = "TRANSACTION_DELETED";
pub const TRANSACTION_SETTLED: &str = "TRANSACTION_SETTLED";
pub const SETTLED_WITH_USER: &str = "SETTLED_WITH_USER";
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const SNAPSHOT_APPLIED: &str = "SNAPSHOT_APPLIED";

// Session store keys
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const USER_DATA_KEY: &str = "userData";
pub const THEME_KEY: &str = "theme";
