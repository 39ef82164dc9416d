pub mod operations;

pub use operations::{
    BindOutcome, CODE_MAX_LEN, CODE_MIN_LEN, CodeStats, DEVICE_ID_MAX_LEN, RECENT_BINDINGS_LIMIT,
    RemovalReceipt, add, bind, get, list, normalize_code, remove, stats,
};
