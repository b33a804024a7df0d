//! Application Services
//!
//! Application services coordinate the domain mappings with the quote
//! session adapters.

mod historical_datafeed;

pub use historical_datafeed::{
    BarHistory, Completeness, FutuDatafeed, InitError, RSA_KEY_DIR, RSA_KEY_FILE,
    default_install_dir, rsa_key_path,
};
