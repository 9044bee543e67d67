//! Structured Logging with Sensitive Data Redaction
//!
//! Provides safe logging that automatically redacts:
//! - Secret seeds (S...), by key name or by value
//! - Passphrases and passwords
//! - Full addresses and transaction hashes (partial redaction)
//! - Envelope XDR (length only)

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let redacted = redact_if_sensitive(key, &value_str);
        self.fields.push((key, redacted));
        self
    }

    /// `[timestamp] LEVEL [module] message | k=v ...`
    pub fn format_line(&self, timestamp: &str) -> String {
        let mut line = format!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Write the entry to stderr; debug entries only when enabled
    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        eprintln!("{}", self.format_line(&timestamp));
    }
}

/// Redact a value if the key or the value itself looks sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    if looks_like_secret_seed(value) {
        return redact_value(value);
    }

    let key_lower = key.to_lowercase();

    // Keys that should always be fully redacted
    let fully_redacted_keys = [
        "secret", "seed", "private", "password", "signing_key", "mnemonic",
    ];
    if fully_redacted_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_value(value);
    }

    // Envelopes are long and not useful in logs
    if key_lower.contains("xdr") || key_lower.contains("envelope") {
        return format!("[XDR:{}chars]", value.len());
    }

    // Keys with transaction hashes - show partial
    let hash_keys = ["tx_hash", "hash", "txhash"];
    if hash_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_hash(value);
    }

    // Keys that should be partially redacted (addresses)
    let address_keys = [
        "address", "account", "recipient", "sender", "destination", "source", "from", "to",
        "contract",
    ];
    if address_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_address(value);
    }

    value.to_string()
}

/// An S... strkey of seed length, whatever field it was passed in
fn looks_like_secret_seed(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.len() == 56
        && trimmed.starts_with('S')
        && trimmed.chars().all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c))
}

/// Fully redact a sensitive value
fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (show first 6 and last 4 chars)
fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = 6;
    let suffix_len = 4;

    if trimmed.len() <= prefix_len + suffix_len + 3 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Partially redact a hash (show first 10 and last 6 chars)
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if trimmed.len() <= 20 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }

    let prefix = &trimmed[..10];
    let suffix = &trimmed[trimmed.len() - 6..];

    format!("{}...{}", prefix, suffix)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wallet_log {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg,
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// `log_debug!("module", "message", key = value, ...)`
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__wallet_log!(Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__wallet_log!(Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__wallet_log!(Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::__wallet_log!(Error, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "GDMTVHLWJTHSUDMZVVMXXH6VJHA2ZV3HNG5LYNAZ6RTWB7GISM6PGTUV";
    const SECRET: &str = "SCZANGBA5YHTNYVVV4C3U252E2B6P6F5T3U6MM63WBSBZATAQI3EBTQ4";

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_redact_address() {
        let redacted = redact_address(ACCOUNT);
        assert_eq!(redacted, "GDMTVH...GTUV");
        assert_eq!(redact_address("short"), "short");
    }

    #[test]
    fn test_redact_hash() {
        let hash = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        let redacted = redact_hash(hash);
        assert!(redacted.starts_with("1234567890"));
        assert!(redacted.ends_with("abcdef"));
    }

    #[test]
    fn test_redact_if_sensitive() {
        assert!(redact_if_sensitive("secret", "whatever").contains("REDACTED"));
        // Secret seeds are caught by value
        assert!(redact_if_sensitive("memo", SECRET).contains("REDACTED"));
        assert!(redact_if_sensitive("destination", ACCOUNT).contains("..."));
        assert_eq!(redact_if_sensitive("signed_xdr", "AAAA"), "[XDR:4chars]");
        assert_eq!(redact_if_sensitive("amount", "100"), "100");
    }

    #[test]
    fn test_log_entry() {
        let entry = LogEntry::new(LogLevel::Info, "test", "Test message")
            .field("amount", "100")
            .field("secret_key", SECRET)
            .field("recipient", ACCOUNT);

        let secret = entry.fields.iter().find(|(k, _)| *k == "secret_key");
        assert!(secret.unwrap().1.contains("REDACTED"));

        let recipient = entry.fields.iter().find(|(k, _)| *k == "recipient");
        assert!(recipient.unwrap().1.contains("..."));
    }

    #[test]
    fn test_format_line() {
        let entry = LogEntry::new(LogLevel::Warn, "horizon", "Submission failed")
            .field("status", 504)
            .field("hash", "1234567890abcdef1234567890abcdef");
        assert_eq!(
            entry.format_line("T"),
            "[T] WARN [horizon] Submission failed | status=504 hash=1234567890...abcdef"
        );
        assert_eq!(
            LogEntry::new(LogLevel::Info, "fees", "Done").format_line("T"),
            "[T] INFO [fees] Done"
        );
    }
}
