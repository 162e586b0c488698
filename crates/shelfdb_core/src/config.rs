//! Database configuration.

use shelfdb_codec::Format;

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the base directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to hold an advisory lock on the base directory.
    pub lock_directory: bool,

    /// Serialization format of collection files.
    pub format: Format,

    /// Whether JSON files are pretty-printed.
    pub pretty: bool,

    /// Whether every save is fsynced before it is reported done.
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            lock_directory: true,
            format: Format::Json,
            pretty: true,
            sync_on_write: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the base directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to lock the base directory.
    #[must_use]
    pub const fn lock_directory(mut self, value: bool) -> Self {
        self.lock_directory = value;
        self
    }

    /// Sets the serialization format.
    #[must_use]
    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets whether JSON output is pretty-printed.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }

    /// Sets whether every save is fsynced.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.lock_directory);
        assert!(config.pretty);
        assert!(config.sync_on_write);
        assert_eq!(config.format, Format::Json);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .format(Format::Cbor)
            .pretty(false)
            .sync_on_write(false);

        assert!(!config.create_if_missing);
        assert_eq!(config.format, Format::Cbor);
        assert!(!config.pretty);
        assert!(!config.sync_on_write);
    }
}
