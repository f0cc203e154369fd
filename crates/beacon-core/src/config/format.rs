use crate::error::ConfigError;

use super::Config;

pub trait Format<'a> {
    /// Parse the provided document and return a fully parsed config
    fn parse(&self) -> Result<Config, ConfigError>;

    /// Convert the format to a string representation
    fn to_format_string(&self, config: &Config) -> Result<String, ConfigError>;
}
