//! Typed reads of environment-style settings

use std::str::FromStr;

use crate::secrets::SecretStore;

use super::error::{ConfigError, ConfigResult};

/// Read and parse `key`; `Ok(None)` when unset
pub fn read<T>(source: &dyn SecretStore, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid_value(key, raw.clone(), e.to_string())),
    }
}

/// Overwrite `target` when `key` is set
pub fn overlay<T>(source: &dyn SecretStore, key: &str, target: &mut T) -> ConfigResult<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = read(source, key)? {
        *target = value;
    }
    Ok(())
}

/// Overwrite an optional `target` when `key` is set
pub fn overlay_opt<T>(source: &dyn SecretStore, key: &str, target: &mut Option<T>) -> ConfigResult<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = read(source, key)? {
        *target = Some(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_read_parses_and_trims() {
        let source = MemorySecretStore::from_pairs([("PORT", " 8081 ")]);
        assert_eq!(read::<u16>(&source, "PORT").unwrap(), Some(8081));
        assert_eq!(read::<u16>(&source, "MISSING").unwrap(), None);
    }

    #[test]
    fn test_read_invalid_value() {
        let source = MemorySecretStore::from_pairs([("PORT", "eighty")]);
        let err = read::<u16>(&source, "PORT").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn test_overlay_keeps_default_when_unset() {
        let source = MemorySecretStore::new();
        let mut port = 3000u16;
        overlay(&source, "MCP_SERVER_PORT", &mut port).unwrap();
        assert_eq!(port, 3000);

        let mut ttl: Option<u64> = None;
        source.store("MCP_TOOL_CACHE_TTL_SEC", "60").unwrap();
        overlay_opt(&source, "MCP_TOOL_CACHE_TTL_SEC", &mut ttl).unwrap();
        assert_eq!(ttl, Some(60));
    }
}
