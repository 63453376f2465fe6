//! Parsing of the protoc plugin parameter string.
//!
//! protoc passes everything before the `:` in `--openapiv2_out=<params>:<dir>`
//! as a single comma separated `key=value` list. A bare boolean key means
//! `true`.

use crate::{ConfigError, GenOption};

/// Options and invocation parameters extracted from a parameter string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginParameters {
    /// Caller options, in the order they appeared.
    pub options: Vec<GenOption>,
    /// `generate_rpc_methods`, if present.
    pub generate_rpc_methods: Option<bool>,
    /// `repeated_path_param_separator` token, if present. Validated by the pipeline.
    pub repeated_path_param_separator: Option<String>,
}

/// Parse a protoc parameter string.
pub fn parse_parameter(parameter: &str) -> Result<PluginParameters, ConfigError> {
    let mut parsed = PluginParameters::default();

    for pair in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (pair, None),
        };

        match key {
            "json_names_for_fields" => {
                parsed.options.push(GenOption::UseJsonNamesForFields(parse_bool(key, value)?))
            }
            "enums_as_ints" => parsed.options.push(GenOption::EnumsAsInts(parse_bool(key, value)?)),
            "disable_default_errors" => {
                parsed.options.push(GenOption::DisableDefaultErrors(parse_bool(key, value)?))
            }
            "allow_merge" => parsed.options.push(GenOption::AllowMerge(parse_bool(key, value)?)),
            "recursive-depth" => {
                let raw = require_value(key, value)?;
                let depth = raw.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidParameter(format!("{}={}: {}", key, raw, e))
                })?;
                parsed.options.push(GenOption::RecursiveDepth(depth));
            }
            "merge_file_name" => {
                let name = require_value(key, value)?;
                parsed.options.push(GenOption::MergeFileName(name.to_string()));
            }
            "generate_rpc_methods" => parsed.generate_rpc_methods = Some(parse_bool(key, value)?),
            "repeated_path_param_separator" => {
                parsed.repeated_path_param_separator = Some(require_value(key, value)?.to_string())
            }
            other => {
                return Err(ConfigError::InvalidParameter(format!("unknown parameter: {}", other)))
            }
        }
    }

    Ok(parsed)
}

fn require_value<'a>(key: &str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::InvalidParameter(format!("{} requires a value", key))),
    }
}

fn parse_bool(key: &str, value: Option<&str>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(true),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ConfigError::InvalidParameter(format!(
            "{}={}: expected true or false",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parameter() {
        let parsed = parse_parameter("").expect("empty parameter is valid");
        assert_eq!(parsed, PluginParameters::default());
    }

    #[test]
    fn test_options_keep_order() {
        let parsed = parse_parameter(
            "enums_as_ints=true,merge_file_name=api,recursive-depth=12,enums_as_ints=false",
        )
        .expect("valid parameter");
        assert_eq!(
            parsed.options,
            vec![
                GenOption::EnumsAsInts(true),
                GenOption::MergeFileName("api".to_string()),
                GenOption::RecursiveDepth(12),
                GenOption::EnumsAsInts(false),
            ]
        );
    }

    #[test]
    fn test_bare_bool_and_invocation_params() {
        let parsed =
            parse_parameter("allow_merge, generate_rpc_methods ,repeated_path_param_separator=ssv")
                .expect("valid parameter");
        assert_eq!(parsed.options, vec![GenOption::AllowMerge(true)]);
        assert_eq!(parsed.generate_rpc_methods, Some(true));
        assert_eq!(parsed.repeated_path_param_separator.as_deref(), Some("ssv"));
    }

    #[test]
    fn test_invalid_parameters() {
        for bad in ["unknown_key=1", "enums_as_ints=yes", "recursive-depth=-1", "merge_file_name="]
        {
            match parse_parameter(bad) {
                Err(ConfigError::InvalidParameter(_)) => {}
                other => panic!("Expected InvalidParameter for {:?}, got {:?}", bad, other),
            }
        }
    }
}
