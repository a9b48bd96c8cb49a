use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// No sources were supplied, so there is no initial golden table.
    EmptySources,
    /// The key spec names no fields.
    EmptyKeySpec,
    /// A field appears more than once in the key spec.
    DuplicateKeyField(String),
    /// Threshold or limit outside its accepted range.
    InvalidParameter(String),
    /// Stop-word resource is unreadable or malformed.
    StopWords(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no sources, blank source name, etc.).
    ConfigValidation(String),
    /// A source does not carry one of the key fields.
    MissingColumn { source: String, column: String },
    /// Malformed CSV data in a source.
    Csv { source: String, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

/// Coarse grouping used by callers to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Schema,
    Input,
}

impl ReconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptySources
            | Self::EmptyKeySpec
            | Self::DuplicateKeyField(_)
            | Self::InvalidParameter(_)
            | Self::StopWords(_)
            | Self::ConfigParse(_)
            | Self::ConfigValidation(_) => ErrorKind::Configuration,
            Self::MissingColumn { .. } => ErrorKind::Schema,
            Self::Csv { .. } | Self::Io(_) => ErrorKind::Input,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySources => write!(f, "at least one source is required"),
            Self::EmptyKeySpec => write!(f, "key spec must name at least one field"),
            Self::DuplicateKeyField(field) => {
                write!(f, "key field '{field}' is listed more than once")
            }
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::StopWords(msg) => write!(f, "stop words: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing key column '{column}'")
            }
            Self::Csv { source, message } => write!(f, "source '{source}': {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(ReconError::EmptySources.kind(), ErrorKind::Configuration);
        assert_eq!(ReconError::StopWords("x".into()).kind(), ErrorKind::Configuration);
        let schema = ReconError::MissingColumn { source: "a".into(), column: "name".into() };
        assert_eq!(schema.kind(), ErrorKind::Schema);
        assert_eq!(schema.to_string(), "source 'a': missing key column 'name'");
        assert_eq!(ReconError::Io("gone".into()).kind(), ErrorKind::Input);
    }
}
