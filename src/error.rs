use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptsvgError {
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Invalid SVG: {0}")]
    InvalidSvg(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't parse config JSON.\n{0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Couldn't parse config YAML.\n{0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("couldn't find config file '{}'.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("directory '{}' is not a config file.", .0.display())]
    ConfigIsDir(PathBuf),

    #[error("invalid config file '{}'.", .0.display())]
    InvalidConfig(PathBuf),

    #[error("config root must be a mapping.")]
    ConfigNotMapping,

    #[error("Invalid plugin entry: {0}")]
    InvalidPlugin(String),

    #[error("Option '--datauri' must have one of the following values: 'base64', 'enc' or 'unenc', got '{0}'")]
    InvalidDataUri(String),

    #[error("Invalid Data-URI payload: {0}")]
    DataUriDecode(String),

    #[error("No SVG files have been found in '{}' directory.", .0.display())]
    NoSvgFiles(PathBuf),

    #[error("output '{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),
}
