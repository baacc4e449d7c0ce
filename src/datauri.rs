//! SVG Data-URI encoding and decoding.

use std::str::FromStr;
use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use serde::Deserialize;

use crate::error::OptsvgError;

const PREFIX: &str = "data:image/svg+xml";

static SVG_DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)data:image/svg\+xml(;charset=[^;,]*)?(;base64)?,(.*)").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataUriKind {
    Base64,
    /// URI-component encoded
    Enc,
    /// Raw markup after the comma
    Unenc,
}

impl FromStr for DataUriKind {
    type Err = OptsvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base64" => Ok(DataUriKind::Base64),
            "enc" => Ok(DataUriKind::Enc),
            "unenc" => Ok(DataUriKind::Unenc),
            other => Err(OptsvgError::InvalidDataUri(other.to_string())),
        }
    }
}

pub fn encode(svg: &str, kind: DataUriKind) -> String {
    match kind {
        DataUriKind::Base64 => format!("{PREFIX};base64,{}", BASE64_STANDARD.encode(svg)),
        DataUriKind::Enc => format!("{PREFIX},{}", urlencoding::encode(svg)),
        DataUriKind::Unenc => format!("{PREFIX},{svg}"),
    }
}

/// Extract the markup from an SVG Data-URI.
///
/// Anything that isn't one is returned unchanged.
pub fn decode(s: &str) -> Result<String, OptsvgError> {
    let Some(caps) = SVG_DATA_URI.captures(s) else {
        return Ok(s.to_string());
    };
    let data = caps.get(3).map_or("", |m| m.as_str());

    if caps.get(2).is_some() {
        let bytes = BASE64_STANDARD
            .decode(data.trim())
            .map_err(|e| OptsvgError::DataUriDecode(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        Ok(text)
    } else if data.starts_with('%') {
        urlencoding::decode(data)
            .map(|decoded| decoded.into_owned())
            .map_err(|e| OptsvgError::DataUriDecode(e.to_string()))
    } else {
        Ok(data.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;

    #[test]
    fn test_encode_base64() {
        let uri = encode(SVG, DataUriKind::Base64);
        assert!(uri.starts_with("data:image/svg+xml;base64,PHN2Zy"));
        assert_eq!(decode(&uri).unwrap(), SVG);
    }

    #[test]
    fn test_encode_enc() {
        let uri = encode("<svg/>", DataUriKind::Enc);
        assert_eq!(uri, "data:image/svg+xml,%3Csvg%2F%3E");
        assert_eq!(decode(&uri).unwrap(), "<svg/>");
    }

    #[test]
    fn test_encode_unenc() {
        let uri = encode(SVG, DataUriKind::Unenc);
        assert_eq!(uri, format!("data:image/svg+xml,{SVG}"));
        assert_eq!(decode(&uri).unwrap(), SVG);
    }

    #[test]
    fn test_decode_with_charset() {
        let uri = "data:image/svg+xml;charset=utf-8;base64,PHN2Zy8+";
        assert_eq!(decode(uri).unwrap(), "<svg/>");
    }

    #[test]
    fn test_decode_passes_through_plain_markup() {
        assert_eq!(decode(SVG).unwrap(), SVG);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(decode("data:image/svg+xml;base64,@@@").is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("enc".parse::<DataUriKind>().unwrap(), DataUriKind::Enc);
        assert!("gzip".parse::<DataUriKind>().is_err());
    }
}
