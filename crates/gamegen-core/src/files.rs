use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// How a `GeneratedFile` currently stores its `content` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    /// Plain text, exactly as extracted.
    Raw,
    /// Base64-encoded UTF-8 bytes, safe for JSON transport.
    Base64,
}

/// A file's recorded content could not be decoded back to text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileDecodeError {
    /// Content is not valid base64.
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Decoded bytes are not valid UTF-8.
    #[error("decoded content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One named file recovered from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// File name, unique within one generation's file set.
    pub name: String,
    /// File content, stored per `encoding`.
    pub content: String,
    /// Current content encoding.
    pub encoding: ContentEncoding,
}

impl GeneratedFile {
    /// Wraps raw text as a binary-safe (base64) file payload.
    pub fn from_raw(name: impl Into<String>, content: &str) -> Self {
        Self {
            name: name.into(),
            content: encode_content(content),
            encoding: ContentEncoding::Base64,
        }
    }

    /// Returns the decoded text content.
    pub fn decoded(&self) -> Result<String, FileDecodeError> {
        match self.encoding {
            ContentEncoding::Raw => Ok(self.content.clone()),
            ContentEncoding::Base64 => {
                let bytes = STANDARD.decode(self.content.as_bytes())?;
                Ok(String::from_utf8(bytes)?)
            }
        }
    }
}

/// Encodes raw text as base64 for transport.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_produces_decodable_base64() {
        let file = GeneratedFile::from_raw("index.html", "<html>hi</html>");
        assert_eq!(file.encoding, ContentEncoding::Base64);
        assert_ne!(file.content, "<html>hi</html>");
        assert_eq!(file.decoded().expect("decodes"), "<html>hi</html>");
    }

    #[test]
    fn raw_encoding_decodes_to_itself() {
        let file = GeneratedFile {
            name: "style.css".into(),
            content: "body { margin: 0; }".into(),
            encoding: ContentEncoding::Raw,
        };
        assert_eq!(file.decoded().expect("decodes"), "body { margin: 0; }");
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let file = GeneratedFile {
            name: "index.html".into(),
            content: "!!! not base64 !!!".into(),
            encoding: ContentEncoding::Base64,
        };
        assert!(matches!(file.decoded(), Err(FileDecodeError::Base64(_))));
    }
}
