//! # Content Types
//! src/http/content_type.rs
//!
//! Tipos de contenido (MIME) que el servidor sabe declarar en el header
//! `Content-Type`.

use std::str::FromStr;
use thiserror::Error;

/// Error al interpretar un MIME desconocido
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentTypeError {
    #[error("unknown content type: {0}")]
    Unknown(String),
}

/// Tipo de contenido de una respuesta o archivo servido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    // Texto
    TextPlain,
    TextHtml,
    TextCss,
    TextJavaScript,
    TextXml,
    TextCsv,

    // Aplicación
    ApplicationJson,
    ApplicationXml,
    ApplicationXhtmlXml,
    ApplicationJavaScript,
    ApplicationOctetStream,
    ApplicationFormUrlencoded,
    ApplicationPdf,
    ApplicationZip,
    ApplicationGzip,
    ApplicationSql,
    ApplicationRtf,
    ApplicationMsPowerPoint,
    ApplicationMsExcel,
    ApplicationMsWord,
    ApplicationOpenDocumentText,
    ApplicationOpenDocumentSpreadsheet,

    // Imágenes
    ImageJpeg,
    ImagePng,
    ImageGif,
    ImageBmp,
    ImageWebp,
    ImageSvgXml,
    ImageTiff,
    ImageHeic,
    ImageXIcon,

    // Audio
    AudioMpeg,
    AudioOgg,
    AudioWav,

    // Video
    VideoMp4,
    VideoMpeg,
    VideoOgg,
    VideoWebm,

    // Multipart
    MultipartFormData,
    MultipartByteranges,

    // Fuentes
    FontTtf,
    FontWoff,
    FontWoff2,
    FontOtf,
}

/// Todas las variantes, usado para el parsing inverso
const ALL: [ContentType; 44] = [
    ContentType::TextPlain,
    ContentType::TextHtml,
    ContentType::TextCss,
    ContentType::TextJavaScript,
    ContentType::TextXml,
    ContentType::TextCsv,
    ContentType::ApplicationJson,
    ContentType::ApplicationXml,
    ContentType::ApplicationXhtmlXml,
    ContentType::ApplicationJavaScript,
    ContentType::ApplicationOctetStream,
    ContentType::ApplicationFormUrlencoded,
    ContentType::ApplicationPdf,
    ContentType::ApplicationZip,
    ContentType::ApplicationGzip,
    ContentType::ApplicationSql,
    ContentType::ApplicationRtf,
    ContentType::ApplicationMsPowerPoint,
    ContentType::ApplicationMsExcel,
    ContentType::ApplicationMsWord,
    ContentType::ApplicationOpenDocumentText,
    ContentType::ApplicationOpenDocumentSpreadsheet,
    ContentType::ImageJpeg,
    ContentType::ImagePng,
    ContentType::ImageGif,
    ContentType::ImageBmp,
    ContentType::ImageWebp,
    ContentType::ImageSvgXml,
    ContentType::ImageTiff,
    ContentType::ImageHeic,
    ContentType::ImageXIcon,
    ContentType::AudioMpeg,
    ContentType::AudioOgg,
    ContentType::AudioWav,
    ContentType::VideoMp4,
    ContentType::VideoMpeg,
    ContentType::VideoOgg,
    ContentType::VideoWebm,
    ContentType::MultipartFormData,
    ContentType::MultipartByteranges,
    ContentType::FontTtf,
    ContentType::FontWoff,
    ContentType::FontWoff2,
    ContentType::FontOtf,
];

impl ContentType {
    /// MIME canónico para el header `Content-Type`
    ///
    /// # Ejemplo
    /// ```
    /// use telar::http::ContentType;
    /// assert_eq!(ContentType::TextHtml.as_str(), "text/html");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
            ContentType::TextCss => "text/css",
            ContentType::TextJavaScript => "text/javascript",
            ContentType::TextXml => "text/xml",
            ContentType::TextCsv => "text/csv",
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationXml => "application/xml",
            ContentType::ApplicationXhtmlXml => "application/xhtml+xml",
            ContentType::ApplicationJavaScript => "application/javascript",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::ApplicationFormUrlencoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationPdf => "application/pdf",
            ContentType::ApplicationZip => "application/zip",
            ContentType::ApplicationGzip => "application/gzip",
            ContentType::ApplicationSql => "application/sql",
            ContentType::ApplicationRtf => "application/rtf",
            ContentType::ApplicationMsPowerPoint => "application/vnd.ms-powerpoint",
            ContentType::ApplicationMsExcel => "application/vnd.ms-excel",
            ContentType::ApplicationMsWord => "application/msword",
            ContentType::ApplicationOpenDocumentText => "application/vnd.oasis.opendocument.text",
            ContentType::ApplicationOpenDocumentSpreadsheet => {
                "application/vnd.oasis.opendocument.spreadsheet"
            }
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImagePng => "image/png",
            ContentType::ImageGif => "image/gif",
            ContentType::ImageBmp => "image/bmp",
            ContentType::ImageWebp => "image/webp",
            ContentType::ImageSvgXml => "image/svg+xml",
            ContentType::ImageTiff => "image/tiff",
            ContentType::ImageHeic => "image/heic",
            ContentType::ImageXIcon => "image/x-icon",
            ContentType::AudioMpeg => "audio/mpeg",
            ContentType::AudioOgg => "audio/ogg",
            ContentType::AudioWav => "audio/wav",
            ContentType::VideoMp4 => "video/mp4",
            ContentType::VideoMpeg => "video/mpeg",
            ContentType::VideoOgg => "video/ogg",
            ContentType::VideoWebm => "video/webm",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::MultipartByteranges => "multipart/byteranges",
            ContentType::FontTtf => "font/ttf",
            ContentType::FontWoff => "font/woff",
            ContentType::FontWoff2 => "font/woff2",
            ContentType::FontOtf => "font/otf",
        }
    }

    /// Indica si el contenido es textual (`text/*`)
    pub fn is_text(&self) -> bool {
        self.as_str().starts_with("text/")
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeError;

    /// Parsea un MIME sin distinguir mayúsculas. Se ignoran parámetros
    /// como `; charset=utf-8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mime = s.split(';').next().unwrap_or("").trim();

        ALL.iter()
            .copied()
            .find(|content_type| content_type.as_str().eq_ignore_ascii_case(mime))
            .ok_or_else(|| ContentTypeError::Unknown(s.to_string()))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
