//! User-facing strings
//!
//! Every failure in docchat degrades to human-readable text. The default
//! locale is Thai, matching the audience the backend is tuned for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported display languages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// ภาษาไทย
    #[default]
    #[serde(rename = "th")]
    Thai,
    /// English
    #[serde(rename = "en")]
    English,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thai => f.write_str("th"),
            Self::English => f.write_str("en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "th" | "thai" => Ok(Self::Thai),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// String catalog for one locale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Strings {
    locale: Locale,
}

impl Strings {
    /// Catalog for a locale
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Locale of this catalog
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Bot reply used when a send fails for any reason
    #[must_use]
    pub fn server_unreachable(&self) -> String {
        match self.locale {
            Locale::Thai => "เกิดข้อผิดพลาด ไม่สามารถเชื่อมต่อ Server ได้".to_string(),
            Locale::English => "Something went wrong: unable to reach the server.".to_string(),
        }
    }

    /// Shown while a reply is pending
    #[must_use]
    pub fn typing(&self) -> String {
        match self.locale {
            Locale::Thai => "... กำลังพิมพ์ ...".to_string(),
            Locale::English => "... typing ...".to_string(),
        }
    }

    /// Input placeholder
    #[must_use]
    pub fn input_placeholder(&self) -> String {
        match self.locale {
            Locale::Thai => "พิมพ์ข้อความ...".to_string(),
            Locale::English => "Type a message...".to_string(),
        }
    }

    /// Prompt when uploading without a selected file
    #[must_use]
    pub fn choose_file(&self) -> String {
        match self.locale {
            Locale::Thai => "กรุณาเลือกไฟล์ก่อนอัปโหลด".to_string(),
            Locale::English => "Please choose a file before uploading.".to_string(),
        }
    }

    /// Status while file bytes are sent
    #[must_use]
    pub fn uploading(&self, file_name: &str) -> String {
        match self.locale {
            Locale::Thai => format!("กำลังอัปโหลด {file_name} ..."),
            Locale::English => format!("Uploading {file_name} ..."),
        }
    }

    /// Status while the backend processes the document
    #[must_use]
    pub fn processing(&self, file_name: &str) -> String {
        match self.locale {
            Locale::Thai => format!("กำลังประมวลผลเอกสาร {file_name} ..."),
            Locale::English => format!("Processing {file_name} ..."),
        }
    }

    /// Completion message naming the document
    #[must_use]
    pub fn upload_complete(&self, file_name: &str) -> String {
        match self.locale {
            Locale::Thai => format!("อัปโหลดและประมวลผล {file_name} เรียบร้อยแล้ว สามารถถามคำถามจากเอกสารได้เลย"),
            Locale::English => format!("{file_name} is uploaded and ready. Ask me anything about it."),
        }
    }

    /// Upload failure with error detail
    #[must_use]
    pub fn upload_failed(&self, detail: &str) -> String {
        match self.locale {
            Locale::Thai => format!("อัปโหลดไฟล์ไม่สำเร็จ: {detail}"),
            Locale::English => format!("Upload failed: {detail}"),
        }
    }

    /// Status when polling breaks down
    #[must_use]
    pub fn status_check_failed(&self) -> String {
        match self.locale {
            Locale::Thai => "ตรวจสอบสถานะเอกสารไม่สำเร็จ".to_string(),
            Locale::English => "Could not check document status.".to_string(),
        }
    }

    /// Reset confirmation question
    #[must_use]
    pub fn confirm_reset(&self) -> String {
        match self.locale {
            Locale::Thai => "ต้องการล้างบทสนทนาทั้งหมดหรือไม่? (y/n)".to_string(),
            Locale::English => "Clear the whole conversation? (y/n)".to_string(),
        }
    }

    /// Startup warning when the health check fails
    #[must_use]
    pub fn backend_unavailable(&self) -> String {
        match self.locale {
            Locale::Thai => "ยังเชื่อมต่อ Server ไม่ได้ ข้อความแรกอาจล้มเหลว".to_string(),
            Locale::English => "Backend not reachable yet - the first message may fail.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_thai() {
        let strings = Strings::default();
        assert_eq!(strings.locale(), Locale::Thai);
        assert_eq!(
            strings.server_unreachable(),
            "เกิดข้อผิดพลาด ไม่สามารถเชื่อมต่อ Server ได้"
        );
    }

    #[test]
    fn test_messages_name_the_file() {
        for locale in [Locale::Thai, Locale::English] {
            let strings = Strings::new(locale);
            assert!(strings.upload_complete("tor.pdf").contains("tor.pdf"));
            assert!(strings.uploading("tor.pdf").contains("tor.pdf"));
            assert!(strings.upload_failed("503").contains("503"));
            assert!(!strings.status_check_failed().is_empty());
        }
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::English);
        assert_eq!("thai".parse::<Locale>().unwrap(), Locale::Thai);
        assert!("fr".parse::<Locale>().is_err());
    }
}
