//! 上传文件的内容嗅探
//!
//! 扩展名只决定期望的文件族，真正的判定看文件头。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicFamily {
    Pdf,
    /// MS Office 旧格式（OLE 复合文档）
    Ole,
    /// ZIP 及基于 ZIP 的 OOXML
    Zip,
    Png,
    Jpeg,
    Text,
}

const PDF: &[u8] = b"%PDF";
const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

/// 最长签名的字节数，判定前至少要读到这么多（文件更短时除外）
pub const SNIFF_LEN: usize = 8;

/// 扩展名（含点号）对应的文件族
pub fn expected_family(extension: &str) -> Option<MagicFamily> {
    match extension.to_ascii_lowercase().as_str() {
        ".pdf" => Some(MagicFamily::Pdf),
        ".doc" | ".xls" => Some(MagicFamily::Ole),
        ".docx" | ".xlsx" | ".zip" => Some(MagicFamily::Zip),
        ".png" => Some(MagicFamily::Png),
        ".jpg" | ".jpeg" => Some(MagicFamily::Jpeg),
        ".txt" | ".csv" => Some(MagicFamily::Text),
        _ => None,
    }
}

/// 根据文件头识别二进制文件族，识别不出时返回 None
pub fn detect_family(head: &[u8]) -> Option<MagicFamily> {
    [
        (PDF, MagicFamily::Pdf),
        (OLE, MagicFamily::Ole),
        (ZIP, MagicFamily::Zip),
        (PNG, MagicFamily::Png),
        (JPEG, MagicFamily::Jpeg),
    ]
    .into_iter()
    .find(|(sig, _)| head.starts_with(sig))
    .map(|(_, family)| family)
}

fn looks_like_text(head: &[u8]) -> bool {
    !head.contains(&0) && detect_family(head).is_none()
}

/// 文件头是否与扩展名相符
pub fn validate_magic_bytes(head: &[u8], extension: &str) -> bool {
    if head.is_empty() {
        return false;
    }
    match expected_family(extension) {
        Some(MagicFamily::Text) => looks_like_text(head),
        Some(family) => detect_family(head) == Some(family),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_and_office() {
        assert!(validate_magic_bytes(b"%PDF-1.7\n", ".pdf"));
        assert!(validate_magic_bytes(b"%PDF-1.7\n", ".PDF"));
        assert!(!validate_magic_bytes(b"%PDF-1.7\n", ".docx"));
        assert!(validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".xlsx"));
        assert!(validate_magic_bytes(OLE, ".doc"));
    }

    #[test]
    fn test_text_rejects_binary() {
        assert!(validate_magic_bytes(b"item,qty\nbolts,4\n", ".csv"));
        assert!(!validate_magic_bytes(b"%PDF-1.4", ".txt"));
        assert!(!validate_magic_bytes(&[0x41, 0x00, 0x42], ".txt"));
    }

    #[test]
    fn test_sniff_len_covers_every_signature() {
        assert!(
            [PDF, OLE, ZIP, PNG, JPEG]
                .iter()
                .all(|sig| sig.len() <= SNIFF_LEN)
        );
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".pdf"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
        assert_eq!(detect_family(&[0xFF, 0xD8, 0xFF, 0xE1]), Some(MagicFamily::Jpeg));
    }
}
