//! 選択時のファイル検証
//!
//! ここで弾いたファイルはワークフローに届かない。

use crate::config::UploadPolicy;
use crate::types::UploadedFile;

/// 受け付けなかったファイルと理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: String,
}

/// ポリシーに従ってファイルを振り分ける（順序は維持）
pub fn validate_files(
    files: Vec<UploadedFile>,
    policy: &UploadPolicy,
) -> (Vec<UploadedFile>, Vec<Rejection>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        match check_file(&file, policy) {
            Some(reason) => rejected.push(Rejection {
                name: file.name.clone(),
                reason,
            }),
            None => accepted.push(file),
        }
    }

    (accepted, rejected)
}

fn check_file(file: &UploadedFile, policy: &UploadPolicy) -> Option<String> {
    if file.size > policy.max_size_bytes() {
        return Some(format!(
            "文件大小{:.1}MB，超过{}MB限制",
            file.size_mb(),
            policy.max_size_mb
        ));
    }

    if !policy.accept.is_empty() {
        let accepted = file
            .extension()
            .is_some_and(|ext| policy.accept.iter().any(|a| a.eq_ignore_ascii_case(&ext)));
        if !accepted {
            return Some(format!("仅支持 {}", policy.accept.join(", ")));
        }
    }

    None
}

/// 新しく選択したファイルを既存の選択に反映する
///
/// 複数選択モードでは追加、単一モードでは置き換え。
pub fn merge_selection(
    current: &[UploadedFile],
    added: Vec<UploadedFile>,
    policy: &UploadPolicy,
) -> Vec<UploadedFile> {
    if policy.multiple {
        current.iter().cloned().chain(added).collect()
    } else {
        added
    }
}

/// 利用者向けのまとめメッセージ
pub fn describe_rejections(rejected: &[Rejection]) -> String {
    let lines: Vec<String> = rejected
        .iter()
        .map(|r| format!("{}: {}", r.name, r.reason))
        .collect();
    format!("以下文件不符合要求:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, vec![0u8; size])
    }

    #[test]
    fn test_validate_size_limit() {
        let policy = UploadPolicy {
            max_size_mb: 1,
            ..Default::default()
        };
        let files = vec![file("ok.jpg", 1024), file("big.jpg", 2 * 1024 * 1024)];

        let (accepted, rejected) = validate_files(files, &policy);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].name, "ok.jpg");
        assert_eq!(rejected[0].name, "big.jpg");
        assert_eq!(rejected[0].reason, "文件大小2.0MB，超过1MB限制");
    }

    #[test]
    fn test_validate_huge_limit_accepts_everything() {
        let policy = UploadPolicy {
            max_size_mb: u64::MAX / 1024,
            ..Default::default()
        };
        let (accepted, rejected) = validate_files(vec![file("big.jpg", 2 * 1024 * 1024)], &policy);
        assert_eq!(accepted.len(), 1);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_validate_extension() {
        let policy = UploadPolicy::default();
        let (accepted, rejected) =
            validate_files(vec![file("a.PNG", 10), file("notes.txt", 10), file("noext", 10)], &policy);
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_validate_accept_all_when_empty() {
        let policy = UploadPolicy {
            accept: vec![],
            ..Default::default()
        };
        let (accepted, rejected) = validate_files(vec![file("scan.tiff", 10)], &policy);
        assert_eq!(accepted.len(), 1);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_merge_selection_modes() {
        let current = vec![file("a.jpg", 1)];
        let multiple = UploadPolicy::default();
        assert_eq!(merge_selection(&current, vec![file("b.jpg", 1)], &multiple).len(), 2);

        let single = UploadPolicy {
            multiple: false,
            ..Default::default()
        };
        let merged = merge_selection(&current, vec![file("b.jpg", 1)], &single);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "b.jpg");
    }

    #[test]
    fn test_describe_rejections() {
        let message = describe_rejections(&[Rejection {
            name: "big.jpg".into(),
            reason: "文件大小超过5MB限制".into(),
        }]);
        assert_eq!(message, "以下文件不符合要求:\nbig.jpg: 文件大小超过5MB限制");
    }
}
