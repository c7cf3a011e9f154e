//! 入力パスから作文画像を集める
//!
//! ファイルはそのまま、フォルダは直下の画像だけを名前順で読み込む。

use crate::error::{EssayGraderError, Result};
use essay_grader_common::UploadedFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// フォルダ直下の画像パスを名前順で返す
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(EssayGraderError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| is_image_extension(&ext.to_string_lossy()))
        })
        .collect();

    images.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(images)
}

/// 入力（ファイル・フォルダ混在可）を指定順に展開して読み込む
///
/// 直接指定したファイルは拡張子を問わず含める。検証はアップロード時に行う。
pub fn collect_uploads(inputs: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(scan_folder(input)?);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(EssayGraderError::FileNotFound(input.display().to_string()));
        }
    }

    if paths.is_empty() {
        let joined: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        return Err(EssayGraderError::NoImagesFound(joined.join(", ")));
    }

    paths.iter().map(|path| read_upload(path)).collect()
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let content = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    tracing::debug!(file = %name, bytes = content.len(), "image loaded");
    Ok(UploadedFile::new(name, content))
}
