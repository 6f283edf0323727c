//! Security Module
//!
//! XLSXパッケージを開く際のセキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃、リレーションシップの参照先の改ざんへの対策を提供します。

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600,         // 100MB
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

/// ZIPエントリ名の検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`、絶対パス、`\`を含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // Unix形式の`/`やドライブレター付きのパスは拒否
    let bytes = path.as_bytes();
    if path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':') {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

/// リレーションシップの参照先をパッケージ内のパート名に解決する
///
/// 参照先は所有パートのディレクトリからの相対パスです（例: `xl/drawings/drawing1.xml`
/// からの`../media/image1.png`は`xl/media/image1.png`）。先頭が`/`の場合はパッケージの
/// ルートからの絶対パスとして扱います。
///
/// # 戻り値
///
/// * `Ok(String)` - 正規化されたパート名
/// * `Err(String)` - パッケージのルートより上を指す場合、または外部参照の場合
pub(crate) fn resolve_part_path(owner: &str, target: &str) -> Result<String, String> {
    if target.contains("://") {
        return Err(format!("External target is not allowed: {}", target));
    }
    if target.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", target));
    }

    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = owner.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(format!("Path traversal detected: {}", target));
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(format!("Empty path is not allowed: {}", target));
    }

    Ok(segments.join("/"))
}
