//! エラー型の定義
//!
//! このモジュールは、Warifuriライブラリで使用されるすべてのエラー型を定義します。
//! 辞書の読み込みで発生する致命的なエラーは [`WarifuriError`]、
//! 1行単位で発生し、呼び出し側で扱いが決まる割り振りの失敗は [`AlignmentError`] で表現します。

use std::error::Error;
use std::fmt;

/// Warifuri専用のResult型
///
/// エラー型としてデフォルトで[`WarifuriError`]を使用します。
pub type Result<T, E = WarifuriError> = std::result::Result<T, E>;

/// Warifuriのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum WarifuriError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 読み込み中の不正な行
    ///
    /// [`MalformedLineError`]のエラーバリアント。辞書の読み込みを中断します。
    #[error(transparent)]
    MalformedLine(MalformedLineError),

    /// XMLパースエラー
    ///
    /// [`quick_xml::Error`]のエラーバリアント。
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// XML属性のパースエラー
    #[error(transparent)]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// 標準I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// バックグラウンドスレッドパニックエラー
    ///
    /// バッチ処理のワーカーまたはライターがパニックした場合に発生します。
    #[error("Background thread panicked: {0}")]
    ThreadPanic(String),

    /// 割り振りの失敗
    ///
    /// [`AlignmentError`]のエラーバリアント。
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

impl WarifuriError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 不正な行のエラーを生成します
    ///
    /// # 引数
    ///
    /// * `source` - 入力元の名前（通常はファイル名）
    /// * `line` - 1始まりの行番号
    /// * `msg` - エラーメッセージ
    pub(crate) fn malformed_line<N, S>(source: N, line: usize, msg: S) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self::MalformedLine(MalformedLineError {
            source: source.into(),
            line,
            msg: msg.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 行単位の入力に不正な行が含まれていた場合に使用されるエラー
#[derive(Debug)]
pub struct MalformedLineError {
    /// 入力元の名前
    pub(crate) source: String,

    /// 1始まりの行番号
    pub(crate) line: usize,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl MalformedLineError {
    /// 入力元の名前を返します。
    pub fn source_name(&self) -> &str {
        &self.source
    }

    /// 1始まりの行番号を返します。
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for MalformedLineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "file {}, line {}: {}", self.source, self.line, self.msg)
    }
}

impl Error for MalformedLineError {}

/// 割り振りの失敗
///
/// 1組の漢字列と読みに閉じたエラーで、バッチ処理を中断することはありません。
/// 厳密モードではエラー出力へ回され、寛容モードでは未分割のまま出力されます。
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    /// 漢字列または読みが空
    #[error("Unable to split furigana: empty input")]
    EmptyInput,

    /// パターンが読み全体にマッチしなかった
    #[error("Unable to split furigana: the reading does not match any candidate path")]
    NoMatch,

    /// 調停後のグループ数がセグメント数と一致しない
    #[error("Unable to split furigana: {groups} reading groups for {segments} segments")]
    SegmentCountMismatch {
        /// 元のセグメント数
        segments: usize,
        /// 調停後のグループ数
        groups: usize,
    },

    /// 正規表現エンジンがパターンを受け付けなかった
    ///
    /// コンパイル後のサイズ上限を超えた場合などに発生します。
    #[error("Unable to split furigana: {0}")]
    Pattern(#[from] regex::Error),
}
