//! # Warifuri
//!
//! Warifuriは、漢字列とその読みを対応する部分文字列に分割し、
//! 振り仮名（ルビ）を漢字ごとに割り振るためのライブラリです。
//!
//! ## 概要
//!
//! 漢字ごとの読みの候補を音韻変化の規則で展開した読み辞書を作り、
//! 漢字列から候補の木を組み立てて1つの正規表現にコンパイルします。
//! 読みにマッチした捕獲グループを元のセグメントに対応付けることで、
//! 漢字列と読みを同じ数のセグメントに分割します。
//!
//! ## 主な機能
//!
//! - **音韻変化の展開**: 連濁、促音化、送り仮名の活用、平仮名と片仮名の書き換え
//! - **熟字訓**: 漢字列全体に対する読み（`一人` → `ひとり`）の優先的な照合
//! - **楽観的な割り振り**: 辞書にない漢字を含む連続を1つのブロックとして扱う寛容モード
//! - **並列バッチ処理**: CSV形式の辞書全体に対する上限付きキューを使ったパイプライン
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use warifuri::dictionary::ReadingDictionaryBuilder;
//! use warifuri::{AlignMode, Aligner};
//!
//! let mut builder = ReadingDictionaryBuilder::new();
//! builder.add_readings("年", &["ネン", "とし"]);
//! builder.add_readings("中", &["チュウ", "なか"]);
//! builder.add_readings("子", &["こ"]);
//! let dict = builder.build();
//!
//! let aligner = Aligner::new(&dict);
//!
//! let alignment = aligner.align("年中", "ねんじゅう")?;
//! assert_eq!(alignment.kanji(), &["年", "中"]);
//! assert_eq!(alignment.reading(), &["ねん", "じゅう"]);
//! assert_eq!(alignment.to_dotted(), "ねん.じゅう");
//!
//! // 寛容モードでは、辞書にない漢字を含む連続は1つのブロックになります。
//! let alignment = aligner.align("子供", "こども")?;
//! assert_eq!(alignment.kanji(), &["子供"]);
//!
//! // 厳密モードではすべての漢字が辞書の読みと一致する必要があります。
//! let strict = Aligner::new(&dict).mode(AlignMode::Strict);
//! assert!(strict.align("子供", "こども").is_err());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

/// 割り振りの実行と結果
pub mod aligner;

/// 並列バッチ処理
pub mod batch;

/// 読み辞書とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// ドット区切りの振り仮名表記
pub mod furigana;

/// かなの判定と変換
pub mod kana;

/// 候補パスの木
pub mod path;

/// 正規表現へのコンパイル
pub mod pattern;

/// 音韻変化規則
pub mod phonology;

/// CSVユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use aligner::{AlignMode, Aligner, Alignment};
pub use batch::{BatchRunner, BatchStats, RowOutcome};
pub use dictionary::{ReadingDictionary, ReadingDictionaryBuilder};
pub use errors::{AlignmentError, Result, WarifuriError};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
