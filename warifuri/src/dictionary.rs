//! 読み辞書
//!
//! 漢字1文字ごとの読み候補と、熟字訓（複数文字の漢字列に対する読み）を保持します。
//! 辞書は [`ReadingDictionaryBuilder`] で一度だけ構築され、その後は読み取り専用の値として
//! 複数のワーカーから参照で共有されます。

pub mod builder;
pub mod kanjidic;

use hashbrown::HashMap;

pub use builder::ReadingDictionaryBuilder;
pub use kanjidic::{KanjiRecord, KanjidicReader, ReadingKind, TypedReading};

/// 熟字訓の1位置分の読み
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompoundPosition {
    /// 漢字列の文字がそのまま読みに現れる位置。元の文字の候補がそのまま使われます。
    Literal,
    /// 読み候補のリスト。空のリストは空文字列にマッチします
    /// （読みが前の位置にまとめられている場合など）。
    Readings(Vec<String>),
}

impl CompoundPosition {
    /// 空文字列にしかマッチしない位置であれば `true` を返します。
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Literal => false,
            Self::Readings(readings) => readings.iter().all(String::is_empty),
        }
    }
}

/// 熟字訓の読み1通り
///
/// キーの各文字に対応する位置を1つずつ保持します。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundReading {
    positions: Vec<CompoundPosition>,
}

impl CompoundReading {
    pub(crate) fn new(positions: Vec<CompoundPosition>) -> Self {
        Self { positions }
    }

    /// 位置ごとの読みを返します。
    #[inline(always)]
    pub fn positions(&self) -> &[CompoundPosition] {
        &self.positions
    }

    /// 位置の数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// 位置を1つも持たない場合に `true` を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// 割り振りに使う読み辞書
///
/// # 不変条件
///
/// - 漢字ごとの読み候補は重複がなく、最初に登録された順序を保ちます。
///   曖昧なマッチでは先に並んだ候補が優先されます。
/// - 熟字訓のキーは文字数の降順に並びます。同じ文字数のキーは登録順です。
#[derive(Clone, Debug, Default)]
pub struct ReadingDictionary {
    pub(crate) kanji: HashMap<char, Vec<String>>,
    pub(crate) compounds: HashMap<String, Vec<CompoundReading>>,
    pub(crate) compound_keys: Vec<String>,
}

impl ReadingDictionary {
    /// 漢字1文字の読み候補を返します。
    ///
    /// # 引数
    ///
    /// * `c` - 検索する文字
    ///
    /// # 戻り値
    ///
    /// 登録されていれば `Some(候補のスライス)`、なければ `None`
    #[inline]
    pub fn readings(&self, c: char) -> Option<&[String]> {
        self.kanji.get(&c).map(Vec::as_slice)
    }

    /// 熟字訓の読みを返します。
    ///
    /// # 引数
    ///
    /// * `key` - 熟字訓のキーとなる漢字列
    #[inline]
    pub fn compound_readings(&self, key: &str) -> Option<&[CompoundReading]> {
        self.compounds.get(key).map(Vec::as_slice)
    }

    /// 熟字訓を、キーの文字数の降順に列挙します。
    pub fn compounds(&self) -> impl Iterator<Item = (&str, &[CompoundReading])> + '_ {
        self.compound_keys.iter().filter_map(|key| {
            self.compounds
                .get(key)
                .map(|readings| (key.as_str(), readings.as_slice()))
        })
    }

    /// 読みが登録されている漢字の数を返します。
    pub fn num_kanji(&self) -> usize {
        self.kanji.len()
    }

    /// 登録されている熟字訓のキーの数を返します。
    pub fn num_compounds(&self) -> usize {
        self.compound_keys.len()
    }

    /// 辞書が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.kanji.is_empty() && self.compound_keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compounds_sorted_by_length() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("一人", &["ひとり"]);
        builder.add_readings("一人前", &["いちにん|まえ"]);
        builder.add_readings("今日", &["きょう"]);
        builder.add_readings("大人気", &["おとな|げ"]);
        let dict = builder.build();

        let keys: Vec<&str> = dict.compounds().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["一人前", "大人気", "一人", "今日"]);
    }

    #[test]
    fn test_readings_lookup() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("間", &["かん"]);
        let dict = builder.build();

        assert_eq!(
            dict.readings('間').unwrap(),
            &["かん", "がん", "カン", "ガン"],
        );
        assert!(dict.readings('接').is_none());
        assert_eq!(dict.num_kanji(), 1);
        assert_eq!(dict.num_compounds(), 0);
        assert!(!dict.is_empty());
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = ReadingDictionary::default();
        assert!(dict.is_empty());
        assert_eq!(dict.compounds().count(), 0);
    }
}
