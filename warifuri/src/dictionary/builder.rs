//! 読み辞書構築のためのビルダー
//!
//! このモジュールは、構造化された漢字辞書（KANJIDIC2）と任意の補助読みファイルから
//! [`ReadingDictionary`] を構築するためのビルダーを提供します。
//! 補助読みファイルの内容は既存の読みに追加されるだけで、置き換えることはありません。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::dictionary::kanjidic::{KanjiRecord, KanjidicReader};
use crate::dictionary::{CompoundPosition, CompoundReading, ReadingDictionary};
use crate::errors::{Result, WarifuriError};
use crate::phonology::{dedup_in_order, expand_compound_position, expand_kanji_readings};
use crate::utils::parse_delimited_row;

/// 熟字訓の読みで位置を区切る記号
pub const POSITION_SEPARATOR: char = '|';

/// 補助読みファイルのコメント行の先頭文字
pub const COMMENT_PREFIX: char = '#';

/// 読みのエントリから [`ReadingDictionary`] を構築するビルダー
///
/// # 例
///
/// ```
/// use warifuri::dictionary::ReadingDictionaryBuilder;
///
/// let mut builder = ReadingDictionaryBuilder::new();
/// builder.add_readings("学", &["ガク", "まな.ぶ"]);
/// builder.add_readings("一人", &["ひとり"]);
/// let dict = builder.build();
///
/// assert!(dict.readings('学').unwrap().iter().any(|r| r == "がっ"));
/// assert_eq!(dict.num_compounds(), 1);
/// ```
#[derive(Default)]
pub struct ReadingDictionaryBuilder {
    dict: ReadingDictionary,
}

impl ReadingDictionaryBuilder {
    /// 空のビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 漢字または漢字列に読みを追加します。
    ///
    /// 1文字の場合は漢字の読みとして音韻変化を展開し、既存の読みに追加します。
    /// 2文字以上の場合は熟字訓として登録します。読みの各行は `|` で位置ごとに
    /// 区切ることができ、漢字列と同じ文字をそのまま書いた位置はその文字自身に一致します。
    ///
    /// # 引数
    ///
    /// * `text` - 漢字または漢字列
    /// * `raw_readings` - 辞書に書かれたままの読み
    pub fn add_readings<S>(&mut self, text: &str, raw_readings: &[S]) -> &mut Self
    where
        S: AsRef<str>,
    {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.add_kanji_readings(c, raw_readings),
            (Some(_), Some(_)) => {
                for raw in raw_readings {
                    self.add_compound_reading(text, raw.as_ref());
                }
            }
            (None, _) => {}
        }
        self
    }

    /// 漢字1文字の読みを展開して追加します。
    fn add_kanji_readings<S>(&mut self, c: char, raw_readings: &[S])
    where
        S: AsRef<str>,
    {
        let expanded = expand_kanji_readings(raw_readings);
        if expanded.is_empty() {
            return;
        }
        let entry = self.dict.kanji.entry(c).or_default();
        let merged = dedup_in_order(entry.drain(..).chain(expanded));
        *entry = merged;
    }

    /// 熟字訓の読み1行を解釈して登録します。
    ///
    /// 読みの `|` で区切られた各部分は、キーの同じ位置の文字に対応します。
    /// 漢字列の文字をそのまま書いた部分は [`CompoundPosition::Literal`] になり、
    /// 足りない末尾の位置は空の読みで埋められます。
    fn add_compound_reading(&mut self, text: &str, raw: &str) {
        let literal: Vec<char> = text.chars().collect();
        let parts: Vec<&str> = raw.split(POSITION_SEPARATOR).collect();
        if parts.len() > literal.len() {
            log::warn!(
                "Reading {raw:?} of {text:?} has {} positions for {} characters; skipped",
                parts.len(),
                literal.len(),
            );
            return;
        }

        let mut positions: Vec<CompoundPosition> = parts
            .iter()
            .zip(&literal)
            .map(|(part, &c)| {
                let mut chars = part.chars();
                match (chars.next(), chars.next()) {
                    (Some(first), None) if first == c => CompoundPosition::Literal,
                    (None, _) => CompoundPosition::Readings(vec![]),
                    _ => CompoundPosition::Readings(expand_compound_position(part)),
                }
            })
            .collect();
        positions.resize(literal.len(), CompoundPosition::Readings(vec![]));

        if positions.iter().all(|p| *p == CompoundPosition::Literal) {
            log::warn!("Reading {raw:?} of {text:?} leaves no character to annotate; skipped");
            return;
        }
        // An empty first position would be folded into the segment before the compound.
        if positions[0].is_blank() {
            log::warn!("Reading {raw:?} of {text:?} starts with an empty position; skipped");
            return;
        }

        self.register_compound(text.to_string(), CompoundReading::new(positions));
    }

    /// 熟字訓の読みを登録し、新しいキーであれば文字数の降順を保つ位置に挿入します。
    fn register_compound(&mut self, key: String, reading: CompoundReading) {
        if let Some(readings) = self.dict.compounds.get_mut(&key) {
            readings.push(reading);
            return;
        }
        let len = key.chars().count();
        let pos = self
            .dict
            .compound_keys
            .iter()
            .take_while(|k| k.chars().count() >= len)
            .count();
        self.dict.compound_keys.insert(pos, key.clone());
        self.dict.compounds.insert(key, vec![reading]);
    }

    /// 構造化辞書のレコードを1件追加します。
    ///
    /// 音読み、訓読み、名乗りのすべてが読みとして使われます。
    /// 字が空のレコードは無視されます。
    pub fn add_record(&mut self, record: &KanjiRecord) -> &mut Self {
        if record.literal.is_empty() {
            return self;
        }
        let readings: Vec<&str> = record.readings.iter().map(|r| r.text.as_str()).collect();
        self.add_readings(&record.literal, &readings)
    }

    /// KANJIDIC2形式のXMLからすべてのレコードを読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - KANJIDIC2ファイルのリーダー
    ///
    /// # 戻り値
    ///
    /// 読み込んだレコードの数
    ///
    /// # エラー
    ///
    /// XMLが不正な場合に [`WarifuriError`] を返します。
    pub fn load_kanjidic<R>(&mut self, rdr: R) -> Result<usize>
    where
        R: BufRead,
    {
        let mut num_records = 0;
        for record in KanjidicReader::new(rdr) {
            self.add_record(&record?);
            num_records += 1;
        }
        log::info!("Loaded {num_records} kanji records");
        Ok(num_records)
    }

    /// タブ区切りの補助読みファイルを読み込みます。
    ///
    /// 1列目が漢字または漢字列、2列目が読みです。`#` で始まる行と空行は無視されます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 補助読みファイルのリーダー
    /// * `source` - エラーメッセージに使う入力元の名前
    ///
    /// # 戻り値
    ///
    /// 読み込んだ行の数
    ///
    /// # エラー
    ///
    /// 列が足りない行があった場合、入力元の名前と行番号を含む
    /// [`WarifuriError::MalformedLine`] を返します。部分的な読み込みは行いません。
    pub fn load_overrides<R>(&mut self, rdr: R, source: &str) -> Result<usize>
    where
        R: BufRead,
    {
        let mut num_rows = 0;
        for (i, line) in rdr.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let cols = parse_delimited_row(line, b'\t')?;
            match (cols.first(), cols.get(1)) {
                (Some(text), Some(reading)) if !text.is_empty() && !reading.is_empty() => {
                    self.add_readings(text, &[reading]);
                    num_rows += 1;
                }
                _ => return Err(WarifuriError::malformed_line(source, i + 1, "malformed line")),
            }
        }
        log::info!("Loaded {num_rows} readings from {source}");
        Ok(num_rows)
    }

    /// 構築した辞書を返します。
    pub fn build(self) -> ReadingDictionary {
        self.dict
    }

    /// ファイルから辞書を構築します。
    ///
    /// # 引数
    ///
    /// * `kanjidic` - KANJIDIC2ファイルのパス
    /// * `overrides` - 補助読みファイルのパス（任意）
    ///
    /// # エラー
    ///
    /// ファイルが開けない場合、またはいずれかの入力が不正な場合に [`WarifuriError`] を返します。
    pub fn from_paths<P, Q>(kanjidic: P, overrides: Option<Q>) -> Result<ReadingDictionary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut builder = Self::new();
        builder.load_kanjidic(BufReader::new(File::open(kanjidic)?))?;
        if let Some(path) = overrides {
            let path = path.as_ref();
            let rdr = BufReader::new(File::open(path)?);
            builder.load_overrides(rdr, &path.display().to_string())?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings_at(reading: &CompoundReading, i: usize) -> &[String] {
        match &reading.positions()[i] {
            CompoundPosition::Readings(readings) => readings,
            CompoundPosition::Literal => panic!("position {i} is a literal"),
        }
    }

    #[test]
    fn test_kanji_readings_are_merged_in_order() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("中", &["チュウ"]);
        builder.add_readings("中", &["なか", "ちゅう"]);
        let dict = builder.build();

        assert_eq!(
            dict.readings('中').unwrap(),
            &[
                "ちゅう", "ぢゅう", "じゅう", "チュウ", "ヂュウ", "ジュウ",
                "なか", "ナカ",
            ],
        );
    }

    #[test]
    fn test_compound_padding() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("一人", &["ひとり"]);
        let dict = builder.build();

        let readings = dict.compound_readings("一人").unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].len(), 2);
        assert_eq!(readings_at(&readings[0], 0)[0], "ひとり");
        assert!(readings[0].positions()[1].is_blank());
    }

    #[test]
    fn test_compound_keeps_echoed_literal() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("お茶", &["お|ちゃ"]);
        let dict = builder.build();

        assert!(dict.compound_readings("茶").is_none());
        let readings = dict.compound_readings("お茶").unwrap();
        assert_eq!(readings[0].positions()[0], CompoundPosition::Literal);
        assert_eq!(
            readings_at(&readings[0], 1),
            &["ちゃ", "ぢゃ", "じゃ", "チャ", "ヂャ", "ジャ"],
        );
    }

    #[test]
    fn test_compound_echoed_literal_in_the_middle() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("男の子", &["おとこ|の|こ"]);
        let dict = builder.build();

        let keys: Vec<&str> = dict.compounds().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["男の子"]);
        let readings = dict.compound_readings("男の子").unwrap();
        assert_eq!(readings_at(&readings[0], 0), &["おとこ", "オトコ"]);
        assert_eq!(readings[0].positions()[1], CompoundPosition::Literal);
        assert_eq!(readings_at(&readings[0], 2), &["こ", "ご", "コ", "ゴ"]);
    }

    #[test]
    fn test_compound_with_leading_empty_position_is_skipped() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("一人", &["|ひとり", "ひと|り"]);
        let dict = builder.build();

        let readings = dict.compound_readings("一人").unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings_at(&readings[0], 0)[0], "ひと");
    }

    #[test]
    fn test_compound_made_only_of_literals_is_skipped() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("おちゃ", &["お|ち|ゃ"]);
        let dict = builder.build();
        assert!(dict.is_empty());
    }

    #[test]
    fn test_compound_multiple_lines_accumulate() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("今日", &["きょう"]);
        builder.add_readings("今日", &["こん|にち"]);
        let dict = builder.build();

        let readings = dict.compound_readings("今日").unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[0].positions()[1].is_blank());
        assert_eq!(readings_at(&readings[1], 1)[0], "にち");
        assert_eq!(dict.num_compounds(), 1);
    }

    #[test]
    fn test_compound_with_too_many_positions_is_skipped() {
        let mut builder = ReadingDictionaryBuilder::new();
        builder.add_readings("今日", &["き|ょ|う"]);
        let dict = builder.build();
        assert!(dict.compound_readings("今日").is_none());
    }

    #[test]
    fn test_load_overrides() {
        let data = "# comment\n\n一人\tひとり\n大人\tおとな\n間\tま\n";
        let mut builder = ReadingDictionaryBuilder::new();
        let n = builder.load_overrides(data.as_bytes(), "other_readings.tsv").unwrap();
        let dict = builder.build();

        assert_eq!(n, 3);
        assert_eq!(dict.num_compounds(), 2);
        assert_eq!(dict.readings('間').unwrap(), &["ま", "マ"]);
    }

    #[test]
    fn test_load_overrides_malformed_line() {
        let data = "一人\tひとり\n# comment\n大人\n";
        let mut builder = ReadingDictionaryBuilder::new();
        let err = builder
            .load_overrides(data.as_bytes(), "other_readings.tsv")
            .unwrap_err();

        match err {
            WarifuriError::MalformedLine(e) => {
                assert_eq!(e.source_name(), "other_readings.tsv");
                assert_eq!(e.line(), 3);
                assert_eq!(e.to_string(), "file other_readings.tsv, line 3: malformed line");
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_load_overrides_empty_reading() {
        let data = "大人\t\n";
        let mut builder = ReadingDictionaryBuilder::new();
        assert!(builder.load_overrides(data.as_bytes(), "x").is_err());
    }
}
