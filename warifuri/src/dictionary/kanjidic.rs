//! KANJIDIC2形式の漢字辞書リーダー
//!
//! `<character>` 要素を1つずつストリーミングで読み出し、字と読みの組を返します。
//! ファイル全体をメモリに展開することはありません。

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::errors::{Result, WarifuriError};

/// 読みの種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadingKind {
    /// 音読み (`r_type="ja_on"`)
    On,
    /// 訓読み (`r_type="ja_kun"`)
    Kun,
    /// 名乗り (`<nanori>`)
    Nanori,
}

/// 種類付きの読み
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedReading {
    /// 読みの種類
    pub kind: ReadingKind,
    /// 辞書に書かれたままの読み
    pub text: String,
}

/// 漢字1文字分のレコード
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KanjiRecord {
    /// 字
    pub literal: String,
    /// 文書中の順序で並んだ読み
    pub readings: Vec<TypedReading>,
}

/// 現在読んでいるテキストの行き先
#[derive(Clone, Copy)]
enum Field {
    Literal,
    Reading(ReadingKind),
}

/// KANJIDIC2のXMLから [`KanjiRecord`] を順に読み出すイテレータ
///
/// XMLが不正な場合は `Err` を1度返し、その後は `None` を返します。
///
/// # 例
///
/// ```
/// use warifuri::dictionary::{KanjidicReader, ReadingKind};
///
/// let xml = r#"<kanjidic2><character><literal>間</literal>
/// <reading_meaning><rmgroup>
/// <reading r_type="pinyin">jian1</reading>
/// <reading r_type="ja_on">カン</reading>
/// <reading r_type="ja_kun">あいだ</reading>
/// </rmgroup><nanori>はし</nanori></reading_meaning></character></kanjidic2>"#;
///
/// let records: Vec<_> = KanjidicReader::new(xml.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].literal, "間");
/// let kinds: Vec<_> = records[0].readings.iter().map(|r| r.kind).collect();
/// assert_eq!(kinds, vec![ReadingKind::On, ReadingKind::Kun, ReadingKind::Nanori]);
/// ```
pub struct KanjidicReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    finished: bool,
}

impl<R> KanjidicReader<R>
where
    R: BufRead,
{
    /// 新しいリーダーを作成します。
    pub fn new(rdr: R) -> Self {
        let mut reader = Reader::from_reader(rdr);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: vec![],
            finished: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<KanjiRecord>> {
        let mut record: Option<KanjiRecord> = None;
        let mut field: Option<Field> = None;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"character" => record = Some(KanjiRecord::default()),
                    b"literal" if record.is_some() => field = Some(Field::Literal),
                    b"reading" if record.is_some() => {
                        field = reading_kind(&e)?.map(Field::Reading);
                    }
                    b"nanori" if record.is_some() => {
                        field = Some(Field::Reading(ReadingKind::Nanori));
                    }
                    _ => field = None,
                },
                Event::Text(t) => {
                    if let (Some(record), Some(field)) = (record.as_mut(), field) {
                        let text = t.unescape()?;
                        let text = text.trim();
                        match field {
                            Field::Literal => record.literal.push_str(text),
                            Field::Reading(kind) => record.readings.push(TypedReading {
                                kind,
                                text: text.to_string(),
                            }),
                        }
                    }
                }
                Event::End(e) => {
                    field = None;
                    if e.name().as_ref() == b"character" {
                        if let Some(record) = record.take() {
                            return Ok(Some(record));
                        }
                    }
                }
                Event::Eof => {
                    if record.is_some() {
                        return Err(WarifuriError::invalid_format(
                            "kanjidic",
                            "unexpected end of file inside <character>",
                        ));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

/// `<reading>` 要素の `r_type` 属性から読みの種類を判定します。
///
/// 日本語の音読み・訓読み以外は `None` を返します。
fn reading_kind(e: &BytesStart) -> Result<Option<ReadingKind>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r_type" {
            return Ok(match attr.value.as_ref() {
                b"ja_on" => Some(ReadingKind::On),
                b"ja_kun" => Some(ReadingKind::Kun),
                _ => None,
            });
        }
    }
    Ok(None)
}

impl<R> Iterator for KanjidicReader<R>
where
    R: BufRead,
{
    type Item = Result<KanjiRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KANJIDIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE kanjidic2 [
<!ELEMENT kanjidic2 (header,character*)>
]>
<kanjidic2>
<header><file_version>4</file_version></header>
<character>
<literal>学</literal>
<codepoint><cp_value cp_type="ucs">5b66</cp_value></codepoint>
<reading_meaning>
<rmgroup>
<reading r_type="pinyin">xue2</reading>
<reading r_type="korean_h">학</reading>
<reading r_type="ja_on">ガク</reading>
<reading r_type="ja_kun">まな.ぶ</reading>
<meaning>study</meaning>
</rmgroup>
</reading_meaning>
</character>
<character>
<literal>校</literal>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">コウ</reading>
<reading r_type="ja_on">キョウ</reading>
</rmgroup>
<nanori>とし</nanori>
</reading_meaning>
</character>
</kanjidic2>
"#;

    #[test]
    fn test_read_records() {
        let records: Vec<KanjiRecord> = KanjidicReader::new(KANJIDIC.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            records,
            vec![
                KanjiRecord {
                    literal: "学".to_string(),
                    readings: vec![
                        TypedReading {
                            kind: ReadingKind::On,
                            text: "ガク".to_string(),
                        },
                        TypedReading {
                            kind: ReadingKind::Kun,
                            text: "まな.ぶ".to_string(),
                        },
                    ],
                },
                KanjiRecord {
                    literal: "校".to_string(),
                    readings: vec![
                        TypedReading {
                            kind: ReadingKind::On,
                            text: "コウ".to_string(),
                        },
                        TypedReading {
                            kind: ReadingKind::On,
                            text: "キョウ".to_string(),
                        },
                        TypedReading {
                            kind: ReadingKind::Nanori,
                            text: "とし".to_string(),
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_character_without_readings() {
        let xml = "<kanjidic2><character><literal>〇</literal></character></kanjidic2>";
        let records: Vec<KanjiRecord> = KanjidicReader::new(xml.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].readings.is_empty());
    }

    #[test]
    fn test_truncated_character() {
        let xml = "<kanjidic2><character><literal>学</literal>";
        let mut reader = KanjidicReader::new(xml.as_bytes());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_mismatched_tags() {
        let xml = "<kanjidic2><character><literal>学</reading></character></kanjidic2>";
        let result: Result<Vec<KanjiRecord>> = KanjidicReader::new(xml.as_bytes()).collect();
        assert!(result.is_err());
    }
}
