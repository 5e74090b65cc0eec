//! かな文字の判定と平仮名・片仮名の相互変換
//!
//! 平仮名 `ぁ`〜`ゖ` (U+3041..=U+3096) と片仮名 `ァ`〜`ヶ` (U+30A1..=U+30F6) は
//! 一定のオフセットで一対一に対応するため、変換は文字単位の写像として実装します。
//! 長音記号 `ー` や踊り字はどちらの方向にも変換されません。

use std::ops::RangeInclusive;

const HIRAGANA: RangeInclusive<char> = '\u{3041}'..='\u{3096}';
const KATAKANA: RangeInclusive<char> = '\u{30A1}'..='\u{30F6}';
const SCRIPT_OFFSET: u32 = 0x60;

/// かなとして扱う文字の範囲
///
/// 平仮名、平仮名の踊り字と `ゟ`、片仮名、長音記号、片仮名の踊り字と `ヿ`、
/// 片仮名拡張（アイヌ語用小書き文字）を含みます。中黒 `・` (U+30FB) は含みません。
const KANA_RANGES: &[RangeInclusive<char>] = &[
    '\u{3041}'..='\u{3096}',
    '\u{309D}'..='\u{309F}',
    '\u{30A1}'..='\u{30FA}',
    '\u{30FC}'..='\u{30FF}',
    '\u{31F0}'..='\u{31FF}',
];

/// 文字がかな（平仮名・片仮名・長音記号・踊り字）かどうかを判定します。
///
/// かな以外の文字（漢字、句読点、数字、ラテン文字など）はすべて
/// 割り振りの上では漢字と同じように扱われます。
#[inline]
pub fn is_kana(c: char) -> bool {
    KANA_RANGES.iter().any(|range| range.contains(&c))
}

/// 文字列が空でなく、かなだけで構成されているかどうかを判定します。
pub fn is_kana_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_kana)
}

/// 平仮名1文字を対応する片仮名に変換します。平仮名以外はそのまま返します。
#[inline]
pub fn hiragana_to_katakana(c: char) -> char {
    if HIRAGANA.contains(&c) {
        char::from_u32(c as u32 + SCRIPT_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// 片仮名1文字を対応する平仮名に変換します。片仮名以外はそのまま返します。
#[inline]
pub fn katakana_to_hiragana(c: char) -> char {
    if KATAKANA.contains(&c) {
        char::from_u32(c as u32 - SCRIPT_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// 文字列中の平仮名をすべて片仮名に変換します。
///
/// # 例
///
/// ```
/// use warifuri::kana::to_katakana;
///
/// assert_eq!(to_katakana("がっこう"), "ガッコウ");
/// assert_eq!(to_katakana("ノーべん"), "ノーベン");
/// ```
pub fn to_katakana(s: &str) -> String {
    s.chars().map(hiragana_to_katakana).collect()
}

/// 文字列中の片仮名をすべて平仮名に変換します。
///
/// # 例
///
/// ```
/// use warifuri::kana::to_hiragana;
///
/// assert_eq!(to_hiragana("カン"), "かん");
/// assert_eq!(to_hiragana("ヴァイオリン"), "ゔぁいおりん");
/// ```
pub fn to_hiragana(s: &str) -> String {
    s.chars().map(katakana_to_hiragana).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_conversion_is_bijective() {
        for c in HIRAGANA {
            let k = hiragana_to_katakana(c);
            assert!(KATAKANA.contains(&k));
            assert_eq!(katakana_to_hiragana(k), c);
        }
    }

    #[test]
    fn test_small_kana() {
        assert_eq!(to_katakana("ぁぃぅぇぉっゃゅょゎゕゖ"), "ァィゥェォッャュョヮヵヶ");
    }

    #[test]
    fn test_conversion_keeps_other_chars() {
        assert_eq!(to_katakana("漢字ー・A"), "漢字ー・A");
        assert_eq!(to_hiragana("ゝヽー"), "ゝヽー");
    }

    #[test]
    fn test_is_kana() {
        assert!(is_kana('あ'));
        assert!(is_kana('ン'));
        assert!(is_kana('ー'));
        assert!(is_kana('ゝ'));
        assert!(is_kana('ヾ'));
        assert!(is_kana('ㇰ'));
        assert!(!is_kana('・'));
        assert!(!is_kana('々'));
        assert!(!is_kana('漢'));
        assert!(!is_kana('1'));
    }

    #[test]
    fn test_is_kana_only() {
        assert!(is_kana_only("ノー"));
        assert!(!is_kana_only("の子"));
        assert!(!is_kana_only(""));
    }
}
