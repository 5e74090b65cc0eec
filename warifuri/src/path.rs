//! 候補パスの木の構築
//!
//! 漢字列を、読みの候補を葉に持つ木 [`PathNode`] に変換します。
//! 木は次の3段階で組み立てられます。
//!
//! 1. **分割**: かなの連続は1つの葉、それ以外の文字は1文字ずつの葉にします。
//! 2. **熟字訓の重ね合わせ**: 葉の並び全体で登録された熟字訓が現れる位置に、
//!    熟字訓の読みの経路を元の経路と並べた選択肢として差し込みます。
//!    キーはかなの葉をまたいでもかまいません。
//! 3. **楽観的なまとめ**: 連続する漢字の葉に対し、1文字ずつの連接と、
//!    全体を1つのワイルドカードで覆う経路の選択肢を作ります。
//!    熟字訓の元の経路の内側にも同じまとめが適用されます。
//!
//! 熟字訓の重ね合わせはどちらのモードでも同じ範囲に適用されるため、
//! 熟字訓による分割はモードによって変わりません。
//! 選択肢は先に並んだものが優先されます。

use crate::dictionary::{CompoundPosition, CompoundReading, ReadingDictionary};
use crate::kana::{is_kana, to_hiragana, to_katakana};
use crate::phonology::dedup_in_order;

/// 文字の分類
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// 平仮名、片仮名、長音記号、踊り字
    Kana,
    /// かな以外のすべての文字（漢字、記号、数字、ラテン文字など）
    Kanji,
}

/// 同じ分類の文字が最大限に連続した部分文字列
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// 分類
    pub kind: SegmentKind,
    /// 部分文字列
    pub text: String,
}

/// 文字列を、かなと漢字の最大の連続に分割します。
///
/// # 例
///
/// ```
/// use warifuri::path::{segment, SegmentKind};
///
/// let segments = segment("男の子");
/// let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
/// assert_eq!(kinds, vec![SegmentKind::Kanji, SegmentKind::Kana, SegmentKind::Kanji]);
/// ```
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = vec![];
    for c in text.chars() {
        let kind = if is_kana(c) {
            SegmentKind::Kana
        } else {
            SegmentKind::Kanji
        };
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push(c),
            _ => segments.push(Segment {
                kind,
                text: c.to_string(),
            }),
        }
    }
    segments
}

/// 葉の読み候補
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Candidate {
    /// そのまま一致すべき文字列
    Text(String),
    /// 1文字以上の任意の文字列
    Wildcard,
}

/// 木の葉
///
/// 候補のリストは空になることはありません。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    is_kanji: bool,
    literal: String,
    candidates: Vec<Candidate>,
}

impl Leaf {
    /// 漢字1文字の葉を作成します。
    ///
    /// 辞書に読みがなければ、字そのものを唯一の候補にします。
    fn kanji(c: char, dict: &ReadingDictionary) -> Self {
        let literal = c.to_string();
        let candidates = match dict.readings(c) {
            Some(readings) if !readings.is_empty() => {
                readings.iter().cloned().map(Candidate::Text).collect()
            }
            _ => vec![Candidate::Text(literal.clone())],
        };
        Self {
            is_kanji: true,
            literal,
            candidates,
        }
    }

    /// かなの連続の葉を作成します。候補は元の表記と、平仮名・片仮名への書き換えです。
    fn kana(run: &str) -> Self {
        let candidates = dedup_in_order([run.to_string(), to_katakana(run), to_hiragana(run)])
            .into_iter()
            .map(Candidate::Text)
            .collect();
        Self {
            is_kanji: false,
            literal: run.to_string(),
            candidates,
        }
    }

    /// 熟字訓の1位置分の葉を作成します。空の候補リストは空文字列にマッチします。
    fn compound_position(readings: &[String]) -> Self {
        let candidates = if readings.is_empty() {
            vec![Candidate::Text(String::new())]
        } else {
            readings.iter().cloned().map(Candidate::Text).collect()
        };
        Self {
            is_kanji: false,
            literal: String::new(),
            candidates,
        }
    }

    fn wildcard() -> Self {
        Self {
            is_kanji: false,
            literal: String::new(),
            candidates: vec![Candidate::Wildcard],
        }
    }

    /// 空文字列にだけマッチする詰め物の葉
    fn filler() -> Self {
        Self {
            is_kanji: false,
            literal: String::new(),
            candidates: vec![Candidate::Text(String::new())],
        }
    }

    /// 元の漢字列の文字に対応する漢字の葉であれば `true` を返します。
    #[inline(always)]
    pub fn is_kanji(&self) -> bool {
        self.is_kanji
    }

    /// 葉が表す元の文字列を返します。合成された葉では空です。
    #[inline(always)]
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// 読み候補を優先順に返します。
    #[inline(always)]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

/// 候補パスの木
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathNode {
    /// 1つの捕獲グループになる葉
    Leaf(Leaf),
    /// 子の連接
    Concat(Vec<PathNode>),
    /// 子の選択肢。先に並んだ子が優先されます。
    Alternation(Vec<PathNode>),
}

impl PathNode {
    /// 部分木に含まれる葉の数を返します。
    pub fn num_leaves(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Concat(children) | Self::Alternation(children) => {
                children.iter().map(Self::num_leaves).sum()
            }
        }
    }

    /// 部分木の深さを返します。葉だけの木は1です。
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Concat(children) | Self::Alternation(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }
}

/// 漢字列1つ分の候補パス
#[derive(Clone, Debug)]
pub struct Path {
    segments: Vec<String>,
    root: PathNode,
}

impl Path {
    /// 割り振りの単位となる元のセグメントを返します。
    ///
    /// かなの連続は1つ、それ以外の文字は1文字ずつのセグメントです。
    #[inline(always)]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 木の根を返します。
    #[inline(always)]
    pub fn root(&self) -> &PathNode {
        &self.root
    }

    /// セグメントと木の根に分解します。
    pub fn into_parts(self) -> (Vec<String>, PathNode) {
        (self.segments, self.root)
    }
}

/// 漢字列から候補パスを構築するビルダー
///
/// # 例
///
/// ```
/// use warifuri::dictionary::ReadingDictionaryBuilder;
/// use warifuri::path::PathBuilder;
///
/// let mut builder = ReadingDictionaryBuilder::new();
/// builder.add_readings("間", &["かん"]);
/// let dict = builder.build();
///
/// let path = PathBuilder::new(&dict).build("間接");
/// assert_eq!(path.segments(), &["間", "接"]);
/// ```
#[derive(Clone, Copy)]
pub struct PathBuilder<'d> {
    dict: &'d ReadingDictionary,
    optimistic: bool,
}

impl<'d> PathBuilder<'d> {
    /// 新しいビルダーを作成します。楽観的なまとめはデフォルトで有効です。
    pub fn new(dict: &'d ReadingDictionary) -> Self {
        Self {
            dict,
            optimistic: true,
        }
    }

    /// 楽観的なまとめを行うかどうかを設定します。
    ///
    /// 無効にすると、すべての漢字が辞書の読みか熟字訓と一致しなければならなくなります。
    pub const fn optimistic(mut self, yes: bool) -> Self {
        self.optimistic = yes;
        self
    }

    /// 漢字列の候補パスを構築します。
    pub fn build(&self, text: &str) -> Path {
        let leaves = self.leaves(text);
        let segments = leaves.iter().map(|leaf| leaf.literal.clone()).collect();
        let nodes = self.overlay_compounds(leaves);
        let root = PathNode::Concat(self.group_optimistic(nodes));
        Path { segments, root }
    }

    fn leaves(&self, text: &str) -> Vec<Leaf> {
        let mut leaves = vec![];
        for segment in segment(text) {
            match segment.kind {
                SegmentKind::Kana => leaves.push(Leaf::kana(&segment.text)),
                SegmentKind::Kanji => {
                    leaves.extend(segment.text.chars().map(|c| Leaf::kanji(c, self.dict)));
                }
            }
        }
        leaves
    }

    /// 連続する漢字の葉を、1文字ずつの経路とワイルドカードの経路の選択肢にまとめます。
    ///
    /// 楽観的なまとめが無効であれば何もしません。熟字訓の選択肢は連続を区切ります。
    fn group_optimistic(&self, nodes: Vec<PathNode>) -> Vec<PathNode> {
        if !self.optimistic {
            return nodes;
        }
        let mut grouped = vec![];
        let mut run = vec![];
        for node in nodes {
            match node {
                PathNode::Leaf(leaf) if leaf.is_kanji => run.push(leaf),
                node => {
                    if !run.is_empty() {
                        grouped.push(kanji_run(std::mem::take(&mut run)));
                    }
                    grouped.push(node);
                }
            }
        }
        if !run.is_empty() {
            grouped.push(kanji_run(run));
        }
        grouped
    }

    /// 葉の並び全体に熟字訓の選択肢を差し込みます。
    ///
    /// 長いキーから順に、葉の字面を連結したものとキーが一致する、重ならない出現位置を
    /// すべて置き換えます。キーは葉の境界で始まり、葉の境界で終わる必要があります。
    /// 置き換えた範囲は走査用のバッファ上で1つの空きになるため、
    /// 短いキーがその内側や境界をまたいでマッチすることはありません。
    /// 元の経路には楽観的なまとめが適用されます。
    fn overlay_compounds(&self, leaves: Vec<Leaf>) -> Vec<PathNode> {
        let mut buffer: Vec<Option<String>> =
            leaves.iter().map(|leaf| Some(leaf.literal.clone())).collect();
        let mut nodes: Vec<PathNode> = leaves.into_iter().map(PathNode::Leaf).collect();

        for (key, readings) in self.dict.compounds() {
            let mut pos = 0;
            while pos < buffer.len() {
                if let Some(widths) = match_key(&buffer[pos..], key) {
                    let end = pos + widths.len();
                    let mut alternatives: Vec<PathNode> = readings
                        .iter()
                        .filter_map(|reading| compound_branch(reading, &widths, &nodes[pos..end]))
                        .collect();
                    if !alternatives.is_empty() {
                        let original: Vec<PathNode> = nodes.drain(pos..end).collect();
                        alternatives.push(PathNode::Concat(self.group_optimistic(original)));
                        nodes.insert(pos, PathNode::Alternation(alternatives));
                        buffer.drain(pos..end);
                        buffer.insert(pos, None);
                    }
                }
                pos += 1;
            }
        }
        nodes
    }
}

/// 漢字の連続を、1文字ずつの経路と、全体を1つのワイルドカードで覆う経路の選択肢にします。
fn kanji_run(run: Vec<Leaf>) -> PathNode {
    // The wildcard branch keeps one group per kanji so that the fillers are
    // folded back into a single segment during reconciliation.
    let mut anything = Vec::with_capacity(run.len());
    anything.push(PathNode::Leaf(Leaf::wildcard()));
    anything.extend((1..run.len()).map(|_| PathNode::Leaf(Leaf::filler())));

    let exact = PathNode::Concat(run.into_iter().map(PathNode::Leaf).collect());
    PathNode::Alternation(vec![exact, PathNode::Concat(anything)])
}

/// バッファの先頭から、字面の連結がキーと一致する葉の並びを探します。
///
/// 一致すれば、各葉が覆うキーの文字数を返します。
fn match_key(buffer: &[Option<String>], key: &str) -> Option<Vec<usize>> {
    let mut rest = key;
    let mut widths = vec![];
    for literal in buffer {
        let literal = literal.as_deref()?;
        if literal.is_empty() {
            return None;
        }
        rest = rest.strip_prefix(literal)?;
        widths.push(literal.chars().count());
        if rest.is_empty() {
            return Some(widths);
        }
    }
    None
}

/// 熟字訓の読み1通りを、覆われた葉と同じ数の葉の連接にします。
///
/// 複数文字のかなの葉には、すべての位置が字面のままか、すべて空である読みだけが
/// 対応できます。それ以外の読みに対しては `None` を返します。
fn compound_branch(
    reading: &CompoundReading,
    widths: &[usize],
    covered: &[PathNode],
) -> Option<PathNode> {
    let mut positions = reading.positions();
    let mut children = Vec::with_capacity(widths.len());
    for (&width, node) in widths.iter().zip(covered) {
        if width > positions.len() {
            return None;
        }
        let (head, rest) = positions.split_at(width);
        positions = rest;
        let child = match head {
            _ if head.iter().all(|p| *p == CompoundPosition::Literal) => node.clone(),
            [CompoundPosition::Readings(readings)] => {
                PathNode::Leaf(Leaf::compound_position(readings))
            }
            _ if head.iter().all(CompoundPosition::is_blank) => PathNode::Leaf(Leaf::filler()),
            _ => return None,
        };
        children.push(child);
    }
    Some(PathNode::Concat(children))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::reading_dictionary;

    fn text(s: &str) -> Candidate {
        Candidate::Text(s.to_string())
    }

    #[test]
    fn test_segment() {
        let segments = segment("ノー勉です");
        assert_eq!(
            segments,
            vec![
                Segment {
                    kind: SegmentKind::Kana,
                    text: "ノー".to_string(),
                },
                Segment {
                    kind: SegmentKind::Kanji,
                    text: "勉".to_string(),
                },
                Segment {
                    kind: SegmentKind::Kana,
                    text: "です".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_segment_non_kana_is_kanji() {
        let kinds: Vec<_> = segment("A・1々").iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Kanji]);
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_unknown_kanji_falls_back_to_literal() {
        let dict = reading_dictionary! {};
        let path = PathBuilder::new(&dict).optimistic(false).build("供");
        assert_eq!(path.segments(), &["供"]);
        match path.root() {
            PathNode::Concat(children) => match &children[..] {
                [PathNode::Leaf(leaf)] => {
                    assert!(leaf.is_kanji());
                    assert_eq!(leaf.literal(), "供");
                    assert_eq!(leaf.candidates(), &[text("供")]);
                }
                other => panic!("unexpected children: {other:?}"),
            },
            other => panic!("unexpected root: {other:?}"),
        }
    }

    #[test]
    fn test_kana_leaf_candidates() {
        let dict = reading_dictionary! {};
        let path = PathBuilder::new(&dict).build("ノー");
        match path.root() {
            PathNode::Concat(children) => match &children[..] {
                [PathNode::Leaf(leaf)] => {
                    assert!(!leaf.is_kanji());
                    assert_eq!(leaf.candidates(), &[text("ノー"), text("のー")]);
                }
                other => panic!("unexpected children: {other:?}"),
            },
            other => panic!("unexpected root: {other:?}"),
        }
    }

    #[test]
    fn test_optimistic_grouping() {
        let dict = reading_dictionary! {
            "子" => ["こ"],
        };
        let path = PathBuilder::new(&dict).build("子供");
        assert_eq!(path.segments(), &["子", "供"]);

        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        assert_eq!(children.len(), 1);
        let PathNode::Alternation(branches) = &children[0] else {
            panic!("kanji run must be an alternation");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].num_leaves(), 2);
        assert_eq!(
            branches[1],
            PathNode::Concat(vec![
                PathNode::Leaf(Leaf::wildcard()),
                PathNode::Leaf(Leaf::filler()),
            ])
        );
    }

    #[test]
    fn test_strict_has_no_wildcard() {
        let dict = reading_dictionary! {
            "子" => ["こ"],
        };
        let path = PathBuilder::new(&dict).optimistic(false).build("子供");
        assert_eq!(path.root().num_leaves(), 2);
        assert_eq!(path.root().depth(), 2);
    }

    #[test]
    fn test_compound_overlay() {
        let dict = reading_dictionary! {
            "一人" => ["ひとり"],
        };
        let path = PathBuilder::new(&dict).optimistic(false).build("一人");
        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        let [PathNode::Alternation(branches)] = &children[..] else {
            panic!("compound must be spliced as one alternation");
        };
        assert_eq!(branches.len(), 2);

        let PathNode::Concat(compound) = &branches[0] else {
            panic!("compound reading must be a concatenation");
        };
        let [PathNode::Leaf(first), PathNode::Leaf(second)] = &compound[..] else {
            panic!("one leaf per position expected");
        };
        assert_eq!(first.candidates()[0], text("ひとり"));
        assert_eq!(second.candidates(), &[text("")]);

        // The original decomposition comes last.
        let PathNode::Concat(original) = &branches[1] else {
            panic!("original path must be a concatenation");
        };
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_longest_compound_wins() {
        let dict = reading_dictionary! {
            "一人" => ["ひとり"],
            "一人前" => ["いちにん|まえ"],
        };
        let path = PathBuilder::new(&dict).optimistic(false).build("一人前");
        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        let [PathNode::Alternation(branches)] = &children[..] else {
            panic!("longest compound must cover the whole string");
        };
        // The shorter compound is not spliced inside the longer one.
        assert_eq!(branches[1].depth(), 2);
    }

    #[test]
    fn test_non_overlapping_occurrences() {
        let dict = reading_dictionary! {
            "一人" => ["ひとり"],
        };
        let path = PathBuilder::new(&dict).optimistic(false).build("一人一人");
        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        assert_eq!(children.len(), 2);
        assert!(children
            .iter()
            .all(|child| matches!(child, PathNode::Alternation(_))));
    }

    #[test]
    fn test_compound_key_must_match_leaf_literals() {
        let dict = reading_dictionary! {
            "男子" => ["だんし"],
        };
        let path = PathBuilder::new(&dict).build("男の子");
        assert_eq!(path.segments(), &["男", "の", "子"]);
        // exact and wildcard leaves for each kanji, plus the kana leaf
        assert_eq!(path.root().num_leaves(), 2 + 1 + 2);
    }

    #[test]
    fn test_compound_across_kana_leaf() {
        let dict = reading_dictionary! {
            "男の子" => ["おとこ|の|こ"],
        };
        for optimistic in [true, false] {
            let path = PathBuilder::new(&dict).optimistic(optimistic).build("男の子");
            let PathNode::Concat(children) = path.root() else {
                panic!("root must be a concatenation");
            };
            let [PathNode::Alternation(branches)] = &children[..] else {
                panic!("compound must cover the whole string");
            };
            let PathNode::Concat(compound) = &branches[0] else {
                panic!("compound reading must be a concatenation");
            };
            let [PathNode::Leaf(_), PathNode::Leaf(kana), PathNode::Leaf(_)] = &compound[..] else {
                panic!("one leaf per segment expected");
            };
            assert_eq!(kana.literal(), "の");
            assert_eq!(kana.candidates(), &[text("の"), text("ノ")]);
        }
    }

    #[test]
    fn test_compound_overlay_keeps_optimistic_fallback() {
        let dict = reading_dictionary! {
            "一人" => ["ひとり"],
            "前" => ["まえ"],
        };
        let path = PathBuilder::new(&dict).build("一人前");
        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        let [PathNode::Alternation(compound), PathNode::Alternation(rest)] = &children[..] else {
            panic!("compound and the remaining kanji run expected");
        };
        // compound reading, then the original kanji run with its wildcard branch
        assert_eq!(compound.len(), 2);
        assert_eq!(compound[1].num_leaves(), 2 + 2);
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn test_compound_over_multi_char_kana_leaf() {
        let dict = reading_dictionary! {
            "お巡りさん" => ["おまわりさん", "おまわ|り|さん"],
        };
        let path = PathBuilder::new(&dict).optimistic(false).build("お巡りさん");
        assert_eq!(path.segments(), &["お", "巡", "りさん"]);
        let PathNode::Concat(children) = path.root() else {
            panic!("root must be a concatenation");
        };
        let [PathNode::Alternation(branches)] = &children[..] else {
            panic!("compound must cover the whole string");
        };
        // the second reading splits a kana leaf and is left out
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].num_leaves(), 3);
    }
}
