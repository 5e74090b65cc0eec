//! 候補パスの木から正規表現へのコンパイル
//!
//! - 葉は候補をエスケープして並べた1つの捕獲グループ `(a|b|…)` になります。
//! - 連接は子のパターンをそのまま連結します。
//! - 選択肢は非捕獲グループ `(?:a|b|…)` になります。
//!
//! 全体は `^…$` で読み全体に固定されます。`regex` クレートは最左優先の意味論を持つため、
//! 複数の選択肢がマッチし得る場合は先に並んだ選択肢が採用されます。

use regex::{Regex, RegexBuilder};

use crate::errors::AlignmentError;
use crate::path::{Candidate, PathNode};

/// ワイルドカードの候補に対応するパターン
const WILDCARD: &str = ".+";

/// 木をパターン文字列にコンパイルします。
///
/// 捕獲グループは葉の左から右への順に並びます。
///
/// # 例
///
/// ```
/// use warifuri::dictionary::ReadingDictionaryBuilder;
/// use warifuri::path::PathBuilder;
/// use warifuri::pattern::compile;
///
/// let mut builder = ReadingDictionaryBuilder::new();
/// builder.add_readings("間", &["かん"]);
/// let dict = builder.build();
///
/// let path = PathBuilder::new(&dict).optimistic(false).build("間の");
/// assert_eq!(compile(path.root()), "^(かん|がん|カン|ガン)(の|ノ)$");
/// ```
pub fn compile(root: &PathNode) -> String {
    Compiler::compile(root).pattern
}

/// パターン文字列と、ワイルドカードを含む捕獲グループの番号
struct Compiler {
    pattern: String,
    num_groups: usize,
    wildcard_groups: Vec<usize>,
}

impl Compiler {
    fn compile(root: &PathNode) -> Self {
        let mut compiler = Self {
            pattern: String::from("^"),
            num_groups: 0,
            wildcard_groups: vec![],
        };
        compiler.write_node(root);
        compiler.pattern.push('$');
        compiler
    }

    fn write_node(&mut self, node: &PathNode) {
        match node {
            PathNode::Leaf(leaf) => {
                self.num_groups += 1;
                self.pattern.push('(');
                for (i, candidate) in leaf.candidates().iter().enumerate() {
                    if i != 0 {
                        self.pattern.push('|');
                    }
                    match candidate {
                        Candidate::Text(text) => self.pattern.push_str(&regex::escape(text)),
                        Candidate::Wildcard => {
                            self.pattern.push_str(WILDCARD);
                            self.wildcard_groups.push(self.num_groups);
                        }
                    }
                }
                self.pattern.push(')');
            }
            PathNode::Concat(children) => {
                for child in children {
                    self.write_node(child);
                }
            }
            PathNode::Alternation(children) => {
                self.pattern.push_str("(?:");
                for (i, child) in children.iter().enumerate() {
                    if i != 0 {
                        self.pattern.push('|');
                    }
                    self.write_node(child);
                }
                self.pattern.push(')');
            }
        }
    }
}

/// 読みへのマッチの結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch<'h> {
    /// マッチに参加した捕獲グループ
    pub groups: Vec<&'h str>,
    /// ワイルドカードの葉がマッチに参加した場合に `true`
    pub wildcard: bool,
}

/// コンパイル済みのパターン
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: Regex,
    wildcard_groups: Vec<usize>,
}

impl Pattern {
    /// 木をコンパイルします。
    ///
    /// # 引数
    ///
    /// * `root` - 候補パスの木
    /// * `size_limit` - コンパイル後のパターンの大きさの上限（バイト）
    ///
    /// # エラー
    ///
    /// パターンが上限を超えた場合に [`AlignmentError::Pattern`] を返します。
    pub fn new(root: &PathNode, size_limit: usize) -> Result<Self, AlignmentError> {
        let compiled = Compiler::compile(root);
        let regex = RegexBuilder::new(&compiled.pattern)
            .size_limit(size_limit)
            .build()?;
        Ok(Self {
            regex,
            wildcard_groups: compiled.wildcard_groups,
        })
    }

    /// パターン文字列を返します。
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// 読みにマッチさせます。
    ///
    /// 選ばれなかった選択肢の中のグループは結果に含まれません。
    /// 読み全体にマッチしなければ `None` を返します。
    pub fn find<'h>(&self, reading: &'h str) -> Option<PatternMatch<'h>> {
        let caps = self.regex.captures(reading)?;
        let wildcard = self
            .wildcard_groups
            .iter()
            .any(|&i| caps.get(i).is_some());
        let groups = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
        Some(PatternMatch { groups, wildcard })
    }

    /// 読みにマッチさせ、マッチに参加した捕獲グループを順に返します。
    #[inline]
    pub fn groups<'h>(&self, reading: &'h str) -> Option<Vec<&'h str>> {
        self.find(reading).map(|m| m.groups)
    }
}
