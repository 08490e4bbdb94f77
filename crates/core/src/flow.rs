//! Verse-level flow analysis.
//!
//! Runs the pairwise evaluator across every line pair within a bounded
//! window, then derives rhyme density, a scheme label, and a chain
//! graph. The graph is an arena of line nodes with index-based edge
//! lists; it is scoped to one analysis and discarded with it.

use serde::{Deserialize, Serialize};

use crate::phonetics::tail;
use crate::rhyme::evaluate::evaluate_transcriptions;
use crate::types::{RhymeClass, TailClass, Transcription};

/// Density is reported as strong matches per this many syllables,
/// roughly a four-bar stretch of verse.
pub const DENSITY_SYLLABLE_SPAN: f64 = 16.0;

/// Flow analysis limits. The window bounds the otherwise quadratic
/// pairwise comparison on long verses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Maximum line distance compared pairwise.
    pub window: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig { window: 4 }
    }
}

/// One verse line in the chain graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineNode {
    pub line: usize,
    pub tail_class: Option<TailClass>,
    pub syllables: usize,
    /// Lines this one shares a loose-or-stronger rhyme with.
    pub edges: Vec<usize>,
}

/// Index-arena adjacency structure over verse lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainGraph {
    pub nodes: Vec<LineNode>,
}

impl ChainGraph {
    /// Connected components with at least two lines, in first-line
    /// order: the rhyme chains and lattices of the verse.
    pub fn chains(&self) -> Vec<Vec<usize>> {
        let n = self.nodes.len();
        let mut seen = vec![false; n];
        let mut chains = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(i) = stack.pop() {
                component.push(i);
                for &j in &self.nodes[i].edges {
                    if !seen[j] {
                        seen[j] = true;
                        stack.push(j);
                    }
                }
            }
            if component.len() > 1 {
                component.sort_unstable();
                chains.push(component);
            }
        }
        chains
    }

    /// Count of edges spanning more than one line: recurrence that
    /// reaches past the adjacent bar.
    pub fn cross_bar_links(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.edges.iter().map(move |&j| (n.line, j)))
            .filter(|&(i, j)| j > i + 1)
            .count()
    }
}

/// Known verse scheme shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeTemplate {
    /// AAAA
    Monorhyme,
    /// AABB
    Couplets,
    /// ABAB
    Alternating,
    /// ABBA
    Enclosed,
    /// ABCB
    Ballad,
}

/// Output of one verse analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseAnalysis {
    /// Loose-or-stronger matches per [`DENSITY_SYLLABLE_SPAN`] syllables.
    pub density: f64,
    /// Symbolic scheme letters, e.g. "AABB".
    pub scheme: String,
    pub template: Option<SchemeTemplate>,
    pub graph: ChainGraph,
    pub per_line_best: Vec<RhymeClass>,
}

/// Analyze a verse of per-line transcriptions.
pub fn analyze(lines: &[Transcription], cfg: &FlowConfig) -> VerseAnalysis {
    let n = lines.len();
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut per_line_best = vec![RhymeClass::None; n];
    let mut strong = 0usize;

    for i in 0..n {
        for j in (i + 1)..(i + 1 + cfg.window).min(n) {
            let m = evaluate_transcriptions(&lines[i], &lines[j]);
            if m.at_least_loose() {
                strong += 1;
                edges[i].push(j);
                edges[j].push(i);
            }
            if m.class.rank() > per_line_best[i].rank() {
                per_line_best[i] = m.class;
            }
            if m.class.rank() > per_line_best[j].rank() {
                per_line_best[j] = m.class;
            }
        }
    }

    let nodes: Vec<LineNode> = lines
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut e = edges[i].clone();
            e.sort_unstable();
            LineNode {
                line: i,
                tail_class: tail::tail_class(t),
                syllables: t.syllable_count(),
                edges: e,
            }
        })
        .collect();

    let total_syllables: usize = nodes.iter().map(|n| n.syllables).sum();
    let density = if total_syllables > 0 {
        strong as f64 * DENSITY_SYLLABLE_SPAN / total_syllables as f64
    } else {
        0.0
    };

    let letters = scheme_letters(&nodes);
    let scheme: String = letters.iter().collect();
    let template = detect_template(&letters);

    VerseAnalysis {
        density,
        scheme,
        template,
        graph: ChainGraph { nodes },
        per_line_best,
    }
}

/// Assign scheme letters: a line joins the group of the earliest line
/// it rhymes with, else starts a new group.
fn scheme_letters(nodes: &[LineNode]) -> Vec<char> {
    let mut groups: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut next_group = 0usize;
    for (i, node) in nodes.iter().enumerate() {
        let joined = node
            .edges
            .iter()
            .copied()
            .filter(|&j| j < i)
            .min()
            .map(|j| groups[j]);
        match joined {
            Some(g) => groups.push(g),
            None => {
                groups.push(next_group);
                next_group += 1;
            }
        }
    }
    groups
        .into_iter()
        .map(|g| (b'A' + (g % 26) as u8) as char)
        .collect()
}

/// First-occurrence canonical form, so "BCCB" compares equal to "ABBA".
fn signature(letters: &[char]) -> Vec<usize> {
    let mut order: Vec<char> = Vec::new();
    letters
        .iter()
        .map(|&c| {
            if let Some(pos) = order.iter().position(|&o| o == c) {
                pos
            } else {
                order.push(c);
                order.len() - 1
            }
        })
        .collect()
}

fn detect_template(letters: &[char]) -> Option<SchemeTemplate> {
    let n = letters.len();
    if n < 2 {
        return None;
    }
    if letters.iter().all(|&c| c == letters[0]) {
        return Some(SchemeTemplate::Monorhyme);
    }
    // Alternating: period-2 repetition of two distinct groups
    if n >= 4
        && n % 2 == 0
        && letters[0] != letters[1]
        && (2..n).all(|i| letters[i] == letters[i - 2])
    {
        return Some(SchemeTemplate::Alternating);
    }
    // Couplets: equal within each pair, different across pairs
    if n % 2 == 0 {
        let pairs_match = (0..n / 2).all(|k| letters[2 * k] == letters[2 * k + 1]);
        let pairs_differ = (1..n / 2).all(|k| letters[2 * k] != letters[2 * k - 1]);
        if pairs_match && pairs_differ {
            return Some(SchemeTemplate::Couplets);
        }
    }
    // Four-line blocks: enclosed and ballad shapes
    if n % 4 == 0 {
        let block_shapes: Vec<Vec<usize>> = letters.chunks(4).map(signature).collect();
        if block_shapes.iter().all(|s| s == &[0, 1, 1, 0]) {
            return Some(SchemeTemplate::Enclosed);
        }
        if block_shapes.iter().all(|s| s == &[0, 1, 2, 1]) {
            return Some(SchemeTemplate::Ballad);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Transcription {
        Transcription::parse(s).unwrap()
    }

    fn lines(specs: &[&str]) -> Vec<Transcription> {
        specs.iter().map(|s| t(s)).collect()
    }

    const CAT: &str = "K AE1 T";
    const HAT: &str = "HH AE1 T";
    const SAT: &str = "S AE1 T";
    const MAT: &str = "M AE1 T";
    const MOON: &str = "M UW1 N";
    const JUNE: &str = "JH UW1 N";
    const SKY: &str = "S K AY1";
    const SHOE: &str = "SH UW1";

    #[test]
    fn test_couplets() {
        let verse = lines(&[CAT, HAT, MOON, JUNE]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "AABB");
        assert_eq!(a.template, Some(SchemeTemplate::Couplets));
        assert_eq!(a.per_line_best, vec![RhymeClass::Perfect; 4]);
    }

    #[test]
    fn test_alternating() {
        let verse = lines(&[CAT, MOON, HAT, JUNE]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "ABAB");
        assert_eq!(a.template, Some(SchemeTemplate::Alternating));
    }

    #[test]
    fn test_enclosed() {
        let verse = lines(&[CAT, MOON, JUNE, HAT]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "ABBA");
        assert_eq!(a.template, Some(SchemeTemplate::Enclosed));
    }

    #[test]
    fn test_monorhyme() {
        let verse = lines(&[CAT, HAT, SAT, MAT]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "AAAA");
        assert_eq!(a.template, Some(SchemeTemplate::Monorhyme));
    }

    #[test]
    fn test_ballad() {
        let verse = lines(&[CAT, MOON, SKY, JUNE]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "ABCB");
        assert_eq!(a.template, Some(SchemeTemplate::Ballad));
    }

    #[test]
    fn test_no_template() {
        let verse = lines(&[CAT, MOON, SHOE]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.scheme, "ABC");
        assert_eq!(a.template, None);
    }

    #[test]
    fn test_density() {
        // Two perfect pairs over four one-syllable lines
        let verse = lines(&[CAT, HAT, MOON, JUNE]);
        let a = analyze(&verse, &FlowConfig::default());
        assert!((a.density - 2.0 * DENSITY_SYLLABLE_SPAN / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_chains_and_cross_bar() {
        let verse = lines(&[CAT, MOON, HAT, JUNE]);
        let a = analyze(&verse, &FlowConfig::default());
        let chains = a.graph.chains();
        assert_eq!(chains, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(a.graph.cross_bar_links(), 2);
    }

    #[test]
    fn test_window_bounds_comparisons() {
        // With window 1 the alternating pairs are never compared
        let verse = lines(&[CAT, MOON, HAT, JUNE]);
        let a = analyze(&verse, &FlowConfig { window: 1 });
        assert!(a.graph.chains().is_empty());
        assert_eq!(a.scheme, "ABCD");
    }

    #[test]
    fn test_empty_line_isolated() {
        let verse = lines(&[CAT, "", HAT]);
        let a = analyze(&verse, &FlowConfig::default());
        assert_eq!(a.per_line_best[1], RhymeClass::None);
        assert_eq!(a.graph.chains(), vec![vec![0, 2]]);
        assert!(a.graph.nodes[1].tail_class.is_none());
    }

    #[test]
    fn test_empty_verse() {
        let a = analyze(&[], &FlowConfig::default());
        assert_eq!(a.density, 0.0);
        assert_eq!(a.scheme, "");
        assert!(a.graph.nodes.is_empty());
    }
}
